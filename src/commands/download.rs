use std::io::{BufRead, Write};
use std::path::Path;

use log::{error, info, warn};

use super::Tally;
use crate::error::ErrorExt;
use crate::extractor::{Extractor, FormatInfo};
use crate::prompt::{Prompter, FORMAT_PROMPT};
use crate::{Error, Result};

/// What the `download` command was asked to fetch
#[derive(Debug, Clone, Default)]
pub struct DownloadRequest {
    pub video: bool,
    pub subtitle: bool,
    pub thumbnail: bool,
    /// Skips interactive selection when set
    pub format: Option<String>,
    pub langs: Vec<String>,
    pub sub_format: String,
}

/// Shows the video formats of `url` and asks which ones to download.
///
/// Returns the chosen format ids in list order, empty when the user quits.
pub async fn select_formats<R: BufRead, W: Write>(
    extractor: &dyn Extractor,
    prompter: &mut Prompter<R, W>,
    url: &str,
) -> Result<Vec<String>> {
    info!("Fetching available video formats...");

    let formats: Vec<FormatInfo> = extractor
        .list_formats(url)
        .await
        .map_err(|e| e.context("Could not fetch formats"))?
        .into_iter()
        .filter(FormatInfo::has_video)
        .collect();

    if formats.is_empty() {
        return Err(Error::NoFormats);
    }

    let out = prompter.output();
    writeln!(out, "\nAvailable video formats:")?;
    for (i, format) in formats.iter().enumerate() {
        writeln!(out, "{}", format.picker_row(i + 1))?;
    }

    let selection = prompter.select(FORMAT_PROMPT, formats.len(), false)?;
    Ok(selection
        .pick(&formats)
        .into_iter()
        .map(|format| format.id.clone())
        .collect())
}

pub(crate) async fn download_format(
    extractor: &dyn Extractor,
    url: &str,
    format_id: &str,
    dest_dir: &Path,
) -> Result<()> {
    info!("Starting video download for format '{}'...", format_id);
    extractor.download(url, format_id, dest_dir).await?;
    info!("Video download finished for format '{}'.", format_id);
    Ok(())
}

/// Handles the download command execution
pub async fn download_command<R: BufRead, W: Write>(
    extractor: &dyn Extractor,
    prompter: &mut Prompter<R, W>,
    url: &str,
    save_path: &Path,
    request: DownloadRequest,
) -> Result<()> {
    if !(request.video || request.subtitle || request.thumbnail) {
        warn!("No download option selected. Use --video, --subtitle, or --thumbnail.");
        return Ok(());
    }

    let mut tally = Tally::default();

    if request.video {
        let format_ids = match request.format {
            Some(format) => Ok(vec![format]),
            None => select_formats(extractor, prompter, url).await,
        };

        match format_ids {
            Ok(ids) if ids.is_empty() => warn!("No formats selected. Skipping video download."),
            Ok(ids) => {
                for id in ids {
                    let result = download_format(extractor, url, &id, save_path).await;
                    tally.record(result, &format!("video for format '{}'", id));
                }
            }
            Err(e) => {
                error!("{:#}", e);
                tally.fail();
            }
        }
    }

    if request.subtitle {
        info!(
            "Starting subtitle download for language(s): {}...",
            request.langs.join(", ")
        );
        let result = extractor
            .download_subtitles(url, &request.langs, &request.sub_format, save_path)
            .await;
        if result.is_ok() {
            info!("Subtitle download finished.");
        }
        tally.record(result, "subtitle");
    }

    if request.thumbnail {
        info!("Starting thumbnail download...");
        let result = extractor.download_thumbnail(url, save_path).await;
        if result.is_ok() {
            info!("Thumbnail download finished.");
        }
        tally.record(result, "thumbnail");
    }

    tally.into_result()
}
