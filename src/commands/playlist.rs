use std::io::{BufRead, Write};
use std::path::Path;

use log::{error, info, warn};

use super::download::{download_format, select_formats};
use super::Tally;
use crate::error::ErrorExt;
use crate::extractor::Extractor;
use crate::prompt::{Prompter, PLAYLIST_PROMPT};
use crate::{Error, Result};

/// Lets the user pick playlist entries, then one set of formats for all of them.
///
/// Formats are chosen from the first selected video and applied to every
/// selected video.
pub async fn playlist_command<R: BufRead, W: Write>(
    extractor: &dyn Extractor,
    prompter: &mut Prompter<R, W>,
    url: &str,
    save_path: &Path,
) -> Result<()> {
    info!("Fetching playlist videos...");
    let entries = extractor
        .extract_entries(url)
        .await
        .map_err(|e| e.context("An error occurred during playlist processing"))?;

    if entries.is_empty() {
        error!("No videos found in the playlist.");
        return Ok(());
    }

    let out = prompter.output();
    writeln!(out, "\nAvailable videos in the playlist:")?;
    for (i, entry) in entries.iter().enumerate() {
        writeln!(out, "  [{}] {}", i + 1, entry.title)?;
    }

    let selected = prompter
        .select(PLAYLIST_PROMPT, entries.len(), true)?
        .pick(&entries);

    let Some(first) = selected.first() else {
        warn!("No videos selected.");
        return Ok(());
    };

    info!("Fetching formats for the first selected video: {}", first.title);
    let format_ids = match select_formats(extractor, prompter, &first.url).await {
        Ok(ids) => ids,
        Err(Error::Io(e)) => return Err(Error::Io(e)),
        Err(e) => {
            error!("{:#}", e);
            Vec::new()
        }
    };
    if format_ids.is_empty() {
        warn!("No format selected. Aborting playlist download.");
        return Ok(());
    }

    info!(
        "Will download {} video(s) with format(s): {}",
        selected.len(),
        format_ids.join(", ")
    );

    let mut tally = Tally::default();
    for (i, video) in selected.iter().enumerate() {
        info!("Downloading video {} of {}: {}", i + 1, selected.len(), video.title);
        for id in &format_ids {
            let result = download_format(extractor, &video.url, id, save_path).await;
            tally.record(result, &format!("'{}' in format '{}'", video.title, id));
        }
    }

    tally.into_result()
}
