use log::{info, warn};

use crate::extractor::Extractor;
use crate::Result;

pub const FORMATS_HEADER: &str = "ID         EXT   RESOLUTION            SIZE VCODEC         ACODEC         NOTE";
pub const SUBTITLES_HEADER: &str = "Language   Kind      Name                      Formats";

/// Lists every format of `url` through the logger
pub async fn list_formats_command(extractor: &dyn Extractor, url: &str) -> Result<()> {
    info!("Listing available formats for the URL...");
    let formats = extractor.list_formats(url).await?;

    if formats.is_empty() {
        warn!("No formats reported for {}", url);
        return Ok(());
    }

    info!("Available formats for {}:", url);
    info!("{}", FORMATS_HEADER);
    for format in &formats {
        info!("{}", format);
    }

    Ok(())
}

/// Lists uploaded subtitles and automatic captions of `url` through the logger
pub async fn list_subtitles_command(extractor: &dyn Extractor, url: &str) -> Result<()> {
    info!("Listing available subtitles for the URL...");
    let tracks = extractor.list_subtitles(url).await?;

    if tracks.is_empty() {
        warn!("{} has no subtitles", url);
        return Ok(());
    }

    let uploaded = tracks.iter().filter(|track| !track.automatic).count();
    info!(
        "Available subtitles for {}: {} uploaded, {} automatic",
        url,
        uploaded,
        tracks.len() - uploaded
    );
    info!("{}", SUBTITLES_HEADER);
    for track in &tracks {
        info!("{}", track);
    }

    Ok(())
}
