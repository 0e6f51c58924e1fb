use std::path::Path;

use async_trait::async_trait;

use crate::Result;

mod model;
mod ytdlp;

pub use model::{human_size, FormatInfo, PlaylistEntry, SubtitleTrack};
pub use ytdlp::YtDlp;

/// The media-extraction service every command delegates to.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Extractor: Send + Sync {
    /// All formats offered for a single media URL, in the extractor's order
    async fn list_formats(&self, url: &str) -> Result<Vec<FormatInfo>>;

    /// Flat list of playlist entries
    async fn extract_entries(&self, url: &str) -> Result<Vec<PlaylistEntry>>;

    /// Uploaded subtitles and automatic captions, sorted by language
    async fn list_subtitles(&self, url: &str) -> Result<Vec<SubtitleTrack>>;

    async fn download(&self, url: &str, format_id: &str, dest_dir: &Path) -> Result<()>;

    async fn download_subtitles(
        &self,
        url: &str,
        langs: &[String],
        sub_format: &str,
        dest_dir: &Path,
    ) -> Result<()>;

    async fn download_thumbnail(&self, url: &str, dest_dir: &Path) -> Result<()>;
}
