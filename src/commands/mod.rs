mod config;
mod download;
mod list;
mod playlist;

pub use config::config_command;
pub use download::{download_command, select_formats, DownloadRequest};
pub use list::{list_formats_command, list_subtitles_command};
pub use playlist::playlist_command;

use std::fs;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand};
use log::{error, info};
use url::Url;

use crate::{Config, Error, Result};

#[derive(Parser)]
#[command(name = "allyt")]
#[command(version)]
#[command(about = "Download videos, playlists, subtitles and thumbnails with interactive format selection")]
pub struct Cli {
    #[arg(short, long, action = ArgAction::Count, global = true, help = "More log output (-v debug, -vv trace)")]
    pub verbose: u8,

    #[arg(long, global = true, help = "Directory to save files")]
    pub save_dir: Option<PathBuf>,

    #[arg(long, global = true, help = "Folder to save files in, inside the save directory")]
    pub save_folder: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download video formats, subtitles and/or the thumbnail of one URL
    Download {
        #[arg(short, long, help = "Video URL")]
        url: String,

        #[arg(long, help = "Download video")]
        video: bool,

        #[arg(long, help = "Download subtitles")]
        subtitle: bool,

        #[arg(long, help = "Download thumbnail")]
        thumbnail: bool,

        #[arg(short, long, help = "Format code to download (skip for interactive selection)")]
        format: Option<String>,

        #[arg(long, help = "Subtitle language(s) to download (comma-separated)")]
        sub_lang: Option<String>,

        #[arg(long, help = "Subtitle format (e.g., srt, vtt)")]
        sub_style: Option<String>,
    },
    /// Pick videos from a playlist and download them
    Playlist {
        #[arg(short, long, help = "Playlist URL")]
        url: String,
    },
    /// List available formats
    ListFormats {
        #[arg(short, long)]
        url: String,
    },
    /// List available subtitles
    #[command(alias = "list-subtitles")]
    ListSubs {
        #[arg(short, long)]
        url: String,
    },
    /// Show or change the configuration file
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

impl Commands {
    pub fn url(&self) -> Option<&str> {
        match self {
            Commands::Download { url, .. }
            | Commands::Playlist { url }
            | Commands::ListFormats { url }
            | Commands::ListSubs { url } => Some(url),
            Commands::Config { .. } => None,
        }
    }
}

#[derive(Subcommand)]
pub enum ConfigAction {
    Set {
        #[arg(short, long)]
        key: String,
        #[arg(long)]
        value: String,
    },
    Get {
        #[arg(short, long)]
        key: Option<String>,
    },
    Reset,
}

/// Accepts absolute http(s) URLs with a host
pub fn validate_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url.trim()).map_err(|e| Error::InvalidUrl(format!("{}: {}", url, e)))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(Error::InvalidUrl(format!("{}: unsupported scheme", url)));
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(Error::InvalidUrl(format!("{}: no host found", url)));
    }

    Ok(parsed)
}

/// `save_dir` (flag, else config) joined with the optional folder
pub fn resolve_save_path(save_dir: Option<PathBuf>, save_folder: Option<&str>, config: &Config) -> PathBuf {
    let base = save_dir.unwrap_or_else(|| config.save_dir.clone());
    match save_folder.map(str::trim).filter(|folder| !folder.is_empty()) {
        Some(folder) => base.join(folder),
        None => base,
    }
}

pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
        info!("Created directory: {}", path.display());
    }
    Ok(())
}

/// Splits `en, fr` into `["en", "fr"]`
pub fn parse_langs(langs: &str) -> Vec<String> {
    langs
        .split(',')
        .map(str::trim)
        .filter(|lang| !lang.is_empty())
        .map(str::to_string)
        .collect()
}

/// Counts individual download results so one failure does not stop a batch.
#[derive(Debug, Default)]
struct Tally {
    total: usize,
    failed: usize,
}

impl Tally {
    fn record(&mut self, result: Result<()>, what: &str) {
        self.total += 1;
        if let Err(e) = result {
            self.failed += 1;
            error!("Error downloading {}: {}", what, e);
        }
    }

    fn fail(&mut self) {
        self.total += 1;
        self.failed += 1;
    }

    fn into_result(self) -> Result<()> {
        if self.failed == 0 {
            Ok(())
        } else {
            Err(Error::Incomplete {
                failed: self.failed,
                total: self.total,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_download_flags() {
        let cli = Cli::try_parse_from([
            "allyt", "download", "-u", "https://youtu.be/x", "--video", "--subtitle",
            "--sub-lang", "en,de", "--save-folder", "music",
        ])
        .unwrap();

        assert_eq!(cli.save_folder.as_deref(), Some("music"));
        match cli.command {
            Commands::Download { url, video, subtitle, thumbnail, format, sub_lang, .. } => {
                assert_eq!(url, "https://youtu.be/x");
                assert!(video && subtitle && !thumbnail);
                assert_eq!(format, None);
                assert_eq!(sub_lang.as_deref(), Some("en,de"));
            }
            _ => panic!("expected download"),
        }
    }

    #[test]
    fn test_list_subtitles_alias() {
        let cli = Cli::try_parse_from(["allyt", "list-subtitles", "-u", "https://youtu.be/x"]).unwrap();
        assert!(matches!(cli.command, Commands::ListSubs { .. }));
        assert_eq!(cli.command.url(), Some("https://youtu.be/x"));

        let cli = Cli::try_parse_from(["allyt", "-vv", "list-formats", "--url", "https://youtu.be/x"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::ListFormats { .. }));
    }

    #[test]
    fn test_url_is_required() {
        assert!(Cli::try_parse_from(["allyt", "playlist"]).is_err());
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://www.youtube.com/playlist?list=PL123").is_ok());
        assert!(validate_url(" http://example.com/v ").is_ok());
        assert!(matches!(validate_url("youtube.com/watch"), Err(Error::InvalidUrl(_))));
        assert!(matches!(validate_url("ftp://example.com/v"), Err(Error::InvalidUrl(_))));
        assert!(matches!(validate_url("file:///etc/passwd"), Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_resolve_save_path() {
        let mut config = Config::default();
        config.save_dir = PathBuf::from("/data/videos");

        assert_eq!(resolve_save_path(None, None, &config), PathBuf::from("/data/videos"));
        assert_eq!(
            resolve_save_path(None, Some("talks"), &config),
            PathBuf::from("/data/videos/talks")
        );
        assert_eq!(
            resolve_save_path(Some(PathBuf::from("/tmp/x")), Some("  "), &config),
            PathBuf::from("/tmp/x")
        );
    }

    #[test]
    fn test_ensure_dir_creates_nested() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("a").join("b");
        ensure_dir(&target).unwrap();
        assert!(target.is_dir());
        ensure_dir(&target).unwrap();
    }

    #[test]
    fn test_parse_langs() {
        assert_eq!(parse_langs("en, fr ,,de"), vec!["en", "fr", "de"]);
        assert!(parse_langs(" ").is_empty());
    }

    #[test]
    fn test_tally() {
        assert!(Tally::default().into_result().is_ok());

        let mut tally = Tally::default();
        tally.record(Ok(()), "a");
        assert_eq!(tally.failed, 0);

        tally.record(Err(Error::NoFormats), "b");
        tally.fail();
        assert!(matches!(tally.into_result(), Err(Error::Incomplete { failed: 2, total: 3 })));
    }
}
