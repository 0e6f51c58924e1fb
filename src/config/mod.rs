use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub const KEYS: [&str; 5] = [
    "ytdlp_path",
    "save_dir",
    "subtitle_langs",
    "subtitle_format",
    "show_progress",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to yt-dlp executable, if not in PATH
    pub ytdlp_path: Option<PathBuf>,

    /// Base directory downloads are saved under
    pub save_dir: PathBuf,

    /// Comma-separated subtitle languages
    pub subtitle_langs: String,

    /// Subtitle file format (srt, vtt, ...)
    pub subtitle_format: String,

    /// Whether to show progress bars
    pub show_progress: bool,
}

impl Config {
    /// Default location: `<config dir>/allyt/config.toml`
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("allyt")
            .join("config.toml")
    }

    /// Load config from the default location, falling back to defaults
    pub fn load() -> Self {
        Self::load_from(&Self::default_path())
    }

    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    warn!("Failed to parse config file {}, using defaults: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read config file {}, using defaults: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| Error::InvalidConfig {
            key: "*".to_string(),
            reason: e.to_string(),
        })?;

        fs::write(path, content)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<String> {
        let value = match key {
            "ytdlp_path" => match &self.ytdlp_path {
                Some(path) => path.display().to_string(),
                None => "yt-dlp (system PATH)".to_string(),
            },
            "save_dir" => self.save_dir.display().to_string(),
            "subtitle_langs" => self.subtitle_langs.clone(),
            "subtitle_format" => self.subtitle_format.clone(),
            "show_progress" => self.show_progress.to_string(),
            _ => return Err(unknown_key(key)),
        };
        Ok(value)
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "ytdlp_path" => {
                self.ytdlp_path = if value.eq_ignore_ascii_case("none") {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }
            "save_dir" => self.save_dir = PathBuf::from(value),
            "subtitle_langs" => self.subtitle_langs = value.to_string(),
            "subtitle_format" => self.subtitle_format = value.to_string(),
            "show_progress" => {
                self.show_progress = bool::from_str(value).map_err(|_| Error::InvalidConfig {
                    key: key.to_string(),
                    reason: "use 'true' or 'false'".to_string(),
                })?;
            }
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }

    /// yt-dlp program to invoke
    pub fn ytdlp_program(&self) -> PathBuf {
        self.ytdlp_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("yt-dlp"))
    }
}

fn unknown_key(key: &str) -> Error {
    Error::InvalidConfig {
        key: key.to_string(),
        reason: format!("unknown key, available keys: {}", KEYS.join(", ")),
    }
}

fn default_save_dir() -> PathBuf {
    dirs::video_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Videos")))
        .unwrap_or_else(|| PathBuf::from("."))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ytdlp_path: None,
            save_dir: default_save_dir(),
            subtitle_langs: "en".to_string(),
            subtitle_format: "srt".to_string(),
            show_progress: true,
        }
    }
}
