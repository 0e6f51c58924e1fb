use std::fmt;

/// One encoding variant of a media URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatInfo {
    pub id: String,
    pub ext: String,
    pub resolution: String,
    pub filesize: Option<u64>,
    pub note: String,
    pub vcodec: String,
    pub acodec: String,
}

impl FormatInfo {
    pub fn has_video(&self) -> bool {
        self.vcodec != "none"
    }

    pub fn has_audio(&self) -> bool {
        !self.acodec.is_empty() && self.acodec != "none"
    }

    /// Row used by the interactive picker, `index` is 1-based.
    pub fn picker_row(&self, index: usize) -> String {
        let audio = if self.has_audio() {
            format!("({})", self.acodec)
        } else {
            String::new()
        };

        format!(
            "  [{}] {:<15} {:<5} {:>10} {} - {}",
            index,
            self.resolution,
            self.ext,
            human_size(self.filesize),
            audio,
            self.note
        )
    }
}

impl fmt::Display for FormatInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<10} {:<5} {:<15} {:>10} {:<14} {:<14} {}",
            self.id,
            self.ext,
            self.resolution,
            human_size(self.filesize),
            self.vcodec,
            self.acodec,
            self.note
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistEntry {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleTrack {
    pub lang: String,
    pub name: Option<String>,
    pub formats: Vec<String>,
    /// Generated captions rather than uploaded subtitles
    pub automatic: bool,
}

impl fmt::Display for SubtitleTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.automatic { "auto" } else { "uploaded" };
        write!(
            f,
            "{:<10} {:<9} {:<25} {}",
            self.lang,
            kind,
            self.name.as_deref().unwrap_or("-"),
            self.formats.join(", ")
        )
    }
}

/// Size in MiB with two decimals, or `N/A`.
pub fn human_size(bytes: Option<u64>) -> String {
    match bytes {
        Some(bytes) => format!("{:.2}MB", bytes as f64 / (1024.0 * 1024.0)),
        None => "N/A".to_string(),
    }
}
