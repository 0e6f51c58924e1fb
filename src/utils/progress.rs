use std::sync::{Arc, OnceLock};

use indicatif::{ProgressBar, ProgressStyle};
use regex::Regex;
use tokio::sync::watch;

/// Marker yt-dlp prints in front of each progress line, see [`PROGRESS_TEMPLATE`].
pub const PROGRESS_MARKER: &str = "[progress]";

/// Passed to `--progress-template` so progress arrives one parseable line at a time.
pub const PROGRESS_TEMPLATE: &str =
    "download:[progress] %(progress._percent_str)s|%(progress._speed_str)s|%(progress._eta_str)s";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressUpdate {
    /// 0.0 ..= 100.0
    pub percent: f64,
    pub speed: Option<String>,
    pub eta: Option<String>,
}

fn progress_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*([0-9]+(?:\.[0-9]+)?)%\s*\|\s*(.*?)\s*\|\s*(.*?)\s*$")
            .expect("progress pattern is valid")
    })
}

fn known(value: &str) -> Option<String> {
    if value.is_empty() || value.contains("Unknown") || value == "NA" {
        None
    } else {
        Some(value.to_string())
    }
}

/// Parses one line produced by [`PROGRESS_TEMPLATE`].
pub fn parse_progress_line(line: &str) -> Option<ProgressUpdate> {
    let fields = line.trim().strip_prefix(PROGRESS_MARKER)?;
    let caps = progress_regex().captures(fields)?;
    let percent = caps[1].parse::<f64>().ok()?.clamp(0.0, 100.0);

    Some(ProgressUpdate {
        percent,
        speed: known(&caps[2]),
        eta: known(&caps[3]),
    })
}

fn status_message(update: &ProgressUpdate) -> String {
    format!(
        "at {}, ETA: {}",
        update.speed.as_deref().unwrap_or("N/A"),
        update.eta.as_deref().unwrap_or("N/A")
    )
}

/// Progress bar fed through a watch channel
pub struct ProgressTracker {
    progress_tx: Arc<watch::Sender<ProgressUpdate>>,
    progress_bar: ProgressBar,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl ProgressTracker {
    pub fn new(label: &str) -> Self {
        let pb = ProgressBar::new(1000);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{prefix} |{bar:20.green/white}| {msg}")
        {
            pb.set_style(style.progress_chars("█-"));
        }
        pb.set_prefix(label.to_string());

        let (progress_tx, mut progress_rx) = watch::channel(ProgressUpdate::default());

        let handle = tokio::spawn({
            let pb = pb.clone();
            async move {
                while progress_rx.changed().await.is_ok() {
                    let update = progress_rx.borrow().clone();
                    pb.set_position((update.percent * 10.0) as u64);
                    pb.set_message(format!("{:.1}% {}", update.percent, status_message(&update)));
                }
            }
        });

        Self {
            progress_tx: Arc::new(progress_tx),
            progress_bar: pb,
            handle: Some(handle),
        }
    }

    pub fn sender(&self) -> Arc<watch::Sender<ProgressUpdate>> {
        Arc::clone(&self.progress_tx)
    }

    /// Stops the updater and leaves the final bar on screen
    pub fn finish(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        self.progress_bar.finish();
    }
}

impl Drop for ProgressTracker {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
