use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};

use async_trait::async_trait;
use log::{debug, warn};
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;

use super::{Extractor, FormatInfo, PlaylistEntry, SubtitleTrack};
use crate::utils::progress::{parse_progress_line, ProgressTracker, PROGRESS_TEMPLATE};
use crate::{Config, Error, Result};

#[derive(Debug, Default, Deserialize)]
struct RawInfo {
    #[serde(default)]
    formats: Option<Vec<RawFormat>>,
    #[serde(default)]
    subtitles: Option<BTreeMap<String, Vec<RawSubtitle>>>,
    #[serde(default)]
    automatic_captions: Option<BTreeMap<String, Vec<RawSubtitle>>>,
    #[serde(default)]
    entries: Option<Vec<Option<RawEntry>>>,
}

#[derive(Debug, Deserialize)]
struct RawFormat {
    format_id: String,
    #[serde(default)]
    ext: Option<String>,
    #[serde(default)]
    resolution: Option<String>,
    #[serde(default)]
    width: Option<u64>,
    #[serde(default)]
    height: Option<u64>,
    #[serde(default)]
    filesize: Option<f64>,
    #[serde(default)]
    filesize_approx: Option<f64>,
    #[serde(default)]
    format_note: Option<String>,
    #[serde(default)]
    vcodec: Option<String>,
    #[serde(default)]
    acodec: Option<String>,
}

impl From<RawFormat> for FormatInfo {
    fn from(raw: RawFormat) -> Self {
        let resolution = match (raw.resolution, raw.width, raw.height) {
            (Some(resolution), _, _) if !resolution.is_empty() => resolution,
            (_, Some(width), Some(height)) => format!("{}x{}", width, height),
            _ => "unknown".to_string(),
        };

        let filesize = raw
            .filesize
            .or(raw.filesize_approx)
            .filter(|size| *size > 0.0)
            .map(|size| size as u64);

        FormatInfo {
            id: raw.format_id,
            ext: raw.ext.unwrap_or_default(),
            resolution,
            filesize,
            note: raw.format_note.unwrap_or_default(),
            vcodec: raw.vcodec.unwrap_or_else(|| "unknown".to_string()),
            acodec: raw.acodec.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawSubtitle {
    #[serde(default)]
    ext: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    webpage_url: Option<String>,
}

fn parse_info(stdout: &[u8]) -> Result<RawInfo> {
    serde_json::from_slice(stdout).map_err(|e| Error::Metadata(e.to_string()))
}

fn into_formats(info: RawInfo) -> Vec<FormatInfo> {
    info.formats
        .unwrap_or_default()
        .into_iter()
        .map(FormatInfo::from)
        .collect()
}

fn into_entries(info: RawInfo) -> Vec<PlaylistEntry> {
    info.entries
        .unwrap_or_default()
        .into_iter()
        .flatten()
        .filter_map(|entry| {
            let title = entry
                .title
                .or_else(|| entry.id.clone())
                .unwrap_or_else(|| "Untitled".to_string());

            match entry.url.or(entry.webpage_url) {
                Some(url) => Some(PlaylistEntry { title, url }),
                None => {
                    warn!("Skipping playlist entry without a URL: {}", title);
                    None
                }
            }
        })
        .collect()
}

fn into_tracks(info: RawInfo) -> Vec<SubtitleTrack> {
    let mut tracks = Vec::new();

    let groups = [
        (info.subtitles.unwrap_or_default(), false),
        (info.automatic_captions.unwrap_or_default(), true),
    ];

    for (map, automatic) in groups {
        for (lang, files) in map {
            let mut formats: Vec<String> = Vec::new();
            for ext in files.iter().filter_map(|file| file.ext.clone()) {
                if !formats.contains(&ext) {
                    formats.push(ext);
                }
            }
            let name = files.iter().find_map(|file| file.name.clone());

            tracks.push(SubtitleTrack { lang, name, formats, automatic });
        }
    }

    tracks.sort_by(|a, b| a.lang.cmp(&b.lang).then(a.automatic.cmp(&b.automatic)));
    tracks
}

/// Most useful line of yt-dlp's stderr for an error message
fn failure_reason(stderr: &str, output_status: &str) -> String {
    let lines: Vec<&str> = stderr.lines().map(str::trim).filter(|l| !l.is_empty()).collect();

    lines
        .iter()
        .rev()
        .find(|line| line.starts_with("ERROR:"))
        .map(|line| line.trim_start_matches("ERROR:").trim().to_string())
        .or_else(|| lines.last().map(|line| line.to_string()))
        .unwrap_or_else(|| format!("yt-dlp exited with {}", output_status))
}

fn relay_warnings(stderr: &str) {
    for line in stderr.lines() {
        if let Some(message) = line.trim().strip_prefix("WARNING:") {
            warn!("{}", message.trim());
        }
    }
}

fn output_template(dest_dir: &Path, pattern: &str) -> String {
    dest_dir.join(pattern).to_string_lossy().into_owned()
}

fn video_args(url: &str, format_id: &str, dest_dir: &Path) -> Vec<String> {
    vec![
        "-f".to_string(),
        format_id.to_string(),
        "-o".to_string(),
        output_template(dest_dir, "%(title)s.f%(format_id)s.%(ext)s"),
        "--no-playlist".to_string(),
        "--newline".to_string(),
        "--no-colors".to_string(),
        "--progress-template".to_string(),
        PROGRESS_TEMPLATE.to_string(),
        url.to_string(),
    ]
}

fn subtitle_args(url: &str, langs: &[String], sub_format: &str, dest_dir: &Path) -> Vec<String> {
    vec![
        "--write-subs".to_string(),
        "--write-auto-subs".to_string(),
        "--sub-langs".to_string(),
        langs.join(","),
        "--sub-format".to_string(),
        sub_format.to_string(),
        "--skip-download".to_string(),
        "-o".to_string(),
        output_template(dest_dir, "%(title)s.%(ext)s"),
        url.to_string(),
    ]
}

fn thumbnail_args(url: &str, dest_dir: &Path) -> Vec<String> {
    vec![
        "--write-thumbnail".to_string(),
        "--skip-download".to_string(),
        "-o".to_string(),
        output_template(dest_dir, "%(title)s"),
        url.to_string(),
    ]
}

/// [`Extractor`] backed by the yt-dlp command-line program
pub struct YtDlp {
    program: PathBuf,
    show_progress: bool,
}

impl YtDlp {
    pub fn new(program: impl Into<PathBuf>, show_progress: bool) -> Self {
        Self {
            program: program.into(),
            show_progress,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.ytdlp_program(), config.show_progress)
    }

    fn command_name(&self) -> String {
        self.program.display().to_string()
    }

    fn check(&self, output: &Output) -> Result<()> {
        let stderr = String::from_utf8_lossy(&output.stderr);
        relay_warnings(&stderr);

        if output.status.success() {
            return Ok(());
        }

        Err(Error::CommandExecution {
            command: self.command_name(),
            reason: failure_reason(&stderr, &output.status.to_string()),
        })
    }

    async fn run(&self, args: &[String]) -> Result<Output> {
        debug!("Running {} {}", self.command_name(), args.join(" "));

        Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| Error::CommandExecution {
                command: self.command_name(),
                reason: e.to_string(),
            })
    }

    async fn fetch_info(&self, url: &str, flat: bool) -> Result<RawInfo> {
        let mut args = vec!["--dump-single-json".to_string()];
        if flat {
            args.push("--flat-playlist".to_string());
        } else {
            args.push("--no-playlist".to_string());
        }
        args.push(url.to_string());

        let output = self.run(&args).await?;
        self.check(&output)?;
        parse_info(&output.stdout)
    }

    async fn run_with_progress(&self, args: &[String]) -> Result<()> {
        debug!("Running {} {}", self.command_name(), args.join(" "));

        let mut child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::CommandExecution {
                command: self.command_name(),
                reason: e.to_string(),
            })?;

        // Drained concurrently so a chatty stderr cannot block stdout.
        let stderr = child.stderr.take();
        let stderr_task = tokio::spawn(async move {
            let mut text = String::new();
            if let Some(mut stderr) = stderr {
                let _ = stderr.read_to_string(&mut text).await;
            }
            text
        });

        let tracker = self
            .show_progress
            .then(|| ProgressTracker::new("Downloading:"));

        if let Some(stdout) = child.stdout.take() {
            let mut lines = BufReader::new(stdout).lines();
            while let Some(line) = lines.next_line().await? {
                match (parse_progress_line(&line), &tracker) {
                    (Some(update), Some(tracker)) => {
                        let _ = tracker.sender().send(update);
                    }
                    (Some(_), None) => {}
                    (None, _) => debug!("yt-dlp: {}", line),
                }
            }
        }

        let status = child.wait().await?;
        let stderr = stderr_task.await.unwrap_or_default();

        if let Some(tracker) = tracker {
            tracker.finish();
        }

        relay_warnings(&stderr);
        if !status.success() {
            return Err(Error::CommandExecution {
                command: self.command_name(),
                reason: failure_reason(&stderr, &status.to_string()),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl Extractor for YtDlp {
    async fn list_formats(&self, url: &str) -> Result<Vec<FormatInfo>> {
        Ok(into_formats(self.fetch_info(url, false).await?))
    }

    async fn extract_entries(&self, url: &str) -> Result<Vec<PlaylistEntry>> {
        Ok(into_entries(self.fetch_info(url, true).await?))
    }

    async fn list_subtitles(&self, url: &str) -> Result<Vec<SubtitleTrack>> {
        Ok(into_tracks(self.fetch_info(url, false).await?))
    }

    async fn download(&self, url: &str, format_id: &str, dest_dir: &Path) -> Result<()> {
        self.run_with_progress(&video_args(url, format_id, dest_dir)).await
    }

    async fn download_subtitles(
        &self,
        url: &str,
        langs: &[String],
        sub_format: &str,
        dest_dir: &Path,
    ) -> Result<()> {
        let output = self.run(&subtitle_args(url, langs, sub_format, dest_dir)).await?;
        self.check(&output)
    }

    async fn download_thumbnail(&self, url: &str, dest_dir: &Path) -> Result<()> {
        let output = self.run(&thumbnail_args(url, dest_dir)).await?;
        self.check(&output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn info(value: serde_json::Value) -> RawInfo {
        parse_info(value.to_string().as_bytes()).unwrap()
    }

    #[test]
    fn test_formats_from_metadata() {
        let raw = info(json!({
            "title": "Some video",
            "formats": [
                {
                    "format_id": "140", "ext": "m4a", "resolution": "audio only",
                    "filesize": 3145728, "format_note": "medium",
                    "vcodec": "none", "acodec": "mp4a.40.2"
                },
                {
                    "format_id": "137", "ext": "mp4", "width": 1920, "height": 1080,
                    "filesize": null, "filesize_approx": 52428800.0, "format_note": "1080p",
                    "vcodec": "avc1.640028", "acodec": "none"
                },
                { "format_id": "sb0", "ext": "mhtml" }
            ]
        }));

        let formats = into_formats(raw);
        assert_eq!(formats.len(), 3);

        assert_eq!(formats[0].resolution, "audio only");
        assert_eq!(formats[0].filesize, Some(3145728));
        assert!(!formats[0].has_video());

        assert_eq!(formats[1].resolution, "1920x1080");
        assert_eq!(formats[1].filesize, Some(52428800));
        assert!(formats[1].has_video());
        assert!(!formats[1].has_audio());

        assert_eq!(formats[2].resolution, "unknown");
        assert_eq!(formats[2].filesize, None);
        assert_eq!(formats[2].note, "");
    }

    #[test]
    fn test_entries_from_flat_playlist() {
        let raw = info(json!({
            "_type": "playlist",
            "entries": [
                { "id": "a1", "title": "First", "url": "https://www.youtube.com/watch?v=a1" },
                { "id": "b2", "title": null, "url": "https://www.youtube.com/watch?v=b2" },
                null,
                { "id": "c3", "title": "Gone" },
                { "title": "Web", "webpage_url": "https://example.com/w" }
            ]
        }));

        let entries = into_entries(raw);
        assert_eq!(
            entries,
            vec![
                PlaylistEntry { title: "First".into(), url: "https://www.youtube.com/watch?v=a1".into() },
                PlaylistEntry { title: "b2".into(), url: "https://www.youtube.com/watch?v=b2".into() },
                PlaylistEntry { title: "Web".into(), url: "https://example.com/w".into() },
            ]
        );
    }

    #[test]
    fn test_single_video_has_no_entries() {
        assert!(into_entries(info(json!({ "title": "x", "formats": [] }))).is_empty());
    }

    #[test]
    fn test_subtitle_tracks() {
        let raw = info(json!({
            "subtitles": {
                "en": [{ "ext": "vtt", "name": "English" }, { "ext": "srv3" }, { "ext": "vtt" }]
            },
            "automatic_captions": {
                "de": [{ "ext": "vtt", "name": "German" }],
                "en": [{ "ext": "json3" }]
            }
        }));

        let tracks = into_tracks(raw);
        let summary: Vec<(&str, bool)> = tracks.iter().map(|t| (t.lang.as_str(), t.automatic)).collect();
        assert_eq!(summary, vec![("de", true), ("en", false), ("en", true)]);
        assert_eq!(tracks[1].formats, vec!["vtt", "srv3"]);
        assert_eq!(tracks[1].name.as_deref(), Some("English"));
        assert_eq!(tracks[2].name, None);
    }

    #[test]
    fn test_bad_json_is_metadata_error() {
        assert!(matches!(parse_info(b"not json"), Err(Error::Metadata(_))));
    }

    #[test]
    fn test_failure_reason() {
        let stderr = "WARNING: something odd\nERROR: [youtube] abc: Video unavailable\n";
        assert_eq!(failure_reason(stderr, "exit status: 1"), "[youtube] abc: Video unavailable");
        assert_eq!(failure_reason("boom\n\n", "exit status: 1"), "boom");
        assert_eq!(failure_reason("", "exit status: 2"), "yt-dlp exited with exit status: 2");
    }

    #[test]
    fn test_download_arguments() {
        let dest = Path::new("/tmp/videos");

        let args = video_args("https://youtu.be/x", "137", dest);
        assert_eq!(&args[..4], ["-f", "137", "-o", "/tmp/videos/%(title)s.f%(format_id)s.%(ext)s"]);
        assert_eq!(args.last().map(String::as_str), Some("https://youtu.be/x"));

        let langs = vec!["en".to_string(), "fr".to_string()];
        let args = subtitle_args("https://youtu.be/x", &langs, "vtt", dest);
        assert!(args.windows(2).any(|w| w == ["--sub-langs", "en,fr"]));
        assert!(args.windows(2).any(|w| w == ["--sub-format", "vtt"]));
        assert!(args.contains(&"--skip-download".to_string()));

        let args = thumbnail_args("https://youtu.be/x", dest);
        assert!(args.windows(2).any(|w| w == ["-o", "/tmp/videos/%(title)s"]));
    }

    #[test]
    fn test_download_arguments_keep_warnings() {
        let dest = Path::new("/tmp/videos");
        let langs = vec!["en".to_string()];

        for args in [
            video_args("https://youtu.be/x", "137", dest),
            subtitle_args("https://youtu.be/x", &langs, "srt", dest),
            thumbnail_args("https://youtu.be/x", dest),
        ] {
            assert!(!args.iter().any(|arg| arg == "--no-warnings"), "{:?}", args);
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_progress_run_reports_failure() {
        let ytdlp = YtDlp::new("sh", false);
        let script = "echo '[progress] 50.0%|1.00MiB/s|00:01'; echo 'WARNING: slow' >&2; echo 'ERROR: gone' >&2; exit 1";
        let args = vec!["-c".to_string(), script.to_string()];

        match ytdlp.run_with_progress(&args).await {
            Err(Error::CommandExecution { reason, .. }) => assert_eq!(reason, "gone"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_binary_is_command_error() {
        let ytdlp = YtDlp::new("/nonexistent/allyt-test/yt-dlp", false);
        let result = ytdlp.list_formats("https://example.com/v").await;
        assert!(matches!(result, Err(Error::CommandExecution { .. })));
    }
}
