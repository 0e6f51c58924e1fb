use std::path::Path;

use log::debug;
use tokio::process::Command;

use crate::Config;

/// Result of probing one external program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolStatus {
    pub name: &'static str,
    pub version: Option<String>,
    pub available: bool,
}

pub struct DependencyStatus {
    pub yt_dlp: ToolStatus,
    pub ffmpeg: ToolStatus,
}

impl DependencyStatus {
    /// yt-dlp is mandatory, everything else only limits functionality
    pub fn minimum_available(&self) -> bool {
        self.yt_dlp.available
    }

    pub fn all_available(&self) -> bool {
        self.yt_dlp.available && self.ffmpeg.available
    }

    pub fn print(&self) {
        println!("Dependency check:");
        println!(
            "  {}: {}",
            self.yt_dlp.name,
            describe(
                &self.yt_dlp,
                "Not found. Please install yt-dlp: https://github.com/yt-dlp/yt-dlp#installation"
            )
        );
        println!(
            "  {}: {}",
            self.ffmpeg.name,
            describe(
                &self.ffmpeg,
                "Not found. Separate video and audio formats will not be merged."
            )
        );
    }
}

fn describe(status: &ToolStatus, missing: &str) -> String {
    if status.available {
        format!("✓ Available (v{})", status.version.as_deref().unwrap_or("unknown"))
    } else {
        format!("✗ {}", missing)
    }
}

/// First line of `yt-dlp --version`
pub fn parse_ytdlp_version(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .next()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
}

/// Version token from `ffmpeg -version`, e.g. `ffmpeg version 6.1.1 Copyright ...`
pub fn parse_ffmpeg_version(stdout: &str) -> Option<String> {
    let first = stdout.lines().next()?;
    let start = first.find("version ")? + "version ".len();
    first[start..].split_whitespace().next().map(str::to_string)
}

async fn probe(
    name: &'static str,
    program: &Path,
    arg: &str,
    parse: fn(&str) -> Option<String>,
) -> ToolStatus {
    match Command::new(program).arg(arg).output().await {
        Ok(output) if output.status.success() => ToolStatus {
            name,
            version: parse(&String::from_utf8_lossy(&output.stdout)),
            available: true,
        },
        Ok(output) => {
            debug!("{} exited with {}", name, output.status);
            ToolStatus { name, version: None, available: false }
        }
        Err(e) => {
            debug!("{} could not be started: {}", name, e);
            ToolStatus { name, version: None, available: false }
        }
    }
}

/// Check if required dependencies are available
pub async fn check_dependencies(config: &Config) -> DependencyStatus {
    let yt_dlp = probe("yt-dlp", &config.ytdlp_program(), "--version", parse_ytdlp_version).await;
    let ffmpeg = probe("ffmpeg", Path::new("ffmpeg"), "-version", parse_ffmpeg_version).await;

    DependencyStatus { yt_dlp, ffmpeg }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_versions() {
        assert_eq!(parse_ytdlp_version("2024.08.06\n").as_deref(), Some("2024.08.06"));
        assert_eq!(parse_ytdlp_version(""), None);

        let ffmpeg = "ffmpeg version 6.1.1-3ubuntu5 Copyright (c) 2000-2023 the FFmpeg developers\nbuilt with gcc";
        assert_eq!(parse_ffmpeg_version(ffmpeg).as_deref(), Some("6.1.1-3ubuntu5"));
        assert_eq!(parse_ffmpeg_version("something else"), None);
    }

    #[tokio::test]
    async fn test_missing_program_is_unavailable() {
        let status = probe(
            "yt-dlp",
            Path::new("/nonexistent/allyt-test/yt-dlp"),
            "--version",
            parse_ytdlp_version,
        )
        .await;
        assert!(!status.available);
        assert_eq!(status.version, None);
    }

    #[test]
    fn test_minimum_only_needs_ytdlp() {
        let status = DependencyStatus {
            yt_dlp: ToolStatus { name: "yt-dlp", version: Some("2024.08.06".into()), available: true },
            ffmpeg: ToolStatus { name: "ffmpeg", version: None, available: false },
        };
        assert!(status.minimum_available());
        assert!(!status.all_available());
    }
}
