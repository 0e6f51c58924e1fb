use clap::Parser;
use log::{info, warn};

use allyt::commands::{self, Cli, Commands, DownloadRequest};
use allyt::utils::dependency_check;
use allyt::{logging, Config, Error, Prompter, Result, YtDlp};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let command = match cli.command {
        Commands::Config { action } => {
            return commands::config_command(action, &Config::default_path());
        }
        command => command,
    };

    let config = Config::load();

    // Check for required dependencies
    let status = dependency_check::check_dependencies(&config).await;
    if !status.minimum_available() {
        status.print();
        return Err(Error::CommandExecution {
            command: "dependency check".to_string(),
            reason: "yt-dlp not found".to_string(),
        });
    }
    if !status.all_available() {
        warn!("ffmpeg not found, formats that need merging may fail");
    }

    let url = command.url().unwrap_or_default().trim().to_string();
    info!("Checking url: {}", url);
    commands::validate_url(&url)?;

    let save_path = commands::resolve_save_path(cli.save_dir, cli.save_folder.as_deref(), &config);
    commands::ensure_dir(&save_path)?;

    let extractor = YtDlp::from_config(&config);
    let mut prompter = Prompter::stdio();

    match command {
        Commands::Download { video, subtitle, thumbnail, format, sub_lang, sub_style, .. } => {
            let request = DownloadRequest {
                video,
                subtitle,
                thumbnail,
                format,
                langs: commands::parse_langs(sub_lang.as_deref().unwrap_or(&config.subtitle_langs)),
                sub_format: sub_style.unwrap_or_else(|| config.subtitle_format.clone()),
            };
            commands::download_command(&extractor, &mut prompter, &url, &save_path, request).await
        }
        Commands::Playlist { .. } => {
            commands::playlist_command(&extractor, &mut prompter, &url, &save_path).await
        }
        Commands::ListFormats { .. } => commands::list_formats_command(&extractor, &url).await,
        Commands::ListSubs { .. } => commands::list_subtitles_command(&extractor, &url).await,
        Commands::Config { .. } => Ok(()),
    }
}
