use std::path::Path;

use super::ConfigAction;
use crate::config::KEYS;
use crate::{Config, Result};

/// Handles the config command execution against the file at `path`
pub fn config_command(action: Option<ConfigAction>, path: &Path) -> Result<()> {
    let mut config = Config::load_from(path);

    match action {
        Some(ConfigAction::Get { key: Some(key) }) => {
            println!("{}: {}", key, config.get(&key)?);
        }
        Some(ConfigAction::Get { key: None }) => {
            println!("Current configuration ({}):", path.display());
            for key in KEYS {
                println!("  {}: {}", key, config.get(key)?);
            }
        }
        Some(ConfigAction::Set { key, value }) => {
            config.set(&key, &value)?;
            config.save_to(path)?;
            println!("Updated {} to {}", key, config.get(&key)?);
        }
        Some(ConfigAction::Reset) => {
            Config::default().save_to(path)?;
            println!("Configuration reset to defaults");
        }
        None => {
            println!("Config command usage:");
            println!("  allyt config get [--key KEY]            - Show all config or a specific value");
            println!("  allyt config set --key KEY --value VALUE - Set a config value");
            println!("  allyt config reset                      - Reset configuration to defaults");
            println!("\nAvailable config keys:");
            println!("  ytdlp_path       - Path to yt-dlp executable, or 'none' to use system PATH");
            println!("  save_dir         - Directory where downloads are saved");
            println!("  subtitle_langs   - Default subtitle language(s), comma-separated");
            println!("  subtitle_format  - Default subtitle format (srt, vtt, ...)");
            println!("  show_progress    - Whether to show progress bars (true/false)");
        }
    }

    Ok(())
}
