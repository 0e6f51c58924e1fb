use std::io::Write;

use chrono::{DateTime, Local};
use env_logger::fmt::Color;
use env_logger::{Builder, Env};
use log::{Level, LevelFilter};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Status marker printed in front of every message.
pub fn level_symbol(level: Level) -> &'static str {
    match level {
        Level::Error => "[-]",
        Level::Warn => "[*]",
        Level::Info => "[+]",
        Level::Debug | Level::Trace => "[.]",
    }
}

fn level_color(level: Level) -> Color {
    match level {
        Level::Error => Color::Red,
        Level::Warn => Color::Yellow,
        Level::Info => Color::Green,
        Level::Debug | Level::Trace => Color::Cyan,
    }
}

pub fn format_timestamp(time: &DateTime<Local>) -> String {
    time.format(TIMESTAMP_FORMAT).to_string()
}

/// Default filter for the given number of `-v` flags.
pub fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Installs the process logger once. `RUST_LOG` takes precedence over `verbosity`.
pub fn init(verbosity: u8) {
    let default_filter = level_for(verbosity).to_string().to_lowercase();

    let mut builder = Builder::from_env(Env::default().default_filter_or(default_filter));
    builder.format(|buf, record| {
        let mut style = buf.style();
        style.set_color(level_color(record.level())).set_bold(true);

        writeln!(
            buf,
            "[{}] {} {}",
            format_timestamp(&Local::now()),
            style.value(level_symbol(record.level())),
            record.args()
        )
    });

    if let Err(e) = builder.try_init() {
        eprintln!("Logger already initialized: {}", e);
    }
}
