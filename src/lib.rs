mod error;
pub mod commands;
pub mod config;
pub mod extractor;
pub mod logging;
pub mod prompt;
pub mod selection;
pub mod utils;

pub use config::Config;
pub use error::{Error, ErrorExt, Result};
pub use extractor::{Extractor, FormatInfo, PlaylistEntry, SubtitleTrack, YtDlp};
pub use prompt::Prompter;
pub use selection::Selection;
