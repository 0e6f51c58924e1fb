use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to run {command}: {reason}")]
    CommandExecution { command: String, reason: String },

    #[error("Could not read media metadata: {0}")]
    Metadata(String),

    #[error("No video formats found")]
    NoFormats,

    #[error("Invalid configuration for '{key}': {reason}")]
    InvalidConfig { key: String, reason: String },

    #[error("{failed} of {total} downloads failed")]
    Incomplete { failed: usize, total: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

pub trait ErrorExt {
    fn context<C>(self, context: C) -> Self
    where
        C: std::fmt::Display + Send + Sync + 'static;
}

impl ErrorExt for Error {
    fn context<C>(self, context: C) -> Self
    where
        C: std::fmt::Display + Send + Sync + 'static,
    {
        match self {
            Error::Other(err) => Error::Other(err.context(context)),
            err => Error::Other(anyhow::Error::new(err).context(context)),
        }
    }
}
