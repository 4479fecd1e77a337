use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for fescall-core
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a run or reject a setup step.
///
/// Failures of individual directives are never represented here; the engine
/// reports those per call.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error for file operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The source text could not be opened or read
    #[error("cannot read input '{}'", .path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Validation errors (duplicate registrations, bad names)
    #[error("validation error: {0}")]
    Validation(String),

    /// Parse/serialization errors
    #[error("parse error: {0}")]
    Parse(String),
}

impl Error {
    /// Create an input error for the given path
    pub fn input(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Input { path: path.into(), source }
    }

    /// Whether this error came from reading the source text
    pub fn is_input(&self) -> bool {
        matches!(self, Self::Input { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Parse(err.to_string())
    }
}
