//! Error types for the core library.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The state file exists but is not a valid buffer document.
    #[error("Corrupt state file {path}: {source}")]
    Corrupt {
        /// State file that failed to parse.
        path: PathBuf,
        /// Underlying parse failure.
        #[source]
        source: serde_json::Error,
    },

    /// A stored value is well-formed JSON but not an acceptable value.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The log file to attach does not exist.
    #[error("Log file not found: {}", .0.display())]
    AttachmentMissing(PathBuf),

    /// Building the alert message failed.
    #[error("Message error: {0}")]
    Message(#[from] mailbuffer_mime::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Returns true if the process should stop rather than retry later.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::AttachmentMissing(_))
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
