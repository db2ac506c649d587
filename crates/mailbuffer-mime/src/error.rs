//! Error types for MIME operations.

use std::io;

/// Result type alias for MIME operations.
pub type Result<T> = std::result::Result<T, Error>;

/// MIME error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Reading an attachment from disk failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Header name or value would corrupt the message (e.g. embedded CR/LF).
    #[error("Invalid MIME header: {0}")]
    InvalidHeader(String),

    /// Missing required header.
    #[error("Missing required header: {0}")]
    MissingHeader(String),

    /// Message has neither a body nor attachments.
    #[error("Message has no content")]
    EmptyMessage,
}

impl Error {
    /// Returns true if this error means a file was not found.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io(e) if e.kind() == io::ErrorKind::NotFound)
    }
}
