//! SMTP client errors.

use std::io;
use std::time::Duration;

use crate::reply::ReplyCode;

/// Result type alias for SMTP operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong talking to a mail server.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Socket failure: refused, unresolvable host, reset.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// TLS handshake or configuration failure.
    #[error("TLS error: {0}")]
    Tls(#[from] rustls::Error),

    /// No greeting within the connect timeout.
    #[error("Timed out after {0:?} connecting to SMTP server")]
    Timeout(Duration),

    /// The server hung up mid-conversation.
    #[error("Connection closed by server")]
    ConnectionClosed,

    /// The server answered with a code the command did not expect.
    #[error("SMTP error {code}: {message}")]
    SmtpError {
        /// Reply code.
        code: ReplyCode,
        /// Reply text.
        message: String,
    },

    /// The server sent something that is not a valid reply.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// An envelope address would not survive the command line.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// RCPT TO failed for every recipient; holds the last refusal.
    #[error("All recipients refused: {0}")]
    RecipientsRefused(String),

    /// The message is larger than the server's advertised SIZE.
    #[error("Message exceeds size limit: {0} bytes")]
    MessageTooLarge(usize),

    /// A required extension was not advertised.
    #[error("Server does not support {0}")]
    NotSupported(String),
}

impl Error {
    /// Builds [`Error::SmtpError`] from a numeric code.
    #[must_use]
    pub fn smtp_error(code: u16, message: impl Into<String>) -> Self {
        Self::SmtpError {
            code: ReplyCode::new(code),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smtp_error_keeps_code_and_text() {
        let err = Error::smtp_error(451, "try later");
        assert!(matches!(
            &err,
            Error::SmtpError { code, message } if code.as_u16() == 451 && message == "try later"
        ));
        assert_eq!(err.to_string(), "SMTP error 451: try later");
    }

    #[test]
    fn test_timeout_message_mentions_duration() {
        let err = Error::Timeout(Duration::from_secs(10));
        assert_eq!(
            err.to_string(),
            "Timed out after 10s connecting to SMTP server"
        );
    }
}
