//! Server replies.
//!
//! A reply is one or more lines sharing a three-digit code. Every line but
//! the last has `-` after the code:
//!
//! ```text
//! 250-relay.example.com
//! 250-SIZE 10240000
//! 250 AUTH PLAIN LOGIN
//! ```
//!
//! [`ReplyParser`] consumes lines as they arrive and yields the reply once
//! the final line is seen.

use std::fmt;

use crate::error::{Error, Result};

/// First digit of a reply code (RFC 5321 section 4.2.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyClass {
    /// 2xx: the command completed.
    Completed,
    /// 3xx: more input expected (DATA, AUTH challenges).
    Intermediate,
    /// 4xx: failed now, may succeed if retried.
    TransientFailure,
    /// 5xx: failed and will keep failing.
    PermanentFailure,
    /// Anything outside 200..600.
    Unknown,
}

/// Three-digit SMTP reply code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReplyCode(u16);

impl ReplyCode {
    /// 220 greeting.
    pub const SERVICE_READY: Self = Self(220);
    /// 221 reply to QUIT.
    pub const CLOSING: Self = Self(221);
    /// 235 credentials accepted.
    pub const AUTH_SUCCESS: Self = Self(235);
    /// 250 generic completion.
    pub const OK: Self = Self(250);
    /// 334 server challenge during AUTH.
    pub const AUTH_CONTINUE: Self = Self(334);
    /// 354 go ahead with message data.
    pub const START_DATA: Self = Self(354);

    /// Wraps a numeric code.
    #[must_use]
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Numeric value.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// Which class the code belongs to.
    #[must_use]
    pub const fn class(self) -> ReplyClass {
        match self.0 / 100 {
            2 => ReplyClass::Completed,
            3 => ReplyClass::Intermediate,
            4 => ReplyClass::TransientFailure,
            5 => ReplyClass::PermanentFailure,
            _ => ReplyClass::Unknown,
        }
    }
}

impl fmt::Display for ReplyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A complete reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Reply code shared by every line.
    pub code: ReplyCode,
    /// Text after the code on each line, in order.
    pub lines: Vec<String>,
}

impl Reply {
    /// Builds a reply from its parts.
    #[must_use]
    pub const fn new(code: ReplyCode, lines: Vec<String>) -> Self {
        Self { code, lines }
    }

    /// True for 2xx replies.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.code.class(), ReplyClass::Completed)
    }

    /// All lines joined with spaces, for error messages.
    #[must_use]
    pub fn text(&self) -> String {
        self.lines.join(" ")
    }

    /// Turns an unexpected reply into an [`Error::SmtpError`].
    #[must_use]
    pub fn into_error(self) -> Error {
        Error::smtp_error(self.code.as_u16(), self.text())
    }
}

/// Incremental reply reader.
#[derive(Debug, Default)]
pub struct ReplyParser {
    code: Option<ReplyCode>,
    lines: Vec<String>,
}

impl ReplyParser {
    /// Creates a parser waiting for the first line.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes one line (without CRLF).
    ///
    /// Returns `Ok(Some(reply))` after the final line and resets for the
    /// next reply, `Ok(None)` while more lines are expected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] for a line without a numeric code, or one
    /// whose code differs from earlier lines of the same reply.
    pub fn feed(&mut self, line: &str) -> Result<Option<Reply>> {
        let (code, separator, text) = split_line(line)?;

        match self.code {
            Some(expected) if expected != code => {
                return Err(Error::Protocol(format!(
                    "Reply code changed from {expected} to {code}: {line}"
                )));
            }
            Some(_) => {}
            None => self.code = Some(code),
        }
        self.lines.push(text.to_string());

        if separator == Some(b'-') {
            return Ok(None);
        }
        self.code = None;
        Ok(Some(Reply::new(code, std::mem::take(&mut self.lines))))
    }
}

/// Splits `250-text` into its code, separator byte, and text.
fn split_line(line: &str) -> Result<(ReplyCode, Option<u8>, &str)> {
    let digits = line
        .get(..3)
        .filter(|d| d.bytes().all(|b| b.is_ascii_digit()))
        .ok_or_else(|| Error::Protocol(format!("Malformed reply line: {line:?}")))?;
    let code = digits
        .parse()
        .map_err(|_| Error::Protocol(format!("Malformed reply line: {line:?}")))?;

    let separator = line.as_bytes().get(3).copied();
    if !matches!(separator, None | Some(b' ' | b'-')) {
        return Err(Error::Protocol(format!("Malformed reply line: {line:?}")));
    }
    Ok((ReplyCode(code), separator, line.get(4..).unwrap_or_default()))
}
