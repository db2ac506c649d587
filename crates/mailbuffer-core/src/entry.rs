//! Log entry and severity models.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Timestamp layout used for `asctime` values.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Severity of a buffered log entry.
///
/// Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Diagnostic detail.
    Debug,
    /// Routine progress.
    Info,
    /// Something unexpected that did not stop the operation.
    Warning,
    /// An operation failed.
    Error,
    /// The program may not be able to continue.
    Critical,
}

impl Level {
    /// Returns the upper-case level name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(Self::Debug),
            "INFO" => Ok(Self::Info),
            "WARNING" | "WARN" => Ok(Self::Warning),
            "ERROR" => Ok(Self::Error),
            "CRITICAL" | "FATAL" => Ok(Self::Critical),
            _ => Err(crate::Error::Validation(format!("unknown level name: {s:?}"))),
        }
    }
}

impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::ERROR => Self::Error,
            tracing::Level::WARN => Self::Warning,
            tracing::Level::INFO => Self::Info,
            _ => Self::Debug,
        }
    }
}

/// A single formatted log record waiting to be mailed.
///
/// `message` is the final text; it is never interpolated again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Logger name.
    pub name: String,
    /// Severity.
    pub level: Level,
    /// Finished message text.
    pub message: String,
    /// Path of the source file that emitted the record.
    pub pathname: String,
    /// Line number in `pathname`.
    pub lineno: u32,
    /// Function or module at the call site, when known.
    pub function: Option<String>,
    /// Formatted creation time, when known.
    pub asctime: Option<String>,
}

impl LogEntry {
    /// Creates an entry without call-site function or timestamp.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        level: Level,
        message: impl Into<String>,
        pathname: impl Into<String>,
        lineno: u32,
    ) -> Self {
        Self {
            name: name.into(),
            level,
            message: message.into(),
            pathname: pathname.into(),
            lineno,
            function: None,
            asctime: None,
        }
    }

    /// Sets the call-site function.
    #[must_use]
    pub fn with_function(mut self, function: impl Into<String>) -> Self {
        self.function = Some(function.into());
        self
    }

    /// Sets the formatted timestamp.
    #[must_use]
    pub fn with_timestamp(mut self, asctime: impl Into<String>) -> Self {
        self.asctime = Some(asctime.into());
        self
    }

    /// Returns the final component of `pathname`.
    #[must_use]
    pub fn filename(&self) -> &str {
        Path::new(&self.pathname)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(&self.pathname)
    }

    /// Byte weight counted against the mailer's capacity.
    #[must_use]
    pub fn size(&self) -> usize {
        self.name.len() + self.message.len() + self.pathname.len()
    }
}
