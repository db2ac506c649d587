//! Configuration models.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default flush threshold: 5 MiB of buffered entry text.
pub const DEFAULT_CAPACITY: usize = 5 * 1024 * 1024;

/// Default SMTP connect timeout in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Environment variable that overrides the configured SMTP password.
pub const PASSWORD_ENV: &str = "MAILBUFFER_SMTP_PASSWORD";

const fn default_port() -> u16 {
    25
}

const fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

const fn default_connect_timeout_secs() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

fn default_client_hostname() -> String {
    "localhost".to_string()
}

/// Where alerts go and how to reach the mail server.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailSettings {
    /// Sender address.
    pub fromaddr: String,
    /// Recipient addresses.
    pub toaddrs: Vec<String>,
    /// Subject line.
    pub subject: String,
    /// SMTP server host.
    pub host: String,
    /// SMTP server port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Upgrade the connection with STARTTLS and log in.
    #[serde(default)]
    pub starttls: bool,
    /// Password for `fromaddr` on the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl EmailSettings {
    /// Creates settings for a plain connection on port 25.
    #[must_use]
    pub fn new(
        fromaddr: impl Into<String>,
        toaddrs: Vec<String>,
        subject: impl Into<String>,
        host: impl Into<String>,
    ) -> Self {
        Self {
            fromaddr: fromaddr.into(),
            toaddrs,
            subject: subject.into(),
            host: host.into(),
            port: default_port(),
            starttls: false,
            password: None,
        }
    }
}

impl fmt::Debug for EmailSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailSettings")
            .field("fromaddr", &self.fromaddr)
            .field("toaddrs", &self.toaddrs)
            .field("subject", &self.subject)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("starttls", &self.starttls)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Everything a [`BufferingMailer`](crate::BufferingMailer) needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailerConfig {
    /// Mail settings.
    pub email: EmailSettings,
    /// State file holding pending entries.
    pub state_path: PathBuf,
    /// Log file attached to every alert.
    pub log_file: PathBuf,
    /// Buffered bytes at which a non-forced flush sends.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    /// Seconds allowed for connecting and reading the greeting.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Name announced in EHLO.
    #[serde(default = "default_client_hostname")]
    pub client_hostname: String,
}

impl MailerConfig {
    /// Creates a config with default capacity and timeout.
    #[must_use]
    pub fn new(
        email: EmailSettings,
        state_path: impl Into<PathBuf>,
        log_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            email,
            state_path: state_path.into(),
            log_file: log_file.into(),
            capacity: DEFAULT_CAPACITY,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            client_hostname: default_client_hostname(),
        }
    }

    /// Sets the flush threshold in bytes.
    #[must_use]
    pub const fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Loads a config file and applies the [`PASSWORD_ENV`] override.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, or
    /// [`Error::Config`] if it is not a valid config document.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json(&text)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        Ok(config.with_password_override(std::env::var(PASSWORD_ENV).ok()))
    }

    /// Parses a config document.
    ///
    /// # Errors
    ///
    /// Returns the parse error if the JSON is malformed or incomplete.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Replaces the password when `password` is a non-empty value.
    #[must_use]
    pub fn with_password_override(mut self, password: Option<String>) -> Self {
        if let Some(password) = password.filter(|p| !p.is_empty()) {
            self.email.password = Some(password);
        }
        self
    }

    /// Connect timeout as a [`Duration`].
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}
