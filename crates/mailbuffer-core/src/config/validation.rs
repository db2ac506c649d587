//! Mailer configuration validation.

use mailbuffer_smtp::Address;

use super::model::MailerConfig;

/// Validation error for mailer configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Sender address is empty.
    EmptyFromAddr,
    /// Sender address format is invalid.
    InvalidFromAddr,
    /// No recipients configured.
    NoRecipients,
    /// A recipient address format is invalid.
    InvalidRecipient,
    /// SMTP host is empty.
    EmptyHost,
    /// SMTP port is zero.
    InvalidPort,
    /// Flush threshold is zero.
    ZeroCapacity,
    /// Connect timeout is zero.
    ZeroTimeout,
    /// State file path is empty.
    EmptyStatePath,
    /// Log file path is empty.
    EmptyLogFile,
}

impl ConfigError {
    /// Get human-readable error message.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::EmptyFromAddr => "Sender address is required",
            Self::InvalidFromAddr => "Invalid sender address format",
            Self::NoRecipients => "At least one recipient is required",
            Self::InvalidRecipient => "Invalid recipient address format",
            Self::EmptyHost => "SMTP server is required",
            Self::InvalidPort => "SMTP port must be 1-65535",
            Self::ZeroCapacity => "Capacity must be greater than zero",
            Self::ZeroTimeout => "Connect timeout must be greater than zero",
            Self::EmptyStatePath => "State file path is required",
            Self::EmptyLogFile => "Log file path is required",
        }
    }

    /// Get the field name this error relates to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyFromAddr | Self::InvalidFromAddr => "fromaddr",
            Self::NoRecipients | Self::InvalidRecipient => "toaddrs",
            Self::EmptyHost => "host",
            Self::InvalidPort => "port",
            Self::ZeroCapacity => "capacity",
            Self::ZeroTimeout => "connect_timeout_secs",
            Self::EmptyStatePath => "state_path",
            Self::EmptyLogFile => "log_file",
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field(), self.message())
    }
}

impl std::error::Error for ConfigError {}

/// Result of validating a mailer config.
pub type ValidationResult = Result<(), Vec<ConfigError>>;

/// Validate a mailer configuration.
///
/// # Errors
///
/// Returns every problem found, not just the first.
pub fn validate_config(config: &MailerConfig) -> ValidationResult {
    let mut errors = Vec::new();
    let email = &config.email;

    if email.fromaddr.trim().is_empty() {
        errors.push(ConfigError::EmptyFromAddr);
    } else if Address::new(email.fromaddr.as_str()).is_err() {
        errors.push(ConfigError::InvalidFromAddr);
    }

    if email.toaddrs.is_empty() {
        errors.push(ConfigError::NoRecipients);
    } else if email
        .toaddrs
        .iter()
        .any(|addr| Address::new(addr.as_str()).is_err())
    {
        errors.push(ConfigError::InvalidRecipient);
    }

    if email.host.trim().is_empty() {
        errors.push(ConfigError::EmptyHost);
    }
    if email.port == 0 {
        errors.push(ConfigError::InvalidPort);
    }

    if config.capacity == 0 {
        errors.push(ConfigError::ZeroCapacity);
    }
    if config.connect_timeout_secs == 0 {
        errors.push(ConfigError::ZeroTimeout);
    }
    if config.state_path.as_os_str().is_empty() {
        errors.push(ConfigError::EmptyStatePath);
    }
    if config.log_file.as_os_str().is_empty() {
        errors.push(ConfigError::EmptyLogFile);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

impl MailerConfig {
    /// Validate this configuration. See [`validate_config`].
    ///
    /// # Errors
    ///
    /// Returns every problem found.
    pub fn validate(&self) -> ValidationResult {
        validate_config(self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::EmailSettings;

    fn valid() -> MailerConfig {
        MailerConfig::new(
            EmailSettings::new(
                "alerts@example.com",
                vec!["ops@example.com".to_string()],
                "Error Alert",
                "smtp.example.com",
            ),
            "state.json",
            "app.log",
        )
    }

    #[test]
    fn test_validate_complete_config() {
        assert!(validate_config(&valid()).is_ok());
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let mut config = valid();
        config.email.fromaddr = "not-an-address".to_string();
        config.email.toaddrs.clear();
        config.email.host = " ".to_string();
        config.email.port = 0;
        config.capacity = 0;

        let errors = config.validate().unwrap_err();
        assert_eq!(
            errors,
            vec![
                ConfigError::InvalidFromAddr,
                ConfigError::NoRecipients,
                ConfigError::EmptyHost,
                ConfigError::InvalidPort,
                ConfigError::ZeroCapacity,
            ]
        );
    }

    #[test]
    fn test_validate_bad_recipient() {
        let mut config = valid();
        config.email.toaddrs.push("ops at example".to_string());
        assert_eq!(
            config.validate().unwrap_err(),
            vec![ConfigError::InvalidRecipient]
        );
    }

    #[test]
    fn test_error_display_names_field() {
        assert_eq!(
            ConfigError::InvalidPort.to_string(),
            "port: SMTP port must be 1-65535"
        );
    }
}
