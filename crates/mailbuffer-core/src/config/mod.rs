//! Mailer configuration.
//!
//! Settings are read from a JSON file. The SMTP password may instead come
//! from the [`PASSWORD_ENV`] environment variable so it can stay out of the
//! file.

mod model;
mod validation;

pub use model::{
    DEFAULT_CAPACITY, DEFAULT_CONNECT_TIMEOUT_SECS, EmailSettings, MailerConfig, PASSWORD_ENV,
};
pub use validation::{ConfigError, ValidationResult, validate_config};
