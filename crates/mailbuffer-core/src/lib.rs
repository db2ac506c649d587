//! # mailbuffer-core
//!
//! Persistent log buffering with batched e-mail alerts.
//!
//! This crate provides:
//! - Log entry and severity models
//! - A JSON state store that survives restarts
//! - The buffering mailer that renders, attaches, and delivers alerts
//! - Mailer configuration loading and validation
//! - A `tracing` layer that feeds events into the buffer

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod capture;
pub mod config;
pub mod entry;
mod error;
pub mod mailer;
pub mod service;
pub mod state;

pub use capture::CaptureLayer;
pub use config::{ConfigError, EmailSettings, MailerConfig, validate_config};
pub use entry::{Level, LogEntry, TIMESTAMP_FORMAT};
pub use error::{Error, Result};
pub use mailer::{BufferingMailer, EntryBuffer, FlushOutcome, FlushStatus};
pub use service::{DeliveryError, Envelope, Notifier, SmtpTransport, TracingNotifier, Transport};
pub use state::{StateStore, StoredEntry, StoredState};
