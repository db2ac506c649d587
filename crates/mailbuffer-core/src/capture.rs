//! `tracing` integration.
//!
//! [`CaptureLayer`] turns events from the host application into
//! [`LogEntry`] values in a mailer's [`EntryBuffer`]:
//!
//! ```no_run
//! use mailbuffer_core::{BufferingMailer, CaptureLayer, Level, MailerConfig};
//! use tracing_subscriber::prelude::*;
//!
//! # fn main() -> mailbuffer_core::Result<()> {
//! let config = MailerConfig::from_file("config.json")?;
//! let mailer = BufferingMailer::with_smtp(config)?;
//! tracing_subscriber::registry()
//!     .with(CaptureLayer::new(mailer.handle()).with_min_level(Level::Warning))
//!     .init();
//! # Ok(())
//! # }
//! ```

use std::fmt::{self, Write};

use chrono::Local;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use crate::entry::{Level, LogEntry, TIMESTAMP_FORMAT};
use crate::mailer::EntryBuffer;

/// Crates whose events are never captured, so the mailer's own
/// diagnostics cannot feed back into the buffer.
const OWN_CRATES: &[&str] = &["mailbuffer_core", "mailbuffer_smtp", "mailbuffer_mime"];

/// True for a target that is one of [`OWN_CRATES`] or a module inside one.
fn is_own_target(target: &str) -> bool {
    OWN_CRATES.iter().any(|krate| {
        target
            .strip_prefix(krate)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
    })
}

/// Appends qualifying events to an [`EntryBuffer`].
#[derive(Debug, Clone)]
pub struct CaptureLayer {
    buffer: EntryBuffer,
    min_level: Level,
}

impl CaptureLayer {
    /// Captures `ERROR` events into `buffer`.
    #[must_use]
    pub const fn new(buffer: EntryBuffer) -> Self {
        Self {
            buffer,
            min_level: Level::Error,
        }
    }

    /// Sets the lowest level captured.
    #[must_use]
    pub const fn with_min_level(mut self, level: Level) -> Self {
        self.min_level = level;
        self
    }
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        if is_own_target(meta.target()) {
            return;
        }
        let level = Level::from(*meta.level());
        if level < self.min_level {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let mut entry = LogEntry::new(
            meta.target(),
            level,
            visitor.finish(),
            meta.file().unwrap_or_default(),
            meta.line().unwrap_or_default(),
        )
        .with_timestamp(Local::now().format(TIMESTAMP_FORMAT).to_string());
        entry.function = meta.module_path().map(str::to_string);

        self.buffer.push(entry);
    }
}

/// Collects the `message` field and renders the rest as `key=value`.
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn finish(self) -> String {
        match (self.message.is_empty(), self.fields.is_empty()) {
            (_, true) => self.message,
            (true, false) => self.fields,
            (false, false) => format!("{} {}", self.message, self.fields),
        }
    }

    fn push_field(&mut self, name: &str, value: fmt::Arguments<'_>) {
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        let _ = write!(self.fields, "{name}={value}");
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.push_field(field.name(), format_args!("{value}"));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.push_field(field.name(), format_args!("{value:?}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::prelude::*;

    fn capture(min_level: Level, emit: impl FnOnce()) -> Vec<LogEntry> {
        let buffer = EntryBuffer::new();
        let subscriber = tracing_subscriber::registry()
            .with(CaptureLayer::new(buffer.clone()).with_min_level(min_level));
        tracing::subscriber::with_default(subscriber, emit);
        buffer.snapshot()
    }

    #[test]
    fn test_captures_error_event() {
        let entries = capture(Level::Error, || {
            tracing::error!(target: "billing::invoice", "payment gateway timed out");
        });

        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.name, "billing::invoice");
        assert_eq!(entry.level, Level::Error);
        assert_eq!(entry.message, "payment gateway timed out");
        assert_eq!(entry.filename(), "capture.rs");
        assert!(entry.lineno > 0);
        assert!(entry.function.is_some());
        assert!(entry.asctime.is_some());
    }

    #[test]
    fn test_filters_by_level() {
        let entries = capture(Level::Warning, || {
            tracing::info!(target: "app", "started");
            tracing::warn!(target: "app", "disk 90% full");
            tracing::error!(target: "app", "disk full");
        });

        let levels: Vec<Level> = entries.iter().map(|e| e.level).collect();
        assert_eq!(levels, vec![Level::Warning, Level::Error]);
    }

    #[test]
    fn test_ignores_own_targets() {
        let entries = capture(Level::Debug, || {
            tracing::error!(target: "mailbuffer_core::mailer", "Failed to send e-mail");
            tracing::error!(target: "mailbuffer_smtp", "Connection closed by server");
            tracing::error!(target: "app", "real failure");
        });

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message, "real failure");
    }

    #[test]
    fn test_captures_similarly_named_host_crates() {
        let entries = capture(Level::Error, || {
            tracing::error!(target: "mailbuffer_reports::job", "report failed");
            tracing::error!(target: "mailbuffer_core_ext", "extension failed");
        });

        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["mailbuffer_reports::job", "mailbuffer_core_ext"]);
    }

    #[test]
    fn test_structured_fields_are_appended() {
        let entries = capture(Level::Error, || {
            tracing::error!(target: "app", order_id = 42, customer = "acme", "charge failed");
        });

        assert_eq!(entries[0].message, "charge failed order_id=42 customer=acme");
    }

    #[test]
    fn test_fields_only_event() {
        let entries = capture(Level::Error, || {
            tracing::error!(target: "app", code = 7);
        });

        assert_eq!(entries[0].message, "code=7");
    }
}
