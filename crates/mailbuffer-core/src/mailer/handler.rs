//! The buffering mailer.

use std::sync::Arc;

use chrono::Local;
use mailbuffer_mime::{Attachment, MessageBuilder};

use super::buffer::EntryBuffer;
use super::outcome::FlushOutcome;
use super::render::render_body;
use crate::config::MailerConfig;
use crate::entry::{Level, LogEntry, TIMESTAMP_FORMAT};
use crate::error::{Error, Result};
use crate::service::{Envelope, Notifier, SmtpTransport, TracingNotifier, Transport};
use crate::state::StateStore;

/// Collects log entries and mails them as one alert per flush.
///
/// Entries are appended freely and only leave the buffer after the server
/// accepts the alert containing them. The state file is rewritten on every
/// flush that finds entries, so a restart picks up where the last run left
/// off.
pub struct BufferingMailer {
    config: MailerConfig,
    state: StateStore,
    buffer: EntryBuffer,
    transport: Arc<dyn Transport>,
    notifier: Arc<dyn Notifier>,
}

impl BufferingMailer {
    /// Creates a mailer, restoring pending entries from the state file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configuration is invalid, or any
    /// error from [`StateStore::load`].
    pub fn new(
        config: MailerConfig,
        transport: Arc<dyn Transport>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        if let Err(errors) = config.validate() {
            let joined = errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(Error::Config(joined));
        }

        let state = StateStore::load(&config.state_path)?;
        let buffer = EntryBuffer::from_entries(state.buffer.clone());
        Ok(Self {
            config,
            state,
            buffer,
            transport,
            notifier,
        })
    }

    /// Creates a mailer that delivers over SMTP and reports through `tracing`.
    ///
    /// # Errors
    ///
    /// Same as [`BufferingMailer::new`].
    pub fn with_smtp(config: MailerConfig) -> Result<Self> {
        let transport = Arc::new(SmtpTransport::from_config(&config));
        Self::new(config, transport, Arc::new(TracingNotifier))
    }

    /// Returns a handle producers can append through.
    #[must_use]
    pub fn handle(&self) -> EntryBuffer {
        self.buffer.clone()
    }

    /// Appends an entry. Never flushes.
    pub fn append(&self, entry: LogEntry) {
        self.buffer.push(entry);
    }

    /// Always false: sending happens only on an explicit [`flush`](Self::flush).
    #[must_use]
    pub const fn should_auto_flush(&self, _entry: &LogEntry) -> bool {
        false
    }

    /// Copies the pending entries.
    #[must_use]
    pub fn entries(&self) -> Vec<LogEntry> {
        self.buffer.snapshot()
    }

    /// Number of pending entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Bytes counted against [`capacity`](Self::capacity).
    #[must_use]
    pub fn total_size(&self) -> usize {
        self.buffer.total_size()
    }

    /// Buffered bytes at which a non-forced flush sends.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.config.capacity
    }

    /// The state store as of the last save.
    #[must_use]
    pub const fn state(&self) -> &StateStore {
        &self.state
    }

    /// The configuration in use.
    #[must_use]
    pub const fn config(&self) -> &MailerConfig {
        &self.config
    }

    /// Writes the pending entries to the state file. The buffer is kept.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the state file cannot be written.
    pub fn save(&mut self) -> Result<()> {
        self.state.buffer = self.buffer.snapshot();
        self.state.save()
    }

    /// Sends the pending entries if forced or at capacity.
    ///
    /// Delivery failures are reported in the returned outcome, not as an
    /// error; the entries stay buffered and persisted for the next attempt.
    ///
    /// # Errors
    ///
    /// - [`Error::AttachmentMissing`] if the log file does not exist; nothing
    ///   is sent and the caller should stop
    /// - [`Error::Io`] if the state file cannot be written
    /// - [`Error::Message`] if the alert cannot be built
    pub async fn flush(&mut self, force: bool, custom_alerts: &[String]) -> Result<FlushOutcome> {
        self.notifier.record(Level::Debug, "Entering flush");

        if self.buffer.is_empty() {
            self.notifier.record(Level::Debug, "Buffer is empty");
            return Ok(FlushOutcome::not_attempted("buffer empty"));
        }

        if self.buffer.total_size() < self.config.capacity && !force {
            self.notifier
                .record(Level::Debug, "Buffer below threshold, saving for later");
            self.save()?;
            return Ok(FlushOutcome::not_attempted("below threshold"));
        }

        let now = Local::now();
        let pending = self
            .buffer
            .stamp_missing(&now.format(TIMESTAMP_FORMAT).to_string());
        let body = render_body(&pending, custom_alerts, now.date_naive());

        let attachment = match Attachment::from_file(&self.config.log_file) {
            Ok(attachment) => attachment,
            Err(e) if e.is_not_found() => {
                self.notifier.record(
                    Level::Critical,
                    &format!(
                        "Could not find the log file {}",
                        self.config.log_file.display()
                    ),
                );
                self.save()?;
                return Err(Error::AttachmentMissing(self.config.log_file.clone()));
            }
            Err(e) => return Err(e.into()),
        };

        let email = &self.config.email;
        let message = MessageBuilder::new()
            .from(email.fromaddr.as_str())
            .to_many(email.toaddrs.iter().map(String::as_str))
            .subject(email.subject.as_str())
            .date(now.fixed_offset())
            .text_body(body)
            .attach(attachment)
            .build()?;
        let envelope = Envelope {
            from: email.fromaddr.clone(),
            to: email.toaddrs.clone(),
        };

        match self.transport.send(&envelope, &message.to_bytes()).await {
            Ok(()) => {
                self.notifier.record(Level::Info, "Successfully sent e-mail");
                // Persist what remains before dropping the sent entries from
                // memory; a failed save leaves the buffer untouched.
                self.state.buffer = self
                    .buffer
                    .snapshot()
                    .into_iter()
                    .skip(pending.len())
                    .collect();
                self.state.save()?;
                self.buffer.drain_front(pending.len());
                Ok(FlushOutcome::succeeded("e-mail sent"))
            }
            Err(e) => {
                self.notifier
                    .record(Level::Warning, &format!("Failed to send e-mail: {e}"));
                self.save()?;
                Ok(FlushOutcome::failed(e.to_string()))
            }
        }
    }
}

impl std::fmt::Debug for BufferingMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferingMailer")
            .field("config", &self.config)
            .field("pending", &self.buffer.len())
            .finish_non_exhaustive()
    }
}
