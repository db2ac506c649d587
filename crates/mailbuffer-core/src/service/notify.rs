//! Diagnostics sink for the mailer.

use tracing::{debug, error, info, warn};

use crate::entry::Level;

/// Receives the mailer's own progress and failure messages.
pub trait Notifier: Send + Sync {
    /// Records one message.
    fn record(&self, level: Level, message: &str);
}

/// Forwards to `tracing` at the matching level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn record(&self, level: Level, message: &str) {
        match level {
            Level::Debug => debug!("{message}"),
            Level::Info => info!("{message}"),
            Level::Warning => warn!("{message}"),
            Level::Error | Level::Critical => error!("{message}"),
        }
    }
}

impl<F> Notifier for F
where
    F: Fn(Level, &str) + Send + Sync,
{
    fn record(&self, level: Level, message: &str) {
        self(level, message);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_closure_notifier() {
        let seen = Mutex::new(Vec::new());
        let notifier = |level: Level, message: &str| {
            seen.lock().unwrap().push((level, message.to_string()));
        };

        notifier.record(Level::Warning, "send failed");
        TracingNotifier.record(Level::Critical, "ignored by the closure");

        assert_eq!(
            *seen.lock().unwrap(),
            vec![(Level::Warning, "send failed".to_string())]
        );
    }
}
