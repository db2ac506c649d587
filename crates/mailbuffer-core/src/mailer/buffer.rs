//! Shared in-memory entry sequence.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::entry::LogEntry;

/// Cloneable handle to the pending entries.
///
/// The mailer and any number of producers (such as
/// [`CaptureLayer`](crate::CaptureLayer)) share one sequence. The lock is
/// held only for the duration of each call, never across I/O.
#[derive(Debug, Clone, Default)]
pub struct EntryBuffer {
    inner: Arc<Mutex<Vec<LogEntry>>>,
}

impl EntryBuffer {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a buffer holding `entries`.
    #[must_use]
    pub fn from_entries(entries: Vec<LogEntry>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(entries)),
        }
    }

    /// Appends an entry.
    pub fn push(&self, entry: LogEntry) {
        self.lock().push(entry);
    }

    /// Copies the current entries.
    #[must_use]
    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.lock().clone()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Sum of [`LogEntry::size`] over all entries.
    #[must_use]
    pub fn total_size(&self) -> usize {
        self.lock().iter().map(LogEntry::size).sum()
    }

    /// Gives every entry lacking a timestamp the value `stamp`, then returns
    /// a copy of all entries.
    pub fn stamp_missing(&self, stamp: &str) -> Vec<LogEntry> {
        let mut entries = self.lock();
        for entry in entries.iter_mut().filter(|e| e.asctime.is_none()) {
            entry.asctime = Some(stamp.to_string());
        }
        entries.clone()
    }

    /// Removes the first `count` entries, keeping anything pushed after them.
    pub fn drain_front(&self, count: usize) {
        let mut entries = self.lock();
        let count = count.min(entries.len());
        entries.drain(..count);
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LogEntry>> {
        // A panicking producer cannot leave a half-pushed entry behind.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
