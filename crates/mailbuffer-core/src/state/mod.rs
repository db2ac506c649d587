//! Durable storage for pending log entries.
//!
//! The store is a single JSON document holding the path it was written to
//! and the ordered list of entries not yet mailed. Every save replaces the
//! document atomically, so a crash leaves either the previous or the new
//! content on disk.

mod fsync;
mod model;
mod store;

pub use model::{StoredEntry, StoredState};
pub use store::StateStore;
