//! Buffered alert delivery.
//!
//! Entries accumulate in an [`EntryBuffer`] until a flush renders them into
//! one alert message, attaches the log file, and hands the result to a
//! [`Transport`](crate::Transport). Every flush that gets past the empty
//! check leaves the state file matching the buffer.

mod buffer;
mod handler;
mod outcome;
pub mod render;

pub use buffer::EntryBuffer;
pub use handler::BufferingMailer;
pub use outcome::{FlushOutcome, FlushStatus};
