//! Flush results.

use std::fmt;

/// What a flush did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushStatus {
    /// The alert was accepted by the server.
    Succeeded,
    /// Delivery was attempted and failed; entries stay buffered.
    Failed,
    /// Nothing was sent: the buffer was empty or below capacity.
    NotAttempted,
}

/// Result of one flush, with a human-readable detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlushOutcome {
    /// What happened.
    pub status: FlushStatus,
    /// Why.
    pub detail: String,
}

impl FlushOutcome {
    /// Successful delivery.
    #[must_use]
    pub fn succeeded(detail: impl Into<String>) -> Self {
        Self {
            status: FlushStatus::Succeeded,
            detail: detail.into(),
        }
    }

    /// Failed delivery.
    #[must_use]
    pub fn failed(detail: impl Into<String>) -> Self {
        Self {
            status: FlushStatus::Failed,
            detail: detail.into(),
        }
    }

    /// No delivery attempted.
    #[must_use]
    pub fn not_attempted(detail: impl Into<String>) -> Self {
        Self {
            status: FlushStatus::NotAttempted,
            detail: detail.into(),
        }
    }

    /// Returns true if the alert was delivered.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == FlushStatus::Succeeded
    }
}

impl fmt::Display for FlushStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::NotAttempted => "not attempted",
        })
    }
}

impl fmt::Display for FlushOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status, self.detail)
    }
}
