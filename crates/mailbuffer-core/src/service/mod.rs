//! Collaborators the mailer talks to.
//!
//! [`Notifier`] receives the mailer's own diagnostics and [`Transport`]
//! delivers a finished message. Both are traits so tests and embedders can
//! swap them out.

mod notify;
mod transport;

pub use notify::{Notifier, TracingNotifier};
pub use transport::{DeliveryError, Envelope, SmtpTransport, Transport};
