//! # mailbuffer-smtp
//!
//! A small SMTP submission client (RFC 5321) covering exactly what an alert
//! mailer needs: connect with a bounded timeout, EHLO, optional STARTTLS,
//! AUTH (PLAIN, falling back to LOGIN), one mail transaction, QUIT.
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::time::Duration;
//! use mailbuffer_smtp::{Address, Session};
//!
//! #[tokio::main]
//! async fn main() -> mailbuffer_smtp::Result<()> {
//!     let mut session =
//!         Session::connect("smtp.example.com", 587, Duration::from_secs(10)).await?;
//!     session.ehlo("client.example.com").await?;
//!
//!     let mut session = session.starttls().await?;
//!     session.login("alerts@example.com", "password").await?;
//!
//!     let from = Address::new("alerts@example.com")?;
//!     let to = [Address::new("oncall@example.com")?];
//!     session
//!         .send_mail(&from, &to, b"Subject: Test\r\n\r\nHello\r\n")
//!         .await?;
//!
//!     session.quit().await
//! }
//! ```
//!
//! ## Session lifecycle
//!
//! ```text
//! connect() ─→ ehlo() ─→ [starttls()] ─→ [login()] ─→ send_mail() ─→ quit()
//! ```
//!
//! Dropping a [`Session`] closes the socket without QUIT, so every exit path
//! releases the connection.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod address;
pub mod command;
mod error;
mod extension;
pub mod reply;
mod session;
mod stream;

pub use address::Address;
pub use error::{Error, Result};
pub use extension::{AuthMechanism, Extension};
pub use reply::{Reply, ReplyClass, ReplyCode, ReplyParser};
pub use session::{ServerInfo, Session};
pub use stream::SmtpStream;
