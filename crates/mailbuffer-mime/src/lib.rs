//! # mailbuffer-mime
//!
//! MIME message generation for alert emails.
//!
//! ## Features
//!
//! - **Message generation**: From/To/Subject/Date headers, with RFC 2047
//!   encoding for a non-ASCII subject
//! - **Attachments**: Raw file bytes attached as base64 `application/octet-stream`,
//!   non-ASCII file names sent as RFC 2231 parameters
//! - **Multipart**: `multipart/mixed` whenever attachments are present
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailbuffer_mime::{Attachment, MessageBuilder};
//!
//! let message = MessageBuilder::new()
//!     .from("alerts@example.com")
//!     .to("oncall@example.com")
//!     .subject("Error Alert")
//!     .text_body("Something broke.\r\n")
//!     .attach(Attachment::from_file("app.log")?)
//!     .build()?;
//!
//! let raw: Vec<u8> = message.to_bytes();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod content_type;
mod error;
mod header;
mod message;

pub mod encoding;

pub use content_type::ContentType;
pub use error::{Error, Result};
pub use header::Headers;
pub use message::{Attachment, Message, MessageBuilder, Part};
