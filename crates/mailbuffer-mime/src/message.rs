//! MIME message structure and generation.

use crate::content_type::ContentType;
use crate::encoding::{encode_base64_wrapped, encode_parameter};
use crate::error::{Error, Result};
use crate::header::Headers;
use chrono::{DateTime, FixedOffset, Local};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Transfer encoding of every part.
const TRANSFER_ENCODING: &str = "base64";

/// A file to attach, held as raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// File name shown to the recipient.
    pub filename: String,
    /// Raw file content.
    pub content: Vec<u8>,
}

impl Attachment {
    /// Creates an attachment from in-memory bytes.
    #[must_use]
    pub fn new(filename: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content,
        }
    }

    /// Reads a file and names the attachment after its final path component.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read; use
    /// [`Error::is_not_found`] to detect a missing file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read(path)?;
        let filename = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        Ok(Self { filename, content })
    }
}

/// MIME message part with an already-encoded body.
#[derive(Debug, Clone)]
pub struct Part {
    /// Part headers.
    pub headers: Headers,
    /// Encoded body, CRLF-terminated.
    pub body: Vec<u8>,
}

impl Part {
    /// Creates a UTF-8 `text/plain` part, base64 encoded.
    ///
    /// # Errors
    ///
    /// Never fails for the fixed headers used; the signature matches
    /// [`Part::attachment`].
    pub fn text(text: &str) -> Result<Self> {
        let mut headers = Headers::new();
        headers.add("Content-Type", ContentType::text_plain().to_string())?;
        headers.add("Content-Transfer-Encoding", TRANSFER_ENCODING)?;
        Ok(Self {
            headers,
            body: encode_base64_wrapped(text.as_bytes()).into_bytes(),
        })
    }

    /// Creates an `application/octet-stream` attachment part.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHeader`] if the file name contains line breaks.
    pub fn attachment(attachment: &Attachment) -> Result<Self> {
        let name = &attachment.filename;
        let mut headers = Headers::new();
        headers.add(
            "Content-Type",
            ContentType::octet_stream(name.as_str()).to_string(),
        )?;
        headers.add("Content-Transfer-Encoding", TRANSFER_ENCODING)?;
        headers.add(
            "Content-Disposition",
            format!("attachment; {}", encode_parameter("filename", name)),
        )?;
        Ok(Self {
            headers,
            body: encode_base64_wrapped(&attachment.content).into_bytes(),
        })
    }
}

/// A complete MIME message ready for SMTP submission.
#[derive(Debug, Clone)]
pub struct Message {
    /// Message headers.
    pub headers: Headers,
    /// Message parts (empty for single-part messages).
    pub parts: Vec<Part>,
    /// Body for single-part messages.
    pub body: Option<Vec<u8>>,
    boundary: Option<String>,
}

impl Message {
    /// Serializes the message with CRLF line endings.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = self.headers.to_string().into_bytes();
        out.extend_from_slice(b"\r\n");

        match (&self.boundary, &self.body) {
            (Some(boundary), _) => {
                for part in &self.parts {
                    out.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
                    out.extend_from_slice(part.headers.to_string().as_bytes());
                    out.extend_from_slice(b"\r\n");
                    out.extend_from_slice(&part.body);
                }
                out.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
            }
            (None, Some(body)) => out.extend_from_slice(body),
            (None, None) => {}
        }
        out
    }
}

/// Builder for outgoing messages.
#[derive(Debug, Default)]
pub struct MessageBuilder {
    from: Option<String>,
    to: Vec<String>,
    subject: Option<String>,
    date: Option<DateTime<FixedOffset>>,
    text: Option<String>,
    attachments: Vec<Attachment>,
    boundary: Option<String>,
}

impl MessageBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the sender (required).
    #[must_use]
    pub fn from(mut self, address: impl Into<String>) -> Self {
        self.from = Some(address.into());
        self
    }

    /// Adds a primary recipient (at least one required).
    #[must_use]
    pub fn to(mut self, address: impl Into<String>) -> Self {
        self.to.push(address.into());
        self
    }

    /// Adds multiple primary recipients.
    #[must_use]
    pub fn to_many(mut self, addresses: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.to.extend(addresses.into_iter().map(Into::into));
        self
    }

    /// Sets the subject line (required).
    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Overrides the Date header (defaults to now, local time).
    #[must_use]
    pub const fn date(mut self, date: DateTime<FixedOffset>) -> Self {
        self.date = Some(date);
        self
    }

    /// Sets the plain text body.
    #[must_use]
    pub fn text_body(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Adds an attachment; any attachment makes the message multipart/mixed.
    #[must_use]
    pub fn attach(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Overrides the generated multipart boundary.
    #[must_use]
    pub fn boundary(mut self, boundary: impl Into<String>) -> Self {
        self.boundary = Some(boundary.into());
        self
    }

    /// Builds the message, validating required fields.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingHeader`] without a sender, recipient or
    /// subject, [`Error::EmptyMessage`] without any content, and
    /// [`Error::InvalidHeader`] for values containing line breaks.
    pub fn build(self) -> Result<Message> {
        let from = self.from.ok_or_else(|| Error::MissingHeader("From".into()))?;
        if self.to.is_empty() {
            return Err(Error::MissingHeader("To".into()));
        }
        let subject = self
            .subject
            .ok_or_else(|| Error::MissingHeader("Subject".into()))?;
        if self.text.is_none() && self.attachments.is_empty() {
            return Err(Error::EmptyMessage);
        }

        let date = self
            .date
            .unwrap_or_else(|| Local::now().fixed_offset());
        let (stamp, seq) = unique_stamp();

        let mut headers = Headers::new();
        headers.add("From", from.as_str())?;
        headers.add("To", self.to.join(", "))?;
        headers.add("Subject", subject)?;
        headers.add("Date", date.to_rfc2822())?;
        headers.add(
            "Message-ID",
            format!("<{stamp:x}.{seq}@{}>", domain_of(&from)),
        )?;
        headers.add("MIME-Version", "1.0")?;

        if self.attachments.is_empty() {
            let text = Part::text(self.text.as_deref().unwrap_or_default())?;
            for (name, value) in text.headers.iter() {
                headers.add(name, value)?;
            }
            return Ok(Message {
                headers,
                parts: Vec::new(),
                body: Some(text.body),
                boundary: None,
            });
        }

        let boundary = self
            .boundary
            .unwrap_or_else(|| format!("=_mailbuffer_{stamp:x}_{seq}"));
        headers.add(
            "Content-Type",
            ContentType::multipart_mixed(boundary.as_str()).to_string(),
        )?;

        let mut parts = Vec::with_capacity(self.attachments.len() + 1);
        if let Some(text) = &self.text {
            parts.push(Part::text(text)?);
        }
        for attachment in &self.attachments {
            parts.push(Part::attachment(attachment)?);
        }

        Ok(Message {
            headers,
            parts,
            body: None,
            boundary: Some(boundary),
        })
    }
}

/// Returns a timestamp plus a process-wide sequence number for unique ids.
fn unique_stamp() -> (u128, u64) {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos());
    (nanos, SEQUENCE.fetch_add(1, Ordering::Relaxed))
}

fn domain_of(address: &str) -> &str {
    address
        .rsplit_once('@')
        .map_or("localhost", |(_, domain)| domain.trim_end_matches('>').trim())
}
