//! Message delivery.

use std::time::Duration;

use async_trait::async_trait;
use mailbuffer_smtp::{Address, Session};
use tracing::{debug, warn};

use crate::config::MailerConfig;

/// Sender and recipients for one delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Envelope sender.
    pub from: String,
    /// Envelope recipients.
    pub to: Vec<String>,
}

/// Why a delivery did not happen.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// The SMTP exchange failed.
    #[error("SMTP error: {0}")]
    Smtp(#[from] mailbuffer_smtp::Error),

    /// Any other transport failure.
    #[error("{0}")]
    Other(String),
}

/// Delivers a fully rendered message.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `message` to every recipient in `envelope`.
    ///
    /// # Errors
    ///
    /// Returns a [`DeliveryError`] if the message was not accepted.
    async fn send(&self, envelope: &Envelope, message: &[u8]) -> Result<(), DeliveryError>;
}

/// [`Transport`] over a fresh SMTP connection per delivery.
///
/// With `starttls` set the session is upgraded, then authenticated as the
/// sender when a password is configured. QUIT is attempted whether or not
/// the transaction succeeded.
#[derive(Clone)]
pub struct SmtpTransport {
    host: String,
    port: u16,
    starttls: bool,
    username: String,
    password: Option<String>,
    timeout: Duration,
    client_hostname: String,
}

impl SmtpTransport {
    /// Creates a transport from mailer settings.
    #[must_use]
    pub fn from_config(config: &MailerConfig) -> Self {
        Self {
            host: config.email.host.clone(),
            port: config.email.port,
            starttls: config.email.starttls,
            username: config.email.fromaddr.clone(),
            password: config.email.password.clone(),
            timeout: config.connect_timeout(),
            client_hostname: config.client_hostname.clone(),
        }
    }
}

impl std::fmt::Debug for SmtpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpTransport")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("starttls", &self.starttls)
            .field("username", &self.username)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for SmtpTransport {
    async fn send(&self, envelope: &Envelope, message: &[u8]) -> Result<(), DeliveryError> {
        let from = Address::new(envelope.from.as_str())?;
        let to = envelope
            .to
            .iter()
            .map(|addr| Address::new(addr.as_str()))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(host = %self.host, port = self.port, "Connecting to SMTP server");
        let mut session = Session::connect(&self.host, self.port, self.timeout).await?;
        session.ehlo(&self.client_hostname).await?;

        if self.starttls {
            session = session.starttls().await?;
            if let Some(password) = &self.password {
                session.login(&self.username, password).await?;
            }
        }

        match session.send_mail(&from, &to, message).await {
            Ok(refused) => {
                for recipient in &refused {
                    warn!(recipient = %recipient, "Recipient refused");
                }
                if let Err(e) = session.quit().await {
                    debug!(error = %e, "QUIT failed after delivery");
                }
                Ok(())
            }
            Err(e) => {
                if let Err(quit_err) = session.quit().await {
                    debug!(error = %quit_err, "QUIT failed after rejected delivery");
                }
                Err(e.into())
            }
        }
    }
}
