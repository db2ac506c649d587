//! SMTP client session.

use crate::address::Address;
use crate::command::{Command, encode_data};
use crate::error::{Error, Result};
use crate::extension::{AuthMechanism, Extension};
use crate::reply::{Reply, ReplyCode, ReplyParser};
use crate::stream::SmtpStream;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Server capabilities learned from the greeting and EHLO.
#[derive(Debug, Clone, Default)]
pub struct ServerInfo {
    /// Server hostname from greeting.
    pub hostname: String,
    /// Supported extensions.
    pub extensions: HashSet<Extension>,
}

impl ServerInfo {
    /// Checks if STARTTLS is supported.
    #[must_use]
    pub fn supports_starttls(&self) -> bool {
        self.extensions.contains(&Extension::StartTls)
    }

    /// Returns the maximum message size, if advertised.
    #[must_use]
    pub fn max_message_size(&self) -> Option<usize> {
        self.extensions.iter().find_map(|ext| match ext {
            Extension::Size(size) => *size,
            _ => None,
        })
    }

    /// Returns true if the server advertised SIZE at all.
    #[must_use]
    pub fn supports_size(&self) -> bool {
        self.extensions
            .iter()
            .any(|ext| matches!(ext, Extension::Size(_)))
    }

    /// Returns the authentication mechanisms this client can use.
    #[must_use]
    pub fn auth_mechanisms(&self) -> Vec<AuthMechanism> {
        self.extensions
            .iter()
            .find_map(|ext| match ext {
                Extension::Auth(mechanisms) => Some(mechanisms.clone()),
                _ => None,
            })
            .unwrap_or_default()
    }

    /// Returns true if the server advertised AUTH, even with no usable mechanism.
    #[must_use]
    pub fn supports_auth(&self) -> bool {
        self.extensions
            .iter()
            .any(|ext| matches!(ext, Extension::Auth(_)))
    }
}

/// An open conversation with an SMTP server.
///
/// Dropping a session closes the socket; [`Session::quit`] ends it politely.
#[derive(Debug)]
pub struct Session {
    stream: SmtpStream,
    host: String,
    client_hostname: String,
    server_info: ServerInfo,
}

impl Session {
    /// Connects to `hostname:port` and reads the `220` greeting.
    ///
    /// The whole step, including the greeting, is bounded by `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`], an I/O error for refused connections or
    /// DNS failures, or an SMTP error if the server rejects the connection.
    pub async fn connect(hostname: &str, port: u16, timeout: Duration) -> Result<Self> {
        debug!(host = hostname, port, "connecting to SMTP server");

        let connect = async {
            let mut stream = SmtpStream::connect(hostname, port, timeout).await?;
            let greeting = read_reply(&mut stream).await?;
            Ok::<_, Error>((stream, greeting))
        };
        let (stream, greeting) = tokio::time::timeout(timeout, connect)
            .await
            .map_err(|_| Error::Timeout(timeout))??;

        if greeting.code != ReplyCode::SERVICE_READY {
            return Err(greeting.into_error());
        }

        let server_hostname = greeting
            .lines
            .first()
            .and_then(|msg| msg.split_whitespace().next())
            .unwrap_or("unknown")
            .to_string();

        Ok(Self {
            stream,
            host: hostname.to_string(),
            client_hostname: "localhost".to_string(),
            server_info: ServerInfo {
                hostname: server_hostname,
                extensions: HashSet::new(),
            },
        })
    }

    /// Returns the server information gathered so far.
    #[must_use]
    pub const fn server_info(&self) -> &ServerInfo {
        &self.server_info
    }

    /// Sends EHLO and records the advertised extensions.
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects EHLO.
    pub async fn ehlo(&mut self, client_hostname: &str) -> Result<()> {
        self.client_hostname = client_hostname.to_string();
        let reply = self
            .command(Command::Ehlo {
                hostname: client_hostname.to_string(),
            })
            .await?;
        if !reply.is_success() {
            return Err(reply.into_error());
        }

        // First line is the server greeting, the rest are extensions.
        self.server_info.extensions = reply
            .lines
            .iter()
            .skip(1)
            .map(|line| Extension::parse(line))
            .collect();
        Ok(())
    }

    /// Upgrades the connection with STARTTLS and repeats EHLO.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is already encrypted, STARTTLS is not
    /// advertised or is refused, or the TLS handshake fails.
    pub async fn starttls(mut self) -> Result<Self> {
        if self.stream.is_tls() {
            return Err(Error::Protocol("Already using TLS".into()));
        }
        if !self.server_info.supports_starttls() {
            return Err(Error::NotSupported("STARTTLS".into()));
        }

        let reply = self.command(Command::StartTls).await?;
        if !reply.is_success() {
            return Err(reply.into_error());
        }

        self.stream = self.stream.upgrade_to_tls(&self.host).await?;
        debug!(host = %self.host, "TLS established");

        // Extensions must be rediscovered over the encrypted channel.
        let client_hostname = self.client_hostname.clone();
        self.ehlo(&client_hostname).await?;
        Ok(self)
    }

    /// Authenticates, preferring PLAIN and falling back to LOGIN.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotSupported`] if the server offers neither
    /// mechanism, or an SMTP error if the credentials are rejected.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<()> {
        if !self.server_info.supports_auth() {
            return Err(Error::NotSupported("AUTH".into()));
        }

        let mechanisms = self.server_info.auth_mechanisms();
        let reply = if mechanisms.contains(&AuthMechanism::Plain) {
            self.auth_plain(username, password).await?
        } else if mechanisms.contains(&AuthMechanism::Login) {
            self.auth_login(username, password).await?
        } else {
            return Err(Error::NotSupported("AUTH PLAIN or LOGIN".into()));
        };

        if reply.code != ReplyCode::AUTH_SUCCESS {
            return Err(reply.into_error());
        }
        debug!(user = username, "authenticated");
        Ok(())
    }

    async fn auth_plain(&mut self, username: &str, password: &str) -> Result<Reply> {
        let credentials = format!("\0{username}\0{password}");
        self.command(Command::Auth {
            mechanism: AuthMechanism::Plain,
            initial_response: Some(STANDARD.encode(credentials.as_bytes())),
        })
        .await
    }

    async fn auth_login(&mut self, username: &str, password: &str) -> Result<Reply> {
        let mut reply = self
            .command(Command::Auth {
                mechanism: AuthMechanism::Login,
                initial_response: None,
            })
            .await?;

        for secret in [username, password] {
            if reply.code != ReplyCode::AUTH_CONTINUE {
                return Err(reply.into_error());
            }
            reply = self
                .command(Command::AuthResponse(STANDARD.encode(secret.as_bytes())))
                .await?;
        }
        Ok(reply)
    }

    /// Runs one mail transaction: MAIL FROM, RCPT TO for each recipient,
    /// DATA and the message.
    ///
    /// Individual refused recipients do not abort the transaction; they are
    /// returned so the caller can report them.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no recipients, every recipient is
    /// refused, the message exceeds the advertised SIZE, or the server
    /// rejects the sender or the message.
    pub async fn send_mail(
        &mut self,
        from: &Address,
        to: &[Address],
        message: &[u8],
    ) -> Result<Vec<Address>> {
        if to.is_empty() {
            return Err(Error::InvalidAddress("No recipients specified".into()));
        }

        if let Some(limit) = self.server_info.max_message_size()
            && limit > 0
            && message.len() > limit
        {
            return Err(Error::MessageTooLarge(message.len()));
        }

        let size = self.server_info.supports_size().then_some(message.len());
        let reply = self
            .command(Command::MailFrom {
                from: from.clone(),
                size,
            })
            .await?;
        if !reply.is_success() {
            return Err(reply.into_error());
        }

        let mut refused = Vec::new();
        let mut last_refusal = String::new();
        for recipient in to {
            let reply = self
                .command(Command::RcptTo {
                    to: recipient.clone(),
                })
                .await?;
            if !reply.is_success() {
                warn!(recipient = %recipient, code = %reply.code, "recipient refused");
                last_refusal = format!("{recipient}: {} {}", reply.code, reply.text());
                refused.push(recipient.clone());
            }
        }
        if refused.len() == to.len() {
            return Err(Error::RecipientsRefused(last_refusal));
        }

        let reply = self.command(Command::Data).await?;
        if reply.code != ReplyCode::START_DATA {
            return Err(reply.into_error());
        }

        self.stream.write_all(&encode_data(message)).await?;
        let reply = read_reply(&mut self.stream).await?;
        if !reply.is_success() {
            return Err(reply.into_error());
        }

        debug!(
            bytes = message.len(),
            recipients = to.len() - refused.len(),
            "message accepted"
        );
        Ok(refused)
    }

    /// Sends QUIT and closes the connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the QUIT exchange fails.
    pub async fn quit(mut self) -> Result<()> {
        let reply = self.command(Command::Quit).await?;
        if !reply.is_success() {
            return Err(reply.into_error());
        }
        Ok(())
    }

    async fn command(&mut self, cmd: Command) -> Result<Reply> {
        trace!(verb = cmd.verb(), "sending command");
        self.stream.write_all(&cmd.serialize()).await?;
        read_reply(&mut self.stream).await
    }
}

async fn read_reply(stream: &mut SmtpStream) -> Result<Reply> {
    let mut parser = ReplyParser::new();
    loop {
        let line = stream.read_line().await?;
        if line.is_empty() {
            continue;
        }
        if let Some(reply) = parser.feed(&line)? {
            return Ok(reply);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn info(lines: &[&str]) -> ServerInfo {
        ServerInfo {
            hostname: "smtp.example.com".into(),
            extensions: lines.iter().map(|l| Extension::parse(l)).collect(),
        }
    }

    #[test]
    fn test_server_info_reports_capabilities() {
        let info = info(&["STARTTLS", "SIZE 1000", "AUTH LOGIN"]);
        assert!(info.supports_starttls());
        assert!(info.supports_auth());
        assert!(info.supports_size());
        assert_eq!(info.max_message_size(), Some(1000));
        assert_eq!(info.auth_mechanisms(), vec![AuthMechanism::Login]);
    }

    #[test]
    fn test_server_info_defaults_are_empty() {
        let info = info(&["8BITMIME"]);
        assert!(!info.supports_starttls());
        assert!(!info.supports_auth());
        assert_eq!(info.max_message_size(), None);
        assert!(info.auth_mechanisms().is_empty());
    }
}
