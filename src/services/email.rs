//! Email notifier
//!
//! Sends plain-text messages to the configured target address over SMTP.
//! Failures are returned to the caller as [`DeliveryError`]; nothing is
//! retried.

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use serde::{Deserialize, Serialize};

/// Default SMTP port
pub const DEFAULT_SMTP_PORT: u16 = 25;

/// Where and how notification mail is sent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailSettings {
    pub smtp_server: String,
    /// Recipient of notifications
    pub target_email: String,
    pub port: u16,
    /// Sender address
    pub from: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub starttls: bool,
}

impl EmailSettings {
    /// Plain SMTP on port 25, sending from the target address without credentials
    pub fn new(smtp_server: impl Into<String>, target_email: impl Into<String>) -> Self {
        let target_email = target_email.into();
        Self {
            smtp_server: smtp_server.into(),
            from: target_email.clone(),
            target_email,
            port: DEFAULT_SMTP_PORT,
            username: None,
            password: None,
            starttls: false,
        }
    }

    /// The same transport settings addressed to another recipient
    pub fn for_recipient(&self, email: impl Into<String>) -> Self {
        Self {
            target_email: email.into(),
            ..self.clone()
        }
    }
}

/// Why a message was not delivered
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    #[error("Invalid email address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Failed to build email: {0}")]
    Message(String),

    #[error("SMTP delivery failed: {0}")]
    Transport(String),
}

/// Sends a message to `settings.target_email`
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, settings: &EmailSettings, subject: &str, body: &str) -> Result<(), DeliveryError>;
}

fn parse_mailbox(address: &str) -> Result<Mailbox, DeliveryError> {
    address
        .trim()
        .parse::<Mailbox>()
        .map_err(|e| DeliveryError::InvalidAddress {
            address: address.to_string(),
            reason: e.to_string(),
        })
}

/// Build the plain-text message described by `settings`
pub fn build_message(settings: &EmailSettings, subject: &str, body: &str) -> Result<Message, DeliveryError> {
    let from = parse_mailbox(&settings.from)?;
    let to = parse_mailbox(&settings.target_email)?;

    Message::builder()
        .from(from)
        .to(to)
        .subject(subject)
        .header(ContentType::TEXT_PLAIN)
        .body(body.to_string())
        .map_err(|e| DeliveryError::Message(e.to_string()))
}

/// SMTP notifier using lettre's tokio transport
#[derive(Debug, Clone, Default)]
pub struct SmtpNotifier;

impl SmtpNotifier {
    pub fn new() -> Self {
        Self
    }

    fn transport(settings: &EmailSettings) -> Result<AsyncSmtpTransport<Tokio1Executor>, DeliveryError> {
        let builder = if settings.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.smtp_server)
                .map_err(|e| DeliveryError::Transport(e.to_string()))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.smtp_server)
        };

        let builder = builder.port(settings.port);
        let builder = match (&settings.username, &settings.password) {
            (Some(username), Some(password)) => {
                builder.credentials(Credentials::new(username.clone(), password.clone()))
            }
            _ => builder,
        };

        Ok(builder.build())
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, settings: &EmailSettings, subject: &str, body: &str) -> Result<(), DeliveryError> {
        let message = build_message(settings, subject, body)?;
        let mailer = Self::transport(settings)?;

        mailer
            .send(message)
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        tracing::debug!(
            "Sent '{}' to {} via {}:{}",
            subject,
            settings.target_email,
            settings.smtp_server,
            settings.port
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_fills_defaults() {
        let settings = EmailSettings::new("smtp.example.com", "editor@example.com");

        assert_eq!(settings.port, 25);
        assert_eq!(settings.from, "editor@example.com");
        assert_eq!(settings.username, None);
        assert!(!settings.starttls);
    }

    #[test]
    fn test_for_recipient_keeps_transport() {
        let settings = EmailSettings::new("smtp.example.com", "editor@example.com");
        let reader = settings.for_recipient("reader@example.com");

        assert_eq!(reader.target_email, "reader@example.com");
        assert_eq!(reader.smtp_server, settings.smtp_server);
        assert_eq!(reader.from, settings.from);
    }

    #[test]
    fn test_build_message() {
        let settings = EmailSettings::new("localhost", "editor@example.com");
        let message = build_message(&settings, "New subscriber", "reader@example.com").unwrap();

        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: New subscriber"));
        assert!(raw.contains("To: editor@example.com"));
    }

    #[test]
    fn test_invalid_target_is_rejected() {
        let settings = EmailSettings::new("localhost", "not-an-address");
        let err = build_message(&settings, "Subject", "Body").unwrap_err();

        assert!(matches!(err, DeliveryError::InvalidAddress { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_a_transport_error() {
        let mut settings = EmailSettings::new("127.0.0.1", "editor@example.com");
        settings.port = 1;

        let err = SmtpNotifier::new().send(&settings, "Subject", "Body").await.unwrap_err();
        assert!(matches!(err, DeliveryError::Transport(_)));
    }
}
