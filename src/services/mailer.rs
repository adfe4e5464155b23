use futures::future::BoxFuture;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

use crate::config::MailConfig;

pub const PASSWORD_RESET_SUBJECT: &str = "Password Reset OTP";

#[derive(Error, Debug)]
pub enum MailError {
    #[error("Invalid address {address:?}: {source}")]
    InvalidAddress {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },
    #[error("Failed to build message: {0}")]
    Build(#[from] lettre::error::Error),
    #[error("SMTP delivery failed: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl OutboundEmail {
    pub fn password_reset(from: &str, to: &str, otp: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            subject: PASSWORD_RESET_SUBJECT.to_string(),
            body: format!("Your OTP for password reset is {}.", otp),
        }
    }
}

/// Outbound mail delivery.
pub trait Mailer: Send + Sync {
    fn send<'a>(&'a self, email: &'a OutboundEmail) -> BoxFuture<'a, Result<(), MailError>>;
}

fn mailbox(address: &str) -> Result<Mailbox, MailError> {
    address.parse().map_err(|source| MailError::InvalidAddress {
        address: address.to_string(),
        source,
    })
}

/// Relays mail through the configured SMTP server.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(host: &str, config: &MailConfig) -> Self {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host).port(config.smtp_port);

        if let (Some(username), Some(password)) = (&config.smtp_username, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Self {
            transport: builder.build(),
        }
    }
}

impl Mailer for SmtpMailer {
    fn send<'a>(&'a self, email: &'a OutboundEmail) -> BoxFuture<'a, Result<(), MailError>> {
        Box::pin(async move {
            let message = Message::builder()
                .from(mailbox(&email.from)?)
                .to(mailbox(&email.to)?)
                .subject(email.subject.clone())
                .header(ContentType::TEXT_PLAIN)
                .body(email.body.clone())?;

            self.transport.send(message).await?;

            tracing::info!(to = %email.to, subject = %email.subject, "email delivered");
            Ok(())
        })
    }
}

/// Writes each message to the log and keeps nothing. Used when no SMTP relay
/// is configured, so the reset flow still works in development.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send<'a>(&'a self, email: &'a OutboundEmail) -> BoxFuture<'a, Result<(), MailError>> {
        Box::pin(async move {
            mailbox(&email.from)?;
            mailbox(&email.to)?;
            tracing::info!(
                to = %email.to,
                subject = %email.subject,
                body = %email.body,
                "no SMTP relay configured; message logged only"
            );
            Ok(())
        })
    }
}

/// Records every message in memory so callers can inspect what was sent.
#[derive(Debug, Clone, Default)]
pub struct OutboxMailer {
    sent: Arc<Mutex<Vec<OutboundEmail>>>,
}

impl OutboxMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn last_sent_to(&self, address: &str) -> Option<OutboundEmail> {
        self.sent()
            .into_iter()
            .rev()
            .find(|email| email.to == address)
    }
}

impl Mailer for OutboxMailer {
    fn send<'a>(&'a self, email: &'a OutboundEmail) -> BoxFuture<'a, Result<(), MailError>> {
        Box::pin(async move {
            mailbox(&email.to)?;
            tracing::info!(
                to = %email.to,
                subject = %email.subject,
                body = %email.body,
                "message kept in outbox"
            );
            self.sent
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(email.clone());
            Ok(())
        })
    }
}
