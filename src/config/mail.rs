use anyhow::Result;
use std::env;

use super::{env_optional, env_parse};

/// Sender used when a message is sent without an explicit from address.
pub const DEFAULT_FROM_EMAIL: &str = "webmaster@localhost";

#[derive(Debug, Clone)]
pub struct MailConfig {
    /// `None` keeps outbound mail in the local outbox instead of relaying it.
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub from_email: String,
}

impl MailConfig {
    pub fn from_env() -> Result<Self> {
        Ok(MailConfig {
            smtp_host: env_optional("SMTP_HOST"),
            smtp_port: env_parse("SMTP_PORT", 25u16)?,
            smtp_username: env_optional("SMTP_USERNAME"),
            smtp_password: env_optional("SMTP_PASSWORD"),
            from_email: env::var("MAIL_FROM").unwrap_or_else(|_| DEFAULT_FROM_EMAIL.to_string()),
        })
    }
}
