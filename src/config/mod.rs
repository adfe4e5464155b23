// Runtime configuration loaded from the environment

pub mod app;
pub mod database;
pub mod mail;

pub use app::AppConfig;
pub use database::{run_migrations, DatabaseConfig};
pub use mail::MailConfig;

use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

/// Read `key` from the environment, falling back to `default` when unset.
/// A value that is present but does not parse is a configuration error.
pub(crate) fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {}: {:?}", key, raw)),
        Err(_) => Ok(default),
    }
}

/// Read an optional, non-empty string from the environment.
pub(crate) fn env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}
