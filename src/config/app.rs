use anyhow::Result;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use super::env_parse;

/// Two weeks, matching the usual browser session cookie age.
const DEFAULT_SESSION_TTL_SECS: u64 = 14 * 24 * 60 * 60;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub log_level: String,
    pub model_dir: PathBuf,
    pub session_ttl: Duration,
    pub session_cookie_secure: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env_parse("PORT", 3000u16)?;
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let model_dir = env::var("MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./artifacts"));
        let session_ttl = Duration::from_secs(env_parse("SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS)?);
        let session_cookie_secure = env_parse("SESSION_COOKIE_SECURE", false)?;

        Ok(AppConfig {
            host,
            port,
            environment,
            log_level,
            model_dir,
            session_ttl,
            session_cookie_secure,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            environment: "development".to_string(),
            log_level: "info".to_string(),
            model_dir: PathBuf::from("./artifacts"),
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
            session_cookie_secure: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_address() {
        let config = AppConfig {
            host: "localhost".to_string(),
            port: 8080,
            ..AppConfig::default()
        };

        assert_eq!(config.server_address(), "localhost:8080");
        assert_eq!(config.environment, "development");
    }
}
