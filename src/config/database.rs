use anyhow::Result;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

use super::{env_optional, env_parse};

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// `None` runs the service against the in-memory user repository.
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub connect_timeout: Duration,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self> {
        let database_url = env_optional("DATABASE_URL");
        let max_connections = env_parse("DB_MAX_CONNECTIONS", 10u32)?;
        let connect_timeout_secs = env_parse("DB_CONNECT_TIMEOUT", 30u64)?;

        Ok(DatabaseConfig {
            database_url,
            max_connections,
            connect_timeout: Duration::from_secs(connect_timeout_secs),
        })
    }

    pub async fn create_pool(&self, url: &str) -> Result<PgPool> {
        let pool = PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(self.connect_timeout)
            .connect(url)
            .await?;

        Ok(pool)
    }
}

pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
