use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use health_predictor::api::create_routes;
use health_predictor::config::{run_migrations, AppConfig, DatabaseConfig, MailConfig};
use health_predictor::inference::InferencePipeline;
use health_predictor::services::{
    InMemoryUserRepository, LogMailer, Mailer, PgUserRepository, SmtpMailer, UserRepository,
};
use health_predictor::AppState;

const SESSION_SWEEP_PERIOD: Duration = Duration::from_secs(15 * 60);

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let model = InferencePipeline::load(&config.model_dir)
        .with_context(|| format!("failed to load model artifacts from {}", config.model_dir.display()))?;
    info!(
        classes = ?model.classes(),
        columns = model.schema().len(),
        n_neighbors = model.n_neighbors(),
        "model artifacts loaded"
    );

    let database = DatabaseConfig::from_env()?;
    let users: Arc<dyn UserRepository> = match &database.database_url {
        Some(url) => {
            let pool = database
                .create_pool(url)
                .await
                .context("failed to connect to database")?;
            run_migrations(&pool).await.context("failed to run database migrations")?;
            info!("database ready");
            Arc::new(PgUserRepository::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set, accounts are kept in memory and lost on restart");
            Arc::new(InMemoryUserRepository::new())
        }
    };

    let mail = MailConfig::from_env()?;
    let mailer: Arc<dyn Mailer> = match &mail.smtp_host {
        Some(host) => {
            info!(host = %host, port = mail.smtp_port, "relaying mail over SMTP");
            Arc::new(SmtpMailer::new(host, &mail))
        }
        None => {
            warn!("SMTP_HOST not set, outbound mail is only logged");
            Arc::new(LogMailer)
        }
    };

    let address = config.server_address();
    let state = AppState::new(config, users, mailer, &mail.from_email, model);
    state.sessions.spawn_sweeper(SESSION_SWEEP_PERIOD);

    let app = create_routes(state);

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {}", address))?;
    info!("Health predictor listening on http://{}", address);
    info!("Health check available at http://{}/health", address);

    axum::serve(listener, app).await?;

    Ok(())
}
