use std::sync::Arc;

use crate::auth::SessionStore;
use crate::config::AppConfig;
use crate::inference::InferencePipeline;
use crate::services::{AuthService, Mailer, PasswordResetService, UserRepository};

/// Everything a request handler needs, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserRepository>,
    pub sessions: SessionStore,
    pub auth: AuthService,
    pub password_reset: PasswordResetService,
    pub model: Arc<InferencePipeline>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        users: Arc<dyn UserRepository>,
        mailer: Arc<dyn Mailer>,
        from_email: &str,
        model: InferencePipeline,
    ) -> Self {
        let sessions = SessionStore::new(config.session_ttl, config.session_cookie_secure);

        Self {
            auth: AuthService::new(users.clone()),
            password_reset: PasswordResetService::new(users.clone(), mailer, from_email),
            config: Arc::new(config),
            users,
            sessions,
            model: Arc::new(model),
        }
    }
}
