use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::auth::password::PasswordError;
use crate::services::mailer::MailError;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("A user with that username already exists.")]
    UsernameTaken,
    #[error("A user with that email already exists.")]
    EmailTaken,
    #[error("Session missing from request")]
    MissingSession,
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Password hashing error: {0}")]
    PasswordHashing(#[from] PasswordError),
    #[error("Mail delivery failed: {0}")]
    Mail(#[from] MailError),
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AuthError::UsernameTaken => (StatusCode::CONFLICT, "Username already exists"),
            AuthError::EmailTaken => (StatusCode::CONFLICT, "Email already exists"),
            AuthError::MissingSession => (StatusCode::INTERNAL_SERVER_ERROR, "Session unavailable"),
            AuthError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Database error"),
            AuthError::PasswordHashing(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Password processing error"),
            AuthError::Mail(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Mail delivery error"),
            AuthError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = Json(json!({
            "error": error_message,
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}
