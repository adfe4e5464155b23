use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::auth::AuthError;
use crate::inference::InferenceError;
use crate::models::FormErrors;

pub const INVALID_FORM_MESSAGE: &str = "Invalid form input";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid form input")]
    InvalidForm(Option<FormErrors>),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("Prediction failed: {0}")]
    Inference(#[from] InferenceError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::InvalidForm(fields) => {
                let body = match fields {
                    Some(fields) => json!({ "error": INVALID_FORM_MESSAGE, "fields": fields }),
                    None => json!({ "error": INVALID_FORM_MESSAGE }),
                };
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            ApiError::Auth(e) => e.into_response(),
            ApiError::Inference(e) => {
                tracing::error!(error = %e, "inference failed");
                let body = Json(json!({
                    "error": "Prediction failed",
                    "message": e.to_string(),
                }));
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}
