use axum::{extract::State, response::Json};
use serde_json::{json, Value};

use crate::state::AppState;

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "health-predictor",
        "version": env!("CARGO_PKG_VERSION"),
        "environment": state.config.environment,
        "model_classes": state.model.classes(),
        "active_sessions": state.sessions.len(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}
