use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use super::auth::auth_routes;
use super::health::health_check;
use super::password_reset::password_reset_routes;
use super::patients::patient_routes;
use crate::auth::session_middleware;
use crate::state::AppState;

pub fn create_routes(state: AppState) -> Router {
    let pages = Router::new()
        .merge(auth_routes())
        .merge(password_reset_routes())
        .merge(patient_routes())
        .layer(middleware::from_fn_with_state(
            state.sessions.clone(),
            session_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .merge(pages)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
