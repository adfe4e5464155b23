use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json, Redirect, Response},
    routing::get,
    Form, Router,
};
use serde::Deserialize;

use super::error::ApiError;
use super::views::{DashboardView, FormView, HomeView, LogoutView};
use crate::auth::{AuthenticatedUser, Session};
use crate::models::{FormErrors, LoginForm, RegisterForm, UserResponse};
use crate::services::auth_service::INVALID_LOGIN_MESSAGE;
use crate::state::AppState;

pub const LOGGED_OUT_MESSAGE: &str = "You have been logged out.";

/// Account routes: registration, login, logout and the landing pages
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/register", get(register_page).post(register))
        .route("/login", get(login_page).post(login))
        .route("/logout", get(logout).post(logout))
        .route("/dashboard", get(dashboard))
}

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

async fn home(session: Session) -> Json<HomeView> {
    Json(HomeView {
        page: "home",
        authenticated: session.data().is_authenticated(),
    })
}

async fn register_page() -> Json<FormView> {
    Json(FormView::new("register"))
}

/// Create the account, sign it in and land on the dashboard
#[tracing::instrument(skip(state, session, form), fields(username = %form.username))]
async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Response, ApiError> {
    match state.auth.register(&form).await? {
        Ok(user) => {
            session.login(user.id);
            Ok(Redirect::to("/dashboard").into_response())
        }
        Err(errors) => Ok(Json(FormView::with_errors("register", errors)).into_response()),
    }
}

async fn login_page(Query(query): Query<NextQuery>) -> Json<FormView> {
    Json(FormView {
        next: query.next,
        ..FormView::new("login")
    })
}

/// Authenticate and establish the session
#[tracing::instrument(skip(state, session, query, form), fields(username = %form.username))]
async fn login(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<NextQuery>,
    Form(form): Form<LoginForm>,
) -> Result<Response, ApiError> {
    let redisplay = |errors: FormErrors| FormView {
        errors,
        next: query.next.clone(),
        ..FormView::new("login")
    };

    if let Err(errors) = form.clean() {
        return Ok(Json(redisplay(errors)).into_response());
    }

    match state.auth.authenticate(&form.username, &form.password).await? {
        Some(user) => {
            session.login(user.id);
            tracing::info!(user_id = %user.id, "user logged in");
            Ok(Redirect::to("/dashboard").into_response())
        }
        None => {
            let mut errors = FormErrors::new();
            errors.add_non_field(INVALID_LOGIN_MESSAGE);
            Ok(Json(redisplay(errors)).into_response())
        }
    }
}

#[tracing::instrument(skip(session))]
async fn logout(session: Session) -> Json<LogoutView> {
    session.logout();
    Json(LogoutView {
        page: "logout",
        message: LOGGED_OUT_MESSAGE,
    })
}

async fn dashboard(
    State(state): State<AppState>,
    AuthenticatedUser { user, session }: AuthenticatedUser,
) -> Result<Json<DashboardView>, ApiError> {
    let profile = state.users.find_profile(user.id).await?;

    Ok(Json(DashboardView {
        page: "dashboard",
        user: UserResponse::from(&user),
        profile,
        last_prediction: session.data().prediction,
    }))
}
