use axum::{
    extract::State,
    response::{IntoResponse, Json, Redirect, Response},
    routing::get,
    Form, Router,
};

use super::error::ApiError;
use super::views::FormView;
use crate::auth::{ResetStage, Session};
use crate::models::{ForgotPasswordForm, ResetPasswordForm, VerifyOtpForm};
use crate::services::password_reset_service::{EMAIL_NOT_FOUND_MESSAGE, INVALID_OTP_MESSAGE};
use crate::services::{OtpRequestOutcome, ResetOutcome};
use crate::state::AppState;

/// The three-step OTP password reset
pub fn password_reset_routes() -> Router<AppState> {
    Router::new()
        .route("/forgot-password", get(forgot_password_page).post(forgot_password))
        .route("/verify-otp", get(verify_otp_page).post(verify_otp))
        .route("/reset-password", get(reset_password_page).post(reset_password))
}

async fn forgot_password_page() -> Json<FormView> {
    Json(FormView::new("forgot_password"))
}

#[tracing::instrument(skip(state, session, form))]
async fn forgot_password(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ForgotPasswordForm>,
) -> Result<Response, ApiError> {
    let email = form.email.trim();
    match state.password_reset.request_otp(&session, email).await? {
        OtpRequestOutcome::Sent => Ok(Redirect::to("/verify-otp").into_response()),
        OtpRequestOutcome::EmailNotFound => {
            Ok(Json(FormView::with_error("forgot_password", EMAIL_NOT_FOUND_MESSAGE)).into_response())
        }
    }
}

async fn verify_otp_page() -> Json<FormView> {
    Json(FormView::new("verify_otp"))
}

#[tracing::instrument(skip(state, session, form))]
async fn verify_otp(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<VerifyOtpForm>,
) -> Response {
    if state.password_reset.verify_otp(&session, &form.otp) {
        Redirect::to("/reset-password").into_response()
    } else {
        tracing::info!("one-time code mismatch");
        Json(FormView::with_error("verify_otp", INVALID_OTP_MESSAGE)).into_response()
    }
}

async fn reset_password_page(session: Session) -> Response {
    if session.data().reset_stage() != ResetStage::AwaitingNewPassword {
        return Redirect::to("/forgot-password").into_response();
    }
    Json(FormView::new("reset_password")).into_response()
}

#[tracing::instrument(skip(state, session, form))]
async fn reset_password(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ResetPasswordForm>,
) -> Result<Response, ApiError> {
    let response = match state.password_reset.reset_password(&session, &form.password).await? {
        ResetOutcome::NotVerified => Redirect::to("/forgot-password").into_response(),
        ResetOutcome::Invalid(errors) => Json(FormView::with_errors("reset_password", errors)).into_response(),
        // The account is signed in at this point; the login page is still where the flow ends.
        ResetOutcome::UnknownAccount | ResetOutcome::Reset(_) => Redirect::to("/login").into_response(),
    };
    Ok(response)
}
