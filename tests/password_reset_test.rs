mod common;

use assert_matches::assert_matches;
use axum::http::StatusCode;
use pretty_assertions::assert_eq;

use common::{assert_redirect, TestApp, PASSWORD};
use health_predictor::auth::ResetStage;
use health_predictor::services::mailer::PASSWORD_RESET_SUBJECT;

const NEW_PASSWORD: &str = "Brand-new-s3cret";

fn otp_from_body(body: &str) -> String {
    body.chars().filter(char::is_ascii_digit).collect()
}

#[tokio::test]
async fn test_unknown_email_stays_on_first_step() {
    let app = TestApp::new();
    let mut browser = app.client();

    let response = browser
        .post_form("/forgot-password", &[("email", "nobody@example.org")])
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["page"], "forgot_password");
    assert_eq!(response.body["error"], "Email not found!");
    assert!(app.outbox.sent().is_empty());
    assert_eq!(app.session_data(&browser).reset_stage(), ResetStage::AwaitingEmail);
    assert!(app.sessions.is_empty());

    let reset = browser.get("/reset-password").await;
    assert_redirect(&reset, "/forgot-password");
}

#[tokio::test]
async fn test_emailed_code_matches_the_session_code() {
    let app = TestApp::new();
    app.client().register("ivan", "ivan@example.org").await;

    let mut browser = app.client();
    let response = browser
        .post_form("/forgot-password", &[("email", "ivan@example.org")])
        .await;
    assert_redirect(&response, "/verify-otp");

    let email = app.outbox.last_sent_to("ivan@example.org").unwrap();
    assert_eq!(email.subject, PASSWORD_RESET_SUBJECT);
    assert_eq!(email.from, "noreply@example.org");

    let session = app.session_data(&browser);
    let otp = otp_from_body(&email.body);
    assert_eq!(otp.len(), 6);
    assert_eq!(session.otp.as_deref(), Some(otp.as_str()));
    assert_eq!(session.email.as_deref(), Some("ivan@example.org"));
    assert_eq!(session.reset_stage(), ResetStage::AwaitingOtp);
}

#[tokio::test]
async fn test_full_reset_flow_changes_the_password() {
    let app = TestApp::new();
    app.client().register("judy", "judy@example.org").await;

    let mut browser = app.client();
    browser
        .post_form("/forgot-password", &[("email", "judy@example.org")])
        .await;
    let otp = otp_from_body(&app.outbox.last_sent_to("judy@example.org").unwrap().body);

    let padded = format!(" {}", otp);
    let wrong = browser.post_form("/verify-otp", &[("otp", padded.as_str())]).await;
    assert_eq!(wrong.status, StatusCode::OK);
    assert_eq!(wrong.body["error"], "Invalid OTP!");
    assert_eq!(app.session_data(&browser).otp.as_deref(), Some(otp.as_str()));

    let verified = browser.post_form("/verify-otp", &[("otp", otp.as_str())]).await;
    assert_redirect(&verified, "/reset-password");

    let form = browser.get("/reset-password").await;
    assert_eq!(form.body["page"], "reset_password");

    let weak = browser.post_form("/reset-password", &[("password", "12345678")]).await;
    assert_eq!(weak.status, StatusCode::OK);
    assert!(weak.body["errors"]["password"].is_array());

    let before = browser.session_id().unwrap();
    let done = browser.post_form("/reset-password", &[("password", NEW_PASSWORD)]).await;
    assert_redirect(&done, "/login");

    // Signing in through the reset rotates the session id.
    assert!(done.set_cookie.is_some());
    let after = browser.session_id().unwrap();
    assert_ne!(before, after);
    assert!(!app.sessions.exists(&before));

    // The reset signs the account in.
    let dashboard = browser.get("/dashboard").await;
    assert_eq!(dashboard.status, StatusCode::OK);
    assert_eq!(dashboard.body["user"]["username"], "judy");

    let mut other = app.client();
    assert_eq!(other.login("judy", PASSWORD).await.status, StatusCode::OK);
    assert_redirect(&other.login("judy", NEW_PASSWORD).await, "/dashboard");
}

#[tokio::test]
async fn test_wrong_code_after_right_one_blocks_the_reset() {
    let app = TestApp::new();
    app.client().register("kim", "kim@example.org").await;

    let mut browser = app.client();
    browser
        .post_form("/forgot-password", &[("email", "kim@example.org")])
        .await;
    let otp = otp_from_body(&app.outbox.last_sent_to("kim@example.org").unwrap().body);

    let verified = browser.post_form("/verify-otp", &[("otp", otp.as_str())]).await;
    assert_redirect(&verified, "/reset-password");

    let wrong = browser.post_form("/verify-otp", &[("otp", "xxxxxx")]).await;
    assert_eq!(wrong.status, StatusCode::OK);
    assert_eq!(wrong.body["error"], "Invalid OTP!");
    assert_eq!(app.session_data(&browser).reset_stage(), ResetStage::AwaitingOtp);

    let response = browser.post_form("/reset-password", &[("password", NEW_PASSWORD)]).await;
    assert_redirect(&response, "/forgot-password");

    let mut other = app.client();
    assert_redirect(&other.login("kim", PASSWORD).await, "/dashboard");
}

#[tokio::test]
async fn test_reset_without_verification_is_refused() {
    let app = TestApp::new();
    app.client().register("ken", "ken@example.org").await;

    let mut browser = app.client();
    browser
        .post_form("/forgot-password", &[("email", "ken@example.org")])
        .await;

    let response = browser.post_form("/reset-password", &[("password", NEW_PASSWORD)]).await;

    assert_redirect(&response, "/forgot-password");
    assert_matches!(app.session_data(&browser).user_id, None);
}

#[tokio::test]
async fn test_new_code_request_replaces_the_old_one() {
    let app = TestApp::new();
    app.client().register("lena", "lena@example.org").await;

    let mut browser = app.client();
    browser
        .post_form("/forgot-password", &[("email", "lena@example.org")])
        .await;
    let first = otp_from_body(&app.outbox.last_sent_to("lena@example.org").unwrap().body);
    browser.post_form("/verify-otp", &[("otp", first.as_str())]).await;
    assert_eq!(app.session_data(&browser).reset_stage(), ResetStage::AwaitingNewPassword);

    browser
        .post_form("/forgot-password", &[("email", "lena@example.org")])
        .await;
    let second = otp_from_body(&app.outbox.last_sent_to("lena@example.org").unwrap().body);

    let data = app.session_data(&browser);
    assert_eq!(data.otp.as_deref(), Some(second.as_str()));
    assert_eq!(data.reset_stage(), ResetStage::AwaitingOtp);
    assert_eq!(app.outbox.sent().len(), 2);
}

#[tokio::test]
async fn test_logout_keeps_an_in_flight_reset() {
    let app = TestApp::new();
    let mut browser = app.client();
    browser.register("mia", "mia@example.org").await;
    browser
        .post_form("/forgot-password", &[("email", "mia@example.org")])
        .await;

    browser.get("/logout").await;

    let data = app.session_data(&browser);
    assert!(data.user_id.is_none());
    assert!(data.otp.is_some());
    assert_eq!(data.email.as_deref(), Some("mia@example.org"));
}
