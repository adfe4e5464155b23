mod common;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;

use common::{assert_redirect, high_risk_patient, nominal_patient, TestApp, PASSWORD};
use health_predictor::services::risk_assessment::{HIGH_RISK_ADVICE, LOW_RISK_ADVICE};

async fn signed_in(app: &TestApp, username: &str) -> common::TestClient {
    let mut browser = app.client();
    browser
        .register(username, &format!("{}@example.org", username))
        .await;
    browser
}

#[tokio::test]
async fn test_patient_pages_require_login() {
    let app = TestApp::new();
    let mut browser = app.client();

    for path in ["/patient-form", "/prediction-result", "/view-patients"] {
        let response = browser.get(path).await;
        assert_redirect(&response, &format!("/login?next={}", path));
    }

    let response = browser.post_form("/patient-form", &nominal_patient()).await;
    assert_redirect(&response, "/login?next=/patient-form");
}

#[tokio::test]
async fn test_form_lists_the_categories_the_model_knows() {
    let app = TestApp::new();
    let mut browser = signed_in(&app, "nina").await;

    let response = browser.get("/patient-form").await;

    assert_eq!(response.status, StatusCode::OK);
    let categories = &response.body["known_categories"];
    assert_eq!(categories["Smoking_Status"], serde_json::json!(["Current", "Former", "Never"]));
    assert_eq!(categories["Family_History_Heart_Disease"], serde_json::json!(["No", "Yes"]));
}

#[tokio::test]
async fn test_nominal_non_smoker_is_low_risk() {
    let app = TestApp::new();
    let mut browser = signed_in(&app, "oscar").await;

    let response = browser.post_form("/patient-form", &nominal_patient()).await;
    assert_redirect(&response, "/prediction-result");

    let result = browser.get("/prediction-result").await;
    assert_eq!(result.status, StatusCode::OK);
    assert_eq!(result.body["prediction"], "No");
    assert_eq!(result.body["risk_level"], "Low");
    assert_eq!(result.body["advice"], LOW_RISK_ADVICE);
    assert_eq!(result.body["input_data"]["Smoking_Status"], "Never");
    assert_eq!(result.body["input_data"]["Systolic_BP"], 120.0);

    let dashboard = browser.get("/dashboard").await;
    assert_eq!(dashboard.body["last_prediction"], "No");
}

#[tokio::test]
async fn test_high_risk_profile_is_referred() {
    let app = TestApp::new();
    let mut browser = signed_in(&app, "peggy").await;

    browser.post_form("/patient-form", &high_risk_patient()).await;
    let result = browser.get("/prediction-result").await;

    assert_eq!(result.body["prediction"], "Yes");
    assert_eq!(result.body["risk_level"], "High");
    assert_eq!(result.body["advice"], HIGH_RISK_ADVICE);
}

#[tokio::test]
async fn test_unseen_category_still_predicts() {
    let app = TestApp::new();
    let mut browser = signed_in(&app, "quinn").await;

    let mut patient = nominal_patient();
    for field in patient.iter_mut() {
        if field.0 == "symptom" {
            field.1 = "Headache";
        }
    }

    let response = browser.post_form("/patient-form", &patient).await;
    assert_redirect(&response, "/prediction-result");

    let history = browser.get("/view-patients").await;
    assert_eq!(history.body["prediction"], "No");
    assert_eq!(history.body["last_input"]["Symptoms"], "Headache");
}

#[tokio::test]
async fn test_missing_field_is_a_client_error() {
    let app = TestApp::new();
    let mut browser = signed_in(&app, "rita").await;

    let patient: Vec<_> = nominal_patient()
        .into_iter()
        .filter(|(field, _)| *field != "heart_rate")
        .collect();
    let response = browser.post_form("/patient-form", &patient).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "Invalid form input");

    let history = browser.get("/view-patients").await;
    assert!(history.body["prediction"].is_null());
    assert!(history.body["last_input"].is_null());
}

#[tokio::test]
async fn test_out_of_range_value_names_the_field() {
    let app = TestApp::new();
    let mut browser = signed_in(&app, "sam").await;

    let mut patient = nominal_patient();
    for field in patient.iter_mut() {
        if field.0 == "height" {
            field.1 = "9000";
        }
    }
    let response = browser.post_form("/patient-form", &patient).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "Invalid form input");
    assert!(response.body["fields"]["height"].is_array());
}

#[tokio::test]
async fn test_result_without_prediction_uses_placeholder() {
    let app = TestApp::new();
    let mut browser = signed_in(&app, "tina").await;

    let result = browser.get("/prediction-result").await;

    assert_eq!(result.body["prediction"], "No prediction available");
    assert_eq!(result.body["risk_level"], "Low");
    assert!(result.body["input_data"].is_null());
}

#[tokio::test]
async fn test_logout_clears_the_history() {
    let app = TestApp::new();
    let mut browser = signed_in(&app, "uma").await;
    browser.post_form("/patient-form", &nominal_patient()).await;

    let history = browser.get("/view-patients").await;
    assert_eq!(history.body["prediction"], "No");

    browser.get("/logout").await;
    assert_redirect(&browser.login("uma", PASSWORD).await, "/dashboard");

    let history = browser.get("/view-patients").await;
    assert_eq!(history.status, StatusCode::OK);
    assert!(history.body["prediction"].is_null());
    assert!(history.body["last_input"].is_null());
}
