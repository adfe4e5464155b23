// Shared harness: the full router over the in-memory repository, the outbox
// mailer and the model artifacts shipped in `artifacts/`.
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

use health_predictor::api::create_routes;
use health_predictor::auth::{SessionData, SessionStore, SESSION_COOKIE};
use health_predictor::config::AppConfig;
use health_predictor::inference::InferencePipeline;
use health_predictor::services::{InMemoryUserRepository, OutboxMailer};
use health_predictor::AppState;

pub const PASSWORD: &str = "Corr3ct-Horse";

pub fn artifacts_dir() -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("artifacts")
}

pub struct TestApp {
    pub router: Router,
    pub outbox: OutboxMailer,
    pub sessions: SessionStore,
}

impl TestApp {
    pub fn new() -> Self {
        let model = InferencePipeline::load(artifacts_dir()).expect("shipped artifacts load");
        let outbox = OutboxMailer::new();
        let state = AppState::new(
            AppConfig::default(),
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(outbox.clone()),
            "noreply@example.org",
            model,
        );
        let sessions = state.sessions.clone();

        Self {
            router: create_routes(state),
            outbox,
            sessions,
        }
    }

    /// A browser: one cookie jar holding the session cookie.
    pub fn client(&self) -> TestClient {
        TestClient {
            router: self.router.clone(),
            session: None,
        }
    }

    pub fn session_data(&self, client: &TestClient) -> SessionData {
        client
            .session_id()
            .map(|id| self.sessions.load(&id))
            .unwrap_or_default()
    }
}

pub struct TestClient {
    router: Router,
    session: Option<String>,
}

#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub set_cookie: Option<String>,
    pub body: Value,
}

impl TestClient {
    /// Present `value` as the session cookie on the following requests.
    pub fn set_session_cookie(&mut self, value: &str) {
        self.session = Some(value.to_string());
    }

    pub fn session_id(&self) -> Option<Uuid> {
        self.session.as_deref().and_then(|id| Uuid::parse_str(id).ok())
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        self.send(Method::POST, uri, Some(encode_form(fields))).await
    }

    async fn send(&mut self, method: Method, uri: &str, form: Option<String>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(id) = &self.session {
            builder = builder.header(header::COOKIE, format!("{}={}", SESSION_COOKIE, id));
        }
        let request = match form {
            Some(form) => builder
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|value| value.to_str().unwrap().to_string());
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .map(|value| value.to_str().unwrap().to_string());

        if let Some(cookie) = &set_cookie {
            let pair = cookie.split(';').next().unwrap();
            let (name, value) = pair.split_once('=').unwrap();
            assert_eq!(name, SESSION_COOKIE);
            self.session = Some(value.to_string());
        }

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        TestResponse {
            status,
            location,
            set_cookie,
            body,
        }
    }

    pub async fn register(&mut self, username: &str, email: &str) -> TestResponse {
        self.post_form(
            "/register",
            &[
                ("username", username),
                ("email", email),
                ("password1", PASSWORD),
                ("password2", PASSWORD),
                ("phone_number", "+44 20 7946 0000"),
                ("dob", "1980-04-12"),
                ("hospital_name", "St Mary's"),
            ],
        )
        .await
    }

    pub async fn login(&mut self, username: &str, password: &str) -> TestResponse {
        self.post_form("/login", &[("username", username), ("password", password)])
            .await
    }
}

pub fn encode_form(fields: &[(&str, &str)]) -> String {
    serde_urlencoded::to_string(fields).unwrap()
}

pub fn assert_redirect(response: &TestResponse, to: &str) {
    assert_eq!(response.status, StatusCode::SEE_OTHER, "body: {}", response.body);
    assert_eq!(response.location.as_deref(), Some(to));
}

/// Mid-range vitals for an adult with no risk factors.
pub fn nominal_patient() -> Vec<(&'static str, &'static str)> {
    vec![
        ("height", "170"),
        ("weight", "70"),
        ("temperature", "36.8"),
        ("heart_rate", "72"),
        ("cholestrol", "180"),
        ("blood_sugar", "90"),
        ("systolic", "120"),
        ("diastolic", "80"),
        ("symptom", "None"),
        ("existing_conditions", "None"),
        ("lab_status", "Normal"),
        ("smoking_status", "Never"),
        ("family_history", "No"),
    ]
}

pub fn high_risk_patient() -> Vec<(&'static str, &'static str)> {
    vec![
        ("height", "172"),
        ("weight", "98"),
        ("temperature", "37.2"),
        ("heart_rate", "102"),
        ("cholestrol", "285"),
        ("blood_sugar", "165"),
        ("systolic", "165"),
        ("diastolic", "100"),
        ("symptom", "Chest Pain"),
        ("existing_conditions", "Hypertension"),
        ("lab_status", "Abnormal"),
        ("smoking_status", "Current"),
        ("family_history", "Yes"),
    ]
}
