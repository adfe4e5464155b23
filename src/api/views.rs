//! JSON view models returned in place of rendered pages.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::{FormErrors, PatientRecord, UserProfile, UserResponse};
use crate::services::RiskTier;

#[derive(Debug, Serialize)]
pub struct HomeView {
    pub page: &'static str,
    pub authenticated: bool,
}

/// A form page, optionally redisplayed with errors.
#[derive(Debug, Serialize)]
pub struct FormView {
    pub page: &'static str,
    #[serde(skip_serializing_if = "FormErrors::is_empty")]
    pub errors: FormErrors,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

impl FormView {
    pub fn new(page: &'static str) -> Self {
        Self {
            page,
            errors: FormErrors::new(),
            error: None,
            next: None,
        }
    }

    pub fn with_errors(page: &'static str, errors: FormErrors) -> Self {
        Self {
            errors,
            ..Self::new(page)
        }
    }

    pub fn with_error(page: &'static str, error: &'static str) -> Self {
        Self {
            error: Some(error),
            ..Self::new(page)
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DashboardView {
    pub page: &'static str,
    pub user: UserResponse,
    pub profile: Option<UserProfile>,
    pub last_prediction: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PatientFormView {
    pub page: &'static str,
    /// Categories the model was trained on, per categorical field. Anything
    /// else is accepted but contributes no indicator.
    pub known_categories: BTreeMap<&'static str, Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct PredictionResultView {
    pub page: &'static str,
    pub prediction: String,
    pub input_data: Option<PatientRecord>,
    pub risk_level: RiskTier,
    pub advice: &'static str,
}

#[derive(Debug, Serialize)]
pub struct PatientHistoryView {
    pub page: &'static str,
    pub last_input: Option<PatientRecord>,
    pub prediction: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LogoutView {
    pub page: &'static str,
    pub message: &'static str,
}
