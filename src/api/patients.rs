use axum::{
    extract::{rejection::FormRejection, State},
    response::{IntoResponse, Json, Redirect, Response},
    routing::get,
    Form, Router,
};
use std::collections::BTreeMap;

use super::error::ApiError;
use super::views::{PatientFormView, PatientHistoryView, PredictionResultView};
use crate::auth::AuthenticatedUser;
use crate::inference::{ColumnKind, FeatureSchema};
use crate::models::{PatientForm, CATEGORICAL_COLUMNS};
use crate::services::{assess, risk_assessment::NO_PREDICTION_LABEL};
use crate::state::AppState;

/// Patient intake, prediction and the session history view
pub fn patient_routes() -> Router<AppState> {
    Router::new()
        .route("/patient-form", get(patient_form_page).post(submit_patient_form))
        .route("/prediction-result", get(prediction_result))
        .route("/view-patients", get(view_patients))
}

async fn patient_form_page(State(state): State<AppState>, _user: AuthenticatedUser) -> Json<PatientFormView> {
    let mut known_categories: BTreeMap<&'static str, Vec<String>> = CATEGORICAL_COLUMNS
        .iter()
        .map(|column| (*column, Vec::new()))
        .collect();

    for column in state.model.schema().columns() {
        if let ColumnKind::Indicator { field, category } = FeatureSchema::column_kind(column) {
            known_categories.entry(field).or_default().push(category);
        }
    }

    Json(PatientFormView {
        page: "patient_form",
        known_categories,
    })
}

/// Run the model on the submitted record and keep the outcome in the session
#[tracing::instrument(skip_all, fields(user_id = %user.user.id))]
async fn submit_patient_form(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    form: Result<Form<PatientForm>, FormRejection>,
) -> Result<Response, ApiError> {
    let Form(form) = form.map_err(|rejection| {
        tracing::info!(error = %rejection, "patient form rejected");
        ApiError::InvalidForm(None)
    })?;

    let record = form.into_record().map_err(|errors| ApiError::InvalidForm(Some(errors)))?;
    let prediction = state.model.predict(&record)?;

    tracing::info!(label = %prediction.label, "patient assessed");

    user.session.update(|data| {
        data.last_input = Some(record);
        data.prediction = Some(prediction.label);
    });

    Ok(Redirect::to("/prediction-result").into_response())
}

async fn prediction_result(AuthenticatedUser { session, .. }: AuthenticatedUser) -> Json<PredictionResultView> {
    let data = session.data();
    let prediction = data.prediction.unwrap_or_else(|| NO_PREDICTION_LABEL.to_string());
    let assessment = assess(&prediction);

    Json(PredictionResultView {
        page: "prediction_result",
        prediction,
        input_data: data.last_input,
        risk_level: assessment.risk_level,
        advice: assessment.advice,
    })
}

async fn view_patients(AuthenticatedUser { session, .. }: AuthenticatedUser) -> Json<PatientHistoryView> {
    let data = session.data();

    Json(PatientHistoryView {
        page: "view_patients",
        last_input: data.last_input,
        prediction: data.prediction,
    })
}
