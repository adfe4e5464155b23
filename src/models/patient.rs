use serde::{Deserialize, Serialize};
use validator::Validate;

use super::validation::FormErrors;

/// Numeric record columns, in record order.
pub const NUMERIC_COLUMNS: [&str; 8] = [
    "Height_cm",
    "Weight_kg",
    "Temperature_C",
    "Heart_Rate",
    "Cholesterol_mg_dL",
    "Blood_Sugar_mg_dL",
    "Systolic_BP",
    "Diastolic_BP",
];

/// Categorical record columns that get one-hot expanded, in record order.
pub const CATEGORICAL_COLUMNS: [&str; 5] = [
    "Symptoms",
    "Existing_Conditions",
    "Laboratory_Test_Results",
    "Smoking_Status",
    "Family_History_Heart_Disease",
];

/// Patient-form submission as posted by the browser.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PatientForm {
    #[validate(range(min = 30.0, max = 300.0, message = "Height must be between 30 and 300 cm"))]
    pub height: f64,
    #[validate(range(min = 1.0, max = 500.0, message = "Weight must be between 1 and 500 kg"))]
    pub weight: f64,
    #[validate(range(min = 25.0, max = 45.0, message = "Temperature must be between 25 and 45 °C"))]
    pub temperature: f64,
    #[validate(range(min = 20.0, max = 250.0, message = "Heart rate must be between 20 and 250 bpm"))]
    pub heart_rate: f64,
    #[serde(alias = "cholesterol")]
    #[validate(range(min = 0.0, max = 1000.0, message = "Cholesterol must be between 0 and 1000 mg/dL"))]
    pub cholestrol: f64,
    #[validate(range(min = 0.0, max = 1000.0, message = "Blood sugar must be between 0 and 1000 mg/dL"))]
    pub blood_sugar: f64,
    #[validate(range(min = 40.0, max = 300.0, message = "Systolic pressure must be between 40 and 300 mmHg"))]
    pub systolic: f64,
    #[validate(range(min = 20.0, max = 200.0, message = "Diastolic pressure must be between 20 and 200 mmHg"))]
    pub diastolic: f64,
    #[validate(length(min = 1, max = 100, message = "Symptom is required"))]
    pub symptom: String,
    #[validate(length(min = 1, max = 100, message = "Existing conditions are required"))]
    pub existing_conditions: String,
    #[validate(length(min = 1, max = 100, message = "Family history is required"))]
    pub family_history: String,
    #[validate(length(min = 1, max = 100, message = "Smoking status is required"))]
    pub smoking_status: String,
    #[validate(length(min = 1, max = 100, message = "Lab status is required"))]
    pub lab_status: String,
}

impl PatientForm {
    /// Validate the submission and assemble the single-row record the model sees.
    pub fn into_record(self) -> Result<PatientRecord, FormErrors> {
        let mut errors = match self.validate() {
            Ok(()) => FormErrors::new(),
            Err(e) => FormErrors::from(e),
        };

        let numeric = [
            ("height", self.height),
            ("weight", self.weight),
            ("temperature", self.temperature),
            ("heart_rate", self.heart_rate),
            ("cholestrol", self.cholestrol),
            ("blood_sugar", self.blood_sugar),
            ("systolic", self.systolic),
            ("diastolic", self.diastolic),
        ];
        for (field, value) in numeric {
            if !value.is_finite() {
                errors.add(field, "Enter a number.");
            }
        }

        let categorical = [
            ("symptom", &self.symptom),
            ("existing_conditions", &self.existing_conditions),
            ("family_history", &self.family_history),
            ("smoking_status", &self.smoking_status),
            ("lab_status", &self.lab_status),
        ];
        for (field, value) in categorical {
            if value.trim().is_empty() && !errors.has(field) {
                errors.add(field, "This field is required.");
            }
        }

        errors.into_result()?;

        Ok(PatientRecord {
            height_cm: self.height,
            weight_kg: self.weight,
            temperature_c: self.temperature,
            heart_rate: self.heart_rate,
            cholesterol_mg_dl: self.cholestrol,
            blood_sugar_mg_dl: self.blood_sugar,
            systolic_bp: self.systolic,
            diastolic_bp: self.diastolic,
            symptoms: self.symptom.trim().to_string(),
            existing_conditions: self.existing_conditions.trim().to_string(),
            laboratory_test_results: self.lab_status.trim().to_string(),
            smoking_status: self.smoking_status.trim().to_string(),
            family_history_heart_disease: self.family_history.trim().to_string(),
        })
    }
}

/// One patient row keyed by the column names the model was trained on.
/// This is also what the session keeps as the last submitted input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    #[serde(rename = "Height_cm")]
    pub height_cm: f64,
    #[serde(rename = "Weight_kg")]
    pub weight_kg: f64,
    #[serde(rename = "Temperature_C")]
    pub temperature_c: f64,
    #[serde(rename = "Heart_Rate")]
    pub heart_rate: f64,
    #[serde(rename = "Cholesterol_mg_dL")]
    pub cholesterol_mg_dl: f64,
    #[serde(rename = "Blood_Sugar_mg_dL")]
    pub blood_sugar_mg_dl: f64,
    #[serde(rename = "Systolic_BP")]
    pub systolic_bp: f64,
    #[serde(rename = "Diastolic_BP")]
    pub diastolic_bp: f64,
    #[serde(rename = "Symptoms")]
    pub symptoms: String,
    #[serde(rename = "Existing_Conditions")]
    pub existing_conditions: String,
    #[serde(rename = "Laboratory_Test_Results")]
    pub laboratory_test_results: String,
    #[serde(rename = "Smoking_Status")]
    pub smoking_status: String,
    #[serde(rename = "Family_History_Heart_Disease")]
    pub family_history_heart_disease: String,
}

impl PatientRecord {
    /// Numeric columns paired with their values, in [`NUMERIC_COLUMNS`] order.
    pub fn numeric_values(&self) -> [(&'static str, f64); 8] {
        [
            (NUMERIC_COLUMNS[0], self.height_cm),
            (NUMERIC_COLUMNS[1], self.weight_kg),
            (NUMERIC_COLUMNS[2], self.temperature_c),
            (NUMERIC_COLUMNS[3], self.heart_rate),
            (NUMERIC_COLUMNS[4], self.cholesterol_mg_dl),
            (NUMERIC_COLUMNS[5], self.blood_sugar_mg_dl),
            (NUMERIC_COLUMNS[6], self.systolic_bp),
            (NUMERIC_COLUMNS[7], self.diastolic_bp),
        ]
    }

    /// Categorical columns paired with their values, in [`CATEGORICAL_COLUMNS`] order.
    pub fn categorical_values(&self) -> [(&'static str, &str); 5] {
        [
            (CATEGORICAL_COLUMNS[0], self.symptoms.as_str()),
            (CATEGORICAL_COLUMNS[1], self.existing_conditions.as_str()),
            (CATEGORICAL_COLUMNS[2], self.laboratory_test_results.as_str()),
            (CATEGORICAL_COLUMNS[3], self.smoking_status.as_str()),
            (CATEGORICAL_COLUMNS[4], self.family_history_heart_disease.as_str()),
        ]
    }
}
