use ndarray::Axis;
use serde::Serialize;
use std::path::Path;

use super::{
    FeatureSchema, InferenceError, KnnClassifier, LabelEncoder, ModelArtifacts, StandardScaler,
};
use crate::models::PatientRecord;

/// Decoded model output for one submitted record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub label: String,
    pub class_codes: Vec<usize>,
}

/// Encoder, column schema, scaler and classifier, checked against each other
/// once at startup and read-only afterwards.
#[derive(Debug, Clone)]
pub struct InferencePipeline {
    encoder: LabelEncoder,
    schema: FeatureSchema,
    scaler: StandardScaler,
    model: KnnClassifier,
}

impl InferencePipeline {
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, InferenceError> {
        Self::from_artifacts(ModelArtifacts::load(dir)?)
    }

    pub fn from_artifacts(artifacts: ModelArtifacts) -> Result<Self, InferenceError> {
        let encoder = LabelEncoder::new(artifacts.classes)?;
        let schema = FeatureSchema::new(artifacts.train_columns)?;
        let scaler = StandardScaler::from_params(artifacts.scaler)?;
        let model = KnnClassifier::from_params(artifacts.knn)?;

        if let Some(n) = scaler.n_features() {
            if n != schema.len() {
                return Err(InferenceError::schema(format!(
                    "scaler was fitted on {} features but the column list has {}",
                    n,
                    schema.len()
                )));
            }
        }

        if model.n_features() != schema.len() {
            return Err(InferenceError::schema(format!(
                "classifier was fitted on {} features but the column list has {}",
                model.n_features(),
                schema.len()
            )));
        }

        if let Some(code) = model.classes().find(|&code| code >= encoder.n_classes()) {
            return Err(InferenceError::schema(format!(
                "classifier emits class {} but the label encoder knows {} classes",
                code,
                encoder.n_classes()
            )));
        }

        let unused = schema.unused_numeric_columns();
        if !unused.is_empty() {
            tracing::warn!(columns = ?unused, "record columns absent from the training columns are ignored");
        }
        let unmatched = schema.unmatched_columns();
        if !unmatched.is_empty() {
            tracing::warn!(columns = ?unmatched, "training columns with no record source are always zero");
        }

        Ok(Self {
            encoder,
            schema,
            scaler,
            model,
        })
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn classes(&self) -> &[String] {
        self.encoder.classes()
    }

    pub fn n_neighbors(&self) -> usize {
        self.model.n_neighbors()
    }

    /// Expand, align, scale, classify and decode one patient record.
    pub fn predict(&self, record: &PatientRecord) -> Result<Prediction, InferenceError> {
        let row = self.schema.encode(record);
        let scaled = self.scaler.transform(row.values.view())?;
        let class_codes = self.model.predict(scaled.view().insert_axis(Axis(0)))?;
        let label = self.encoder.inverse_transform(&class_codes)?.join(", ");

        tracing::debug!(label = %label, codes = ?class_codes, "prediction complete");

        Ok(Prediction { label, class_codes })
    }
}
