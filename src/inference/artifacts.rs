use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use super::{InferenceError, KnnParams, ScalerParams};

pub const LABEL_ENCODER_FILE: &str = "label_encoder.json";
pub const TRAIN_COLUMNS_FILE: &str = "train_columns.json";
pub const SCALER_FILE: &str = "scaler.json";
pub const KNN_MODEL_FILE: &str = "knn_model.json";

#[derive(Debug, Clone, Deserialize)]
pub struct LabelEncoderParams {
    pub classes: Vec<String>,
}

/// The four files the offline training run leaves behind, parsed but not yet
/// checked against each other.
#[derive(Debug, Clone)]
pub struct ModelArtifacts {
    pub classes: Vec<String>,
    pub train_columns: Vec<String>,
    pub scaler: ScalerParams,
    pub knn: KnnParams,
}

impl ModelArtifacts {
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, InferenceError> {
        let dir = dir.as_ref();
        let encoder: LabelEncoderParams = read_json(&dir.join(LABEL_ENCODER_FILE))?;

        Ok(Self {
            classes: encoder.classes,
            train_columns: read_json(&dir.join(TRAIN_COLUMNS_FILE))?,
            scaler: read_json(&dir.join(SCALER_FILE))?,
            knn: read_json(&dir.join(KNN_MODEL_FILE))?,
        })
    }
}

fn read_json<T: DeserializeOwned>(path: &PathBuf) -> Result<T, InferenceError> {
    let raw = fs::read_to_string(path).map_err(|source| InferenceError::Io {
        path: path.clone(),
        source,
    })?;

    serde_json::from_str(&raw).map_err(|source| InferenceError::Parse {
        path: path.clone(),
        source,
    })
}
