use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("Failed to read artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse artifact {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Incompatible model artifacts: {0}")]
    Schema(String),
    #[error("Expected {expected} features, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("Class code {0} is not known to the label encoder")]
    UnknownClass(usize),
}

impl InferenceError {
    pub fn schema(message: impl Into<String>) -> Self {
        InferenceError::Schema(message.into())
    }
}
