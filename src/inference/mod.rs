// Pre-trained health-risk classifier: artifacts, preprocessing and prediction

pub mod artifacts;
pub mod encoder;
pub mod errors;
pub mod knn;
pub mod pipeline;
pub mod scaler;
pub mod schema;

pub use artifacts::ModelArtifacts;
pub use encoder::LabelEncoder;
pub use errors::InferenceError;
pub use knn::{KnnClassifier, KnnParams, Weights};
pub use pipeline::{InferencePipeline, Prediction};
pub use scaler::{ScalerParams, StandardScaler};
pub use schema::{ColumnKind, ExpandedRow, FeatureRow, FeatureSchema};
