use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

use super::InferenceError;

/// Serialized form of a fitted standard scaler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalerParams {
    pub mean: Option<Vec<f64>>,
    pub scale: Option<Vec<f64>>,
}

/// Pre-fit per-feature standardisation: `(x - mean) / scale`.
/// Either part may be absent, in which case it is skipped.
#[derive(Debug, Clone)]
pub struct StandardScaler {
    mean: Option<Array1<f64>>,
    scale: Option<Array1<f64>>,
}

impl StandardScaler {
    pub fn from_params(params: ScalerParams) -> Result<Self, InferenceError> {
        if let (Some(mean), Some(scale)) = (&params.mean, &params.scale) {
            if mean.len() != scale.len() {
                return Err(InferenceError::schema(format!(
                    "scaler mean has {} entries but scale has {}",
                    mean.len(),
                    scale.len()
                )));
            }
        }

        let finite = |values: &Option<Vec<f64>>| values.iter().flatten().all(|v| v.is_finite());
        if !finite(&params.mean) || !finite(&params.scale) {
            return Err(InferenceError::schema("scaler parameters must be finite"));
        }

        // Constant features were fitted with zero variance; they pass through unscaled.
        let scale = params
            .scale
            .map(|s| Array1::from(s).mapv(|v| if v == 0.0 { 1.0 } else { v }));

        Ok(Self {
            mean: params.mean.map(Array1::from),
            scale,
        })
    }

    /// Feature count the scaler was fitted on, if it carries any parameters.
    pub fn n_features(&self) -> Option<usize> {
        self.mean
            .as_ref()
            .or(self.scale.as_ref())
            .map(|params| params.len())
    }

    pub fn transform(&self, features: ArrayView1<f64>) -> Result<Array1<f64>, InferenceError> {
        if let Some(expected) = self.n_features() {
            if features.len() != expected {
                return Err(InferenceError::DimensionMismatch {
                    expected,
                    actual: features.len(),
                });
            }
        }

        let mut scaled = features.to_owned();
        if let Some(mean) = &self.mean {
            scaled -= mean;
        }
        if let Some(scale) = &self.scale {
            scaled /= scale;
        }
        Ok(scaled)
    }
}
