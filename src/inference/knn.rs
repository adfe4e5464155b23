use ndarray::{Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::InferenceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weights {
    #[default]
    Uniform,
    Distance,
}

fn default_p() -> f64 {
    2.0
}

/// Serialized form of a fitted k-nearest-neighbors classifier. `fit_x` holds
/// the training rows in scaled feature space, `fit_y` their class codes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnnParams {
    pub n_neighbors: usize,
    #[serde(default)]
    pub weights: Weights,
    #[serde(default = "default_p")]
    pub p: f64,
    pub fit_x: Vec<Vec<f64>>,
    pub fit_y: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct KnnClassifier {
    n_neighbors: usize,
    weights: Weights,
    p: f64,
    fit_x: Array2<f64>,
    fit_y: Vec<usize>,
}

impl KnnClassifier {
    pub fn from_params(params: KnnParams) -> Result<Self, InferenceError> {
        let n_samples = params.fit_x.len();
        if n_samples == 0 {
            return Err(InferenceError::schema("k-NN model has no training samples"));
        }
        if params.fit_y.len() != n_samples {
            return Err(InferenceError::schema(format!(
                "k-NN model has {} training rows but {} labels",
                n_samples,
                params.fit_y.len()
            )));
        }
        if params.n_neighbors == 0 || params.n_neighbors > n_samples {
            return Err(InferenceError::schema(format!(
                "n_neighbors must be between 1 and {}, got {}",
                n_samples, params.n_neighbors
            )));
        }
        if !(params.p >= 1.0) {
            return Err(InferenceError::schema(format!("Minkowski p must be >= 1, got {}", params.p)));
        }

        let n_features = params.fit_x[0].len();
        if let Some(row) = params.fit_x.iter().position(|row| row.len() != n_features) {
            return Err(InferenceError::schema(format!(
                "training row {} has {} features, expected {}",
                row,
                params.fit_x[row].len(),
                n_features
            )));
        }

        let flat: Vec<f64> = params.fit_x.into_iter().flatten().collect();
        let fit_x = Array2::from_shape_vec((n_samples, n_features), flat)
            .map_err(|e| InferenceError::schema(format!("malformed training matrix: {}", e)))?;

        Ok(Self {
            n_neighbors: params.n_neighbors,
            weights: params.weights,
            p: params.p,
            fit_x,
            fit_y: params.fit_y,
        })
    }

    pub fn n_features(&self) -> usize {
        self.fit_x.ncols()
    }

    pub fn n_neighbors(&self) -> usize {
        self.n_neighbors
    }

    /// Class codes this model can emit.
    pub fn classes(&self) -> impl Iterator<Item = usize> + '_ {
        self.fit_y.iter().copied()
    }

    fn distance(&self, a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
        let diffs = a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs());
        if self.p == 1.0 {
            diffs.sum()
        } else if self.p == 2.0 {
            diffs.map(|d| d * d).sum::<f64>().sqrt()
        } else if self.p.is_infinite() {
            diffs.fold(0.0, f64::max)
        } else {
            diffs.map(|d| d.powf(self.p)).sum::<f64>().powf(1.0 / self.p)
        }
    }

    /// Indices and distances of the `k` closest training rows, nearest first.
    /// Equal distances keep training order.
    pub fn kneighbors(&self, sample: ArrayView1<f64>) -> Vec<(usize, f64)> {
        let mut distances: Vec<(usize, f64)> = self
            .fit_x
            .axis_iter(Axis(0))
            .enumerate()
            .map(|(idx, row)| (idx, self.distance(row, sample)))
            .collect();

        distances.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        distances.truncate(self.n_neighbors);
        distances
    }

    pub fn predict_one(&self, sample: ArrayView1<f64>) -> Result<usize, InferenceError> {
        if sample.len() != self.n_features() {
            return Err(InferenceError::DimensionMismatch {
                expected: self.n_features(),
                actual: sample.len(),
            });
        }

        let neighbors = self.kneighbors(sample);
        let exact_hits = neighbors.iter().any(|(_, d)| *d == 0.0);

        let mut votes: BTreeMap<usize, f64> = BTreeMap::new();
        for (idx, dist) in &neighbors {
            let weight = match self.weights {
                Weights::Uniform => 1.0,
                // Exact matches outvote everything else.
                Weights::Distance if exact_hits => {
                    if *dist == 0.0 {
                        1.0
                    } else {
                        0.0
                    }
                }
                Weights::Distance => 1.0 / dist,
            };
            *votes.entry(self.fit_y[*idx]).or_insert(0.0) += weight;
        }

        // Ascending class order: on a tied vote the smallest code wins.
        let mut best: Option<(usize, f64)> = None;
        for (class, weight) in votes {
            if best.map_or(true, |(_, w)| weight > w) {
                best = Some((class, weight));
            }
        }

        best.map(|(class, _)| class)
            .ok_or_else(|| InferenceError::schema("k-NN produced no neighbors"))
    }

    pub fn predict(&self, samples: ArrayView2<f64>) -> Result<Vec<usize>, InferenceError> {
        samples
            .axis_iter(Axis(0))
            .map(|row| self.predict_one(row))
            .collect()
    }
}
