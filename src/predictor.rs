// Trained predictor boundary.
//
// The core never trains anything: each prediction target (runs, wickets,
// match outcome) is an externally produced artifact exposing a single
// predict capability over a fixed-length feature vector. The concrete
// artifact is a JSON-serialized linear model; the `Predictor` trait is
// the seam that lets tests substitute a stub.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::config::ModelPaths;

/// Feature-vector width shared by all three query operations.
pub const FEATURE_LEN: usize = 4;

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Opaque trained model: a fixed-length numeric feature vector in, a
/// single value out. Continuous for regression targets, {0,1} for the
/// outcome classifier.
pub trait Predictor: Send + Sync {
    fn predict(&self, features: &[f64]) -> f64;
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum PredictorError {
    #[error("failed to read model file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse model file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid model {path}: {message}")]
    Validation { path: PathBuf, message: String },
}

// ---------------------------------------------------------------------------
// Serialized linear model artifact
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Regression,
    Classification,
}

/// A linear model exported by the training step.
#[derive(Debug, Clone, Deserialize)]
pub struct LinearModel {
    pub kind: ModelKind,
    pub weights: Vec<f64>,
    pub intercept: f64,
}

impl LinearModel {
    fn validate(&self, path: &Path, expected_len: usize) -> Result<(), PredictorError> {
        if self.weights.len() != expected_len {
            return Err(PredictorError::Validation {
                path: path.to_path_buf(),
                message: format!(
                    "expected {} weight(s), found {}",
                    expected_len,
                    self.weights.len()
                ),
            });
        }
        if !self.intercept.is_finite() || self.weights.iter().any(|w| !w.is_finite()) {
            return Err(PredictorError::Validation {
                path: path.to_path_buf(),
                message: "model contains non-finite coefficients".into(),
            });
        }
        Ok(())
    }

    fn raw(&self, features: &[f64]) -> f64 {
        self.weights
            .iter()
            .zip(features)
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.intercept
    }
}

impl Predictor for LinearModel {
    fn predict(&self, features: &[f64]) -> f64 {
        let raw = self.raw(features);
        match self.kind {
            ModelKind::Regression => raw,
            // Binary label: positive score maps to label 1.
            ModelKind::Classification => {
                if raw > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load one model artifact and validate its shape. A failure here is
/// fatal at process startup, never a per-query failure.
pub fn load_model(path: &Path, expected_len: usize) -> Result<LinearModel, PredictorError> {
    let text = std::fs::read_to_string(path).map_err(|e| PredictorError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let model: LinearModel = serde_json::from_str(&text).map_err(|e| PredictorError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    model.validate(path, expected_len)?;
    Ok(model)
}

/// The three predictors a serving process owns for its whole lifetime.
pub struct PredictorSet {
    pub runs: Box<dyn Predictor>,
    pub wickets: Box<dyn Predictor>,
    pub outcome: Box<dyn Predictor>,
}

/// Load and validate all predictor artifacts named in the config.
pub fn load_predictors(paths: &ModelPaths) -> Result<PredictorSet, PredictorError> {
    let runs = load_model(Path::new(&paths.runs), FEATURE_LEN)?;
    let wickets = load_model(Path::new(&paths.wickets), FEATURE_LEN)?;
    let outcome = load_model(Path::new(&paths.outcome), FEATURE_LEN)?;
    if outcome.kind != ModelKind::Classification {
        return Err(PredictorError::Validation {
            path: PathBuf::from(&paths.outcome),
            message: "outcome model must be a classification model".into(),
        });
    }
    info!("loaded predictor artifacts (runs, wickets, outcome)");
    Ok(PredictorSet {
        runs: Box::new(runs),
        wickets: Box::new(wickets),
        outcome: Box::new(outcome),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
