// Configuration loading and parsing (config.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },
}

// ---------------------------------------------------------------------------
// Config sections
// ---------------------------------------------------------------------------

/// Top-level configuration assembled from config.toml.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub data: DataPaths,
    pub models: ModelPaths,
    #[serde(default)]
    pub scoring: ScoringWeights,
    #[serde(default)]
    pub form: FormConfig,
}

/// Input and output table locations.
#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    /// Raw per-player-per-match observations CSV.
    pub observations: String,
    /// Directory that receives the engineered output tables.
    pub output_dir: String,
}

/// Serialized predictor artifact locations, one per prediction target.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelPaths {
    pub runs: String,
    pub wickets: String,
    pub outcome: String,
}

/// Weights of the fantasy-score formula.
///
/// These are a fixed configuration table, not tunable model parameters:
/// the defaults are the canonical scoring constants and the formula's
/// meaning changes if they change.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub runs: f64,
    pub wickets: f64,
    pub batting_avg: f64,
    pub bowling_avg: f64,
    pub opponent_runs: f64,
    pub opponent_wickets: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        ScoringWeights {
            runs: 1.2,
            wickets: 25.0,
            batting_avg: 5.0,
            bowling_avg: -3.0,
            opponent_runs: -0.5,
            opponent_wickets: 0.5,
        }
    }
}

/// Rolling-form settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Trailing window length in matches, inclusive of the current one.
    pub window: usize,
}

impl Default for FormConfig {
    fn default() -> Self {
        FormConfig { window: 5 }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from the given TOML file.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let text = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let config: Config = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.form.window == 0 {
        return Err(ConfigError::ValidationError {
            field: "form.window".into(),
            message: "rolling window must be at least 1".into(),
        });
    }
    if config.data.observations.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "data.observations".into(),
            message: "observations path must not be empty".into(),
        });
    }
    if config.data.output_dir.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "data.output_dir".into(),
            message: "output directory must not be empty".into(),
        });
    }
    for (field, path) in [
        ("models.runs", &config.models.runs),
        ("models.wickets", &config.models.wickets),
        ("models.outcome", &config.models.outcome),
    ] {
        if path.is_empty() {
            return Err(ConfigError::ValidationError {
                field: field.into(),
                message: "model path must not be empty".into(),
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
