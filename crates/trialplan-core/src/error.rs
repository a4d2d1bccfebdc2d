//! Error types for trialplan

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrialplanError {
    // Coordinate errors
    #[error("Invalid coordinate ({value}): {reason}")]
    InvalidCoordinate { value: String, reason: String },

    #[error("Unsupported midpoint method: {method}. Use geographic or utm")]
    UnsupportedMethod { method: String },

    // Plot errors
    #[error("Invalid plot {plot_id}: {reason}")]
    InvalidPlot { plot_id: String, reason: String },

    #[error("Plot not found: {plot_id}")]
    PlotNotFound { plot_id: String },

    #[error("Invalid work attribute {key} = {value}: expected {min}..={max}")]
    InvalidWorkAttribute {
        key: String,
        value: f64,
        min: f64,
        max: f64,
    },

    // Planning errors
    #[error("Insufficient data: {reason}")]
    InsufficientData { reason: String },

    // Configuration errors
    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // Import errors
    #[error("Parse error in {path} at line {line}: {reason}")]
    Parse {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for TrialplanError {
    fn from(err: serde_json::Error) -> Self {
        TrialplanError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TrialplanError>;
