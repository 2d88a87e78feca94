//! Error types for model loading and prediction

use std::path::PathBuf;
use thiserror::Error;

/// Failure while loading the model artifacts. Fatal: the service does not start.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("model artifact not found: {}", .0.display())]
    MissingArtifact(PathBuf),

    #[error("failed to read artifact {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse artifact {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to load ONNX model {}: {message}", .path.display())]
    Onnx { path: PathBuf, message: String },

    #[error("invalid artifact {}: {source}", .path.display())]
    InvalidModel {
        path: PathBuf,
        #[source]
        source: ModelError,
    },

    #[error("inconsistent artifacts: {0}")]
    Inconsistent(String),
}

/// Failure raised by a regressor or scaler
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("expected {expected} features, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("malformed tree: {0}")]
    MalformedTree(String),

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("model produced a non-finite value")]
    NonFinite,
}

/// Failure of a single prediction request
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictError {
    /// No known fruit is similar enough to the input
    #[error("Unknown fruit '{input}'. Available fruits: {}", quoted_list(.available))]
    UnknownFruit {
        input: String,
        available: Vec<String>,
    },

    #[error("Feature preparation failed: {0}")]
    FeaturePreparation(String),

    #[error("Model prediction failed: {0}")]
    ModelPrediction(String),
}

impl PredictError {
    /// True when the request itself was bad, false for service-side failures
    pub fn is_client_error(&self) -> bool {
        matches!(self, PredictError::UnknownFruit { .. })
    }
}

fn quoted_list(items: &[String]) -> String {
    let quoted: Vec<String> = items.iter().map(|s| format!("'{}'", s)).collect();
    format!("[{}]", quoted.join(", "))
}
