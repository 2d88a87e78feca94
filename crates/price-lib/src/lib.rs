//! Core library for fruit price prediction
//!
//! This crate provides:
//! - Loading of the fitted regressors, scaler and label encoder
//! - Fuzzy matching of fruit names against the known labels
//! - Feature assembly in training column order
//! - The prediction service running all three models
//! - Health reporting and observability

pub mod error;
pub mod features;
pub mod health;
pub mod matcher;
pub mod models;
pub mod observability;
pub mod predictor;
pub mod service;
pub mod store;

pub use error::{ModelError, PredictError, StartupError};
pub use health::{HealthResponse, ServiceStatus};
pub use matcher::{FuzzyMatch, FuzzyMatcher, DEFAULT_CUTOFF};
pub use models::*;
pub use observability::{PredictorMetrics, StructuredLogger};
pub use service::PredictionService;
pub use store::{ArtifactFiles, ArtifactInfo, ModelStore, Regressors};
