//! Health reporting for the prediction service
//!
//! Model loading is fail-fast, so a running process always has every model.
//! The report exposes what was loaded and when.

use crate::models::ModelKind;
use crate::store::{ArtifactInfo, ModelStore};
use serde::Serialize;

/// Health status of the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Healthy,
}

/// Health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: ServiceStatus,
    pub models_loaded: usize,
    pub known_fruits: usize,
    pub loaded_at: i64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub artifacts: Vec<ArtifactInfo>,
}

impl HealthResponse {
    pub fn from_store(store: &ModelStore) -> Self {
        Self {
            status: ServiceStatus::Healthy,
            models_loaded: ModelKind::ALL.len(),
            known_fruits: store.fruits().len(),
            loaded_at: store.loaded_at().timestamp(),
            artifacts: store.artifacts().to_vec(),
        }
    }
}
