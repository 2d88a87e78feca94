//! Ordinary least squares regressor

use super::Regressor;
use crate::error::ModelError;
use serde::{Deserialize, Serialize};

/// Linear model `y = coef · x + intercept`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub coef: Vec<f64>,
    pub intercept: f64,
}

impl LinearModel {
    pub fn new(coef: Vec<f64>, intercept: f64) -> Self {
        Self { coef, intercept }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.coef.is_empty() {
            return Err(ModelError::DimensionMismatch {
                expected: 1,
                actual: 0,
            });
        }
        Ok(())
    }

    /// Check the model was fit on `num_features` inputs
    pub fn check_inputs(&self, num_features: usize) -> Result<(), ModelError> {
        if self.coef.len() != num_features {
            return Err(ModelError::DimensionMismatch {
                expected: self.coef.len(),
                actual: num_features,
            });
        }
        Ok(())
    }
}

impl Regressor for LinearModel {
    fn predict(&self, features: &[f64]) -> Result<f64, ModelError> {
        if features.len() != self.coef.len() {
            return Err(ModelError::DimensionMismatch {
                expected: self.coef.len(),
                actual: features.len(),
            });
        }
        let dot: f64 = self.coef.iter().zip(features).map(|(w, x)| w * x).sum();
        Ok(dot + self.intercept)
    }
}
