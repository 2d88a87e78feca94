//! ONNX regressors through tract
//!
//! Used when a regressor artifact has an `.onnx` extension. The graph takes a
//! single `[1, n]` f32 input and the first value of the first output is the
//! prediction.

use super::Regressor;
use crate::error::ModelError;
use anyhow::{Context, Result};
use std::time::Instant;
use tract_onnx::prelude::*;
use tracing::{debug, warn};

/// Inference latency above which a warning is logged
const MAX_INFERENCE_MS: u128 = 5;

type TractModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Regressor backed by an optimized tract plan
pub struct OnnxRegressor {
    model: TractModel,
    num_features: usize,
}

impl OnnxRegressor {
    /// Parse and optimize a model expecting `num_features` inputs
    pub fn new(model_bytes: &[u8], num_features: usize) -> Result<Self> {
        let model = Self::load_model(model_bytes, num_features)?;
        Ok(Self {
            model,
            num_features,
        })
    }

    fn load_model(model_bytes: &[u8], num_features: usize) -> Result<TractModel> {
        let model = tract_onnx::onnx()
            .model_for_read(&mut std::io::Cursor::new(model_bytes))
            .context("Failed to parse ONNX model")?
            .with_input_fact(0, f32::fact([1, num_features]).into())
            .context("Failed to set input shape")?
            .into_optimized()
            .context("Failed to optimize model")?
            .into_runnable()
            .context("Failed to create runnable model")?;
        Ok(model)
    }

    fn to_tensor(&self, features: &[f64]) -> Result<Tensor, ModelError> {
        let data: Vec<f32> = features.iter().map(|&x| x as f32).collect();
        tract_ndarray::Array2::from_shape_vec((1, self.num_features), data)
            .map(Into::into)
            .map_err(|e| ModelError::Inference(e.to_string()))
    }
}

impl Regressor for OnnxRegressor {
    fn predict(&self, features: &[f64]) -> Result<f64, ModelError> {
        if features.len() != self.num_features {
            return Err(ModelError::DimensionMismatch {
                expected: self.num_features,
                actual: features.len(),
            });
        }

        let start = Instant::now();
        let input = self.to_tensor(features)?;

        let result = self
            .model
            .run(tvec!(input.into()))
            .map_err(|e| ModelError::Inference(e.to_string()))?;
        let output = result
            .first()
            .ok_or_else(|| ModelError::Inference("no output from model".to_string()))?;
        let view = output
            .to_array_view::<f32>()
            .map_err(|e| ModelError::Inference(e.to_string()))?;
        let value = view
            .iter()
            .next()
            .copied()
            .ok_or_else(|| ModelError::Inference("model output is empty".to_string()))?;

        let elapsed = start.elapsed();
        if elapsed.as_millis() > MAX_INFERENCE_MS {
            warn!(
                elapsed_ms = elapsed.as_millis(),
                "Inference exceeded {}ms target",
                MAX_INFERENCE_MS
            );
        } else {
            debug!(elapsed_us = elapsed.as_micros(), "Inference completed");
        }

        Ok(value as f64)
    }
}
