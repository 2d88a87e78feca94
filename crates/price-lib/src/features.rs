//! Feature assembly for price inference
//!
//! Builds the model input in training column order:
//! `[yield_factor, cup_eq_size, cup_eq_price, fruit_code]` passed through the
//! fitted scaler, followed by the Dried, Fresh, Frozen and Juice flags as 0/1.
//! The fruit code is scaled together with the continuous values because the
//! models were trained that way.

use crate::error::PredictError;
use crate::models::{FeatureVector, FruitRequest};
use crate::store::ModelStore;

/// Values passed through the scaler (three measurements plus the fruit code)
pub const NUM_SCALED_FEATURES: usize = 4;

/// One-hot form flags appended after the scaled values
pub const NUM_FORM_FLAGS: usize = 4;

/// Turns a validated request and its matched fruit into a model input
pub struct FeatureAssembler<'a> {
    store: &'a ModelStore,
}

impl<'a> FeatureAssembler<'a> {
    pub fn new(store: &'a ModelStore) -> Self {
        Self { store }
    }

    pub fn assemble(
        &self,
        request: &FruitRequest,
        matched_fruit: &str,
    ) -> Result<FeatureVector, PredictError> {
        let fruit_code = self.store.encode(matched_fruit).ok_or_else(|| {
            PredictError::FeaturePreparation(format!(
                "'{}' is not a label known to the encoder",
                matched_fruit
            ))
        })?;

        let numeric = [
            request.yield_factor,
            request.cup_eq_size,
            request.cup_eq_price,
            fruit_code as f64,
        ];
        let scaled = self
            .store
            .scaler()
            .transform(&numeric)
            .map_err(|e| PredictError::FeaturePreparation(e.to_string()))?;
        if scaled.len() != NUM_SCALED_FEATURES {
            return Err(PredictError::FeaturePreparation(format!(
                "scaler returned {} values, expected {}",
                scaled.len(),
                NUM_SCALED_FEATURES
            )));
        }

        let mut values = scaled;
        values.extend(
            request
                .form_flags()
                .iter()
                .map(|&flag| if flag { 1.0 } else { 0.0 }),
        );

        let expected = self.store.expected_features();
        if values.len() != expected {
            return Err(PredictError::FeaturePreparation(format!(
                "assembled {} features but the models expect {}",
                values.len(),
                expected
            )));
        }

        Ok(FeatureVector::new(values))
    }
}
