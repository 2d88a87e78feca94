//! Prediction service: match, assemble, run every model, format
//!
//! A request either yields all three predictions or fails as a whole. An
//! unmatched fruit is the caller's fault; feature assembly and inference
//! failures are the service's.

use crate::error::{ModelError, PredictError};
use crate::features::FeatureAssembler;
use crate::matcher::{self, FuzzyMatcher};
use crate::models::{round2, FeatureVector, FruitRequest, ModelKind, PredictionResult, Predictions};
use crate::observability::{PredictorMetrics, StructuredLogger};
use crate::store::ModelStore;
use std::sync::Arc;
use std::time::Instant;

pub struct PredictionService {
    store: Arc<ModelStore>,
    matcher: FuzzyMatcher,
    metrics: PredictorMetrics,
    logger: StructuredLogger,
}

impl PredictionService {
    pub fn new(store: Arc<ModelStore>, matcher: FuzzyMatcher) -> Self {
        let metrics = PredictorMetrics::new();
        metrics.set_known_fruits(store.fruits().len());

        Self {
            store,
            matcher,
            metrics,
            logger: StructuredLogger::new("fruit-price"),
        }
    }

    pub fn with_logger(mut self, logger: StructuredLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn store(&self) -> &ModelStore {
        &self.store
    }

    pub fn known_fruits(&self) -> &[String] {
        self.store.fruits()
    }

    /// Display names of the served models
    pub fn model_names(&self) -> Vec<&'static str> {
        ModelKind::ALL.iter().map(|k| k.display_name()).collect()
    }

    pub fn predict(&self, request: &FruitRequest) -> Result<PredictionResult, PredictError> {
        let start = Instant::now();
        self.logger.log_request(request);

        let outcome = self.run(request);
        let elapsed = start.elapsed().as_secs_f64();

        match &outcome {
            Ok(result) => {
                self.metrics.observe_prediction_latency(elapsed);
                self.metrics.inc_predictions_served();
                self.logger.log_prediction(result, elapsed);
            }
            Err(err) => {
                match err {
                    PredictError::UnknownFruit { .. } => self.metrics.inc_unmatched_fruits(),
                    PredictError::FeaturePreparation(_) => {
                        self.metrics.inc_prediction_errors("features")
                    }
                    PredictError::ModelPrediction(_) => {
                        self.metrics.inc_prediction_errors("inference")
                    }
                }
                self.logger
                    .log_failure(&request.fruit, err.is_client_error(), &err.to_string());
            }
        }

        outcome
    }

    fn run(&self, request: &FruitRequest) -> Result<PredictionResult, PredictError> {
        let fruits = self.store.fruits();
        let found = self.matcher.find(&request.fruit, fruits).ok_or_else(|| {
            PredictError::UnknownFruit {
                input: matcher::normalize(&request.fruit),
                available: fruits.to_vec(),
            }
        })?;
        self.logger.log_match(&request.fruit, found.label, found.score);

        let features = FeatureAssembler::new(&self.store).assemble(request, found.label)?;

        let predictions = Predictions {
            random_forest: self.infer(ModelKind::RandomForest, &features)?,
            linear_regression: self.infer(ModelKind::LinearRegression, &features)?,
            decision_tree: self.infer(ModelKind::DecisionTree, &features)?,
        };

        Ok(PredictionResult {
            matched_fruit: found.label.to_string(),
            predictions,
        })
    }

    fn infer(&self, kind: ModelKind, features: &FeatureVector) -> Result<f64, PredictError> {
        let value = self
            .store
            .regressor(kind)
            .predict(features.as_slice())
            .and_then(|v| if v.is_finite() { Ok(v) } else { Err(ModelError::NonFinite) })
            .map_err(|e| PredictError::ModelPrediction(format!("{}: {}", kind, e)))?;
        Ok(round2(value))
    }
}
