//! Observability infrastructure for the price predictor
//!
//! Provides:
//! - Prometheus metrics (prediction latency, served/unmatched/failed counts, known fruits)
//! - Structured JSON logging with tracing

use crate::models::{FruitRequest, PredictionResult};
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, register_int_gauge,
    Histogram, IntCounter, IntCounterVec, IntGauge,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Histogram buckets for prediction latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<PredictorMetricsInner> = OnceLock::new();

struct PredictorMetricsInner {
    prediction_latency_seconds: Histogram,
    predictions_served: IntCounter,
    unmatched_fruits: IntCounter,
    prediction_errors: IntCounterVec,
    known_fruits: IntGauge,
}

impl PredictorMetricsInner {
    fn new() -> Self {
        Self {
            prediction_latency_seconds: register_histogram!(
                "fruit_price_prediction_latency_seconds",
                "Time spent matching, assembling features and running all models",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register prediction_latency_seconds"),

            predictions_served: register_int_counter!(
                "fruit_price_predictions_served_total",
                "Total number of successful predictions"
            )
            .expect("Failed to register predictions_served"),

            unmatched_fruits: register_int_counter!(
                "fruit_price_unmatched_fruits_total",
                "Requests rejected because no known fruit matched"
            )
            .expect("Failed to register unmatched_fruits"),

            prediction_errors: register_int_counter_vec!(
                "fruit_price_prediction_errors_total",
                "Requests that failed inside the service",
                &["stage"]
            )
            .expect("Failed to register prediction_errors"),

            known_fruits: register_int_gauge!(
                "fruit_price_known_fruits",
                "Number of fruit labels known to the label encoder"
            )
            .expect("Failed to register known_fruits"),
        }
    }
}

/// Predictor metrics for Prometheus exposition
///
/// Lightweight handle to the global metrics instance; clones share the same
/// underlying metrics.
#[derive(Clone)]
pub struct PredictorMetrics {
    _private: (),
}

impl Default for PredictorMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl PredictorMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(PredictorMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &PredictorMetricsInner {
        GLOBAL_METRICS.get().expect("Metrics not initialized")
    }

    pub fn observe_prediction_latency(&self, duration_secs: f64) {
        self.inner().prediction_latency_seconds.observe(duration_secs);
    }

    pub fn inc_predictions_served(&self) {
        self.inner().predictions_served.inc();
    }

    pub fn inc_unmatched_fruits(&self) {
        self.inner().unmatched_fruits.inc();
    }

    /// `stage` is either "features" or "inference"
    pub fn inc_prediction_errors(&self, stage: &str) {
        self.inner()
            .prediction_errors
            .with_label_values(&[stage])
            .inc();
    }

    pub fn set_known_fruits(&self, count: usize) {
        self.inner().known_fruits.set(count as i64);
    }
}

/// Structured logger for service events
#[derive(Clone)]
pub struct StructuredLogger {
    service: String,
}

impl StructuredLogger {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    pub fn log_startup(&self, version: &str, addr: &str, fruit_count: usize) {
        info!(
            event = "service_started",
            service = %self.service,
            version = %version,
            addr = %addr,
            fruit_count = fruit_count,
            "Fruit price service started"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "service_shutdown",
            service = %self.service,
            reason = %reason,
            "Fruit price service shutting down"
        );
    }

    pub fn log_request(&self, request: &FruitRequest) {
        info!(
            event = "prediction_requested",
            service = %self.service,
            fruit = %request.fruit,
            form_dried = request.form_dried,
            form_fresh = request.form_fresh,
            form_frozen = request.form_frozen,
            form_juice = request.form_juice,
            yield_factor = request.yield_factor,
            cup_eq_size = request.cup_eq_size,
            cup_eq_price = request.cup_eq_price,
            "Incoming prediction request"
        );
    }

    pub fn log_match(&self, input: &str, matched: &str, score: f64) {
        info!(
            event = "fruit_matched",
            service = %self.service,
            input = %input,
            matched = %matched,
            score = score,
            "Matched fruit name"
        );
    }

    pub fn log_prediction(&self, result: &PredictionResult, elapsed_secs: f64) {
        info!(
            event = "prediction_completed",
            service = %self.service,
            matched_fruit = %result.matched_fruit,
            random_forest = result.predictions.random_forest,
            linear_regression = result.predictions.linear_regression,
            decision_tree = result.predictions.decision_tree,
            elapsed_secs = elapsed_secs,
            "Prediction complete"
        );
    }

    /// Client errors are informational; service-side failures warn
    pub fn log_failure(&self, fruit: &str, client_error: bool, detail: &str) {
        if client_error {
            info!(
                event = "prediction_failed",
                service = %self.service,
                fruit = %fruit,
                client_error = true,
                detail = %detail,
                "Prediction rejected"
            );
        } else {
            warn!(
                event = "prediction_failed",
                service = %self.service,
                fruit = %fruit,
                client_error = false,
                detail = %detail,
                "Prediction failed"
            );
        }
    }
}
