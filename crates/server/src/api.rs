//! HTTP API: service info, known fruits, predictions, health and metrics

use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use price_lib::{FruitRequest, HealthResponse, PredictError, PredictionResult, PredictionService};
use prometheus::{Encoder, TextEncoder};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tracing::{error, info};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PredictionService>,
}

impl AppState {
    pub fn new(service: Arc<PredictionService>) -> Self {
        Self { service }
    }
}

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub message: &'static str,
    pub models: Vec<&'static str>,
    pub fruits_endpoint: &'static str,
}

#[derive(Debug, Serialize)]
pub struct FruitList {
    pub available_fruits: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// Prediction failure mapped onto an HTTP status
#[derive(Debug)]
pub struct ApiError(PredictError);

impl From<PredictError> for ApiError {
    fn from(err: PredictError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        (
            status,
            Json(ErrorBody {
                detail: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

async fn root(State(state): State<Arc<AppState>>) -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: "Fruit Price Prediction API running!",
        models: state.service.model_names(),
        fruits_endpoint: "/fruits",
    })
}

async fn fruits(State(state): State<Arc<AppState>>) -> Json<FruitList> {
    Json(FruitList {
        available_fruits: state.service.known_fruits().to_vec(),
    })
}

async fn predict(
    State(state): State<Arc<AppState>>,
    Json(request): Json<FruitRequest>,
) -> Result<Json<PredictionResult>, ApiError> {
    let result = state.service.predict(&request)?;
    Ok(Json(result))
}

/// Health check response
async fn healthz(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse::from_store(state.service.store()))
}

/// Prometheus metrics endpoint
async fn metrics() -> Response {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!(error = %e, "Failed to encode metrics");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
        .into_response()
}

/// CORS policy admitting a single origin with credentials
pub fn cors_layer(origin: HeaderValue) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

/// Create the API router; without an allowed origin no CORS headers are sent
pub fn create_router(state: Arc<AppState>, allowed_origin: Option<HeaderValue>) -> Router {
    let router = Router::new()
        .route("/", get(root))
        .route("/fruits", get(fruits))
        .route("/predict", post(predict))
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics))
        .with_state(state);

    match allowed_origin {
        Some(origin) => router.layer(cors_layer(origin)),
        None => router,
    }
}

/// Start the API server, stopping when `shutdown` resolves
pub async fn serve(
    addr: &str,
    router: Router,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
