//! Fruit Price Server - serves price predictions from three fitted regressors
//!
//! Loads the model artifacts once at startup and answers prediction requests
//! until interrupted.

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use fruit_price_server::{api, config::ServerConfig};
use price_lib::{FuzzyMatcher, ModelStore, PredictionService, StructuredLogger};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting fruit-price-server");

    let config = ServerConfig::load()?;
    info!(
        model_dir = %config.model_dir.display(),
        match_cutoff = config.match_cutoff,
        frontend_url = ?config.frontend_url,
        "Server configured"
    );

    let store = ModelStore::load(&config.model_dir, &config.artifact_files())
        .with_context(|| format!("Failed to load models from {}", config.model_dir.display()))?;

    let logger = StructuredLogger::new("fruit-price-server");
    let service = PredictionService::new(Arc::new(store), FuzzyMatcher::new(config.match_cutoff))
        .with_logger(logger.clone());
    let fruit_count = service.known_fruits().len();

    let allowed_origin = config
        .frontend_url
        .as_deref()
        .map(HeaderValue::from_str)
        .transpose()
        .context("Invalid FRONTEND_URL")?;

    let state = Arc::new(api::AppState::new(Arc::new(service)));
    let router = api::create_router(state, allowed_origin);

    let addr = config.bind_addr();
    logger.log_startup(SERVER_VERSION, &addr, fruit_count);

    let shutdown_logger = logger.clone();
    api::serve(&addr, router, async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => shutdown_logger.log_shutdown("SIGINT received"),
            Err(e) => {
                tracing::warn!(error = %e, "Cannot listen for SIGINT, serving until killed");
                std::future::pending::<()>().await;
            }
        }
    })
    .await?;

    info!("Shut down");
    Ok(())
}
