//! Server configuration

use anyhow::{bail, Context, Result};
use price_lib::ArtifactFiles;
use serde::Deserialize;
use std::path::PathBuf;

/// Environment prefix for all server settings, e.g. `FRUIT_PRICE_PORT`
pub const ENV_PREFIX: &str = "FRUIT_PRICE";

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to bind
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding the model artifacts
    #[serde(default = "default_model_dir")]
    pub model_dir: PathBuf,

    /// Minimum similarity for a fruit name match
    #[serde(default = "default_match_cutoff")]
    pub match_cutoff: f64,

    /// Allowed cross-origin caller
    #[serde(default = "default_frontend_url")]
    pub frontend_url: Option<String>,

    #[serde(default = "default_random_forest_file")]
    pub random_forest_file: String,

    #[serde(default = "default_linear_regression_file")]
    pub linear_regression_file: String,

    #[serde(default = "default_decision_tree_file")]
    pub decision_tree_file: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_model_dir() -> PathBuf {
    PathBuf::from("models")
}

fn default_match_cutoff() -> f64 {
    price_lib::DEFAULT_CUTOFF
}

fn default_frontend_url() -> Option<String> {
    std::env::var("FRONTEND_URL")
        .ok()
        .filter(|url| !url.trim().is_empty())
}

fn default_random_forest_file() -> String {
    ArtifactFiles::default().random_forest
}

fn default_linear_regression_file() -> String {
    ArtifactFiles::default().linear_regression
}

fn default_decision_tree_file() -> String {
    ArtifactFiles::default().decision_tree
}

impl ServerConfig {
    /// Load configuration from the process environment
    pub fn load() -> Result<Self> {
        Self::from_environment(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
    }

    /// Load configuration from the given environment source
    pub fn from_environment(env: config::Environment) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(env)
            .build()
            .context("Failed to read configuration")?;

        let config: ServerConfig = config
            .try_deserialize()
            .context("Invalid configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.match_cutoff) {
            bail!(
                "match_cutoff must be between 0 and 1, got {}",
                self.match_cutoff
            );
        }
        if let Some(url) = &self.frontend_url {
            axum::http::HeaderValue::from_str(url)
                .with_context(|| format!("FRONTEND_URL is not a valid origin: {:?}", url))?;
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn artifact_files(&self) -> ArtifactFiles {
        ArtifactFiles {
            random_forest: self.random_forest_file.clone(),
            linear_regression: self.linear_regression_file.clone(),
            decision_tree: self.decision_tree_file.clone(),
            ..ArtifactFiles::default()
        }
    }
}
