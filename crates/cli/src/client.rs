//! API client for communicating with the fruit price server

use anyhow::{Context, Result};
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use url::Url;

/// API client for the fruit price server
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(base_url).context("Invalid API URL")?;

        Ok(Self { client, base_url })
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;

        Self::decode(response).await
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .context("Failed to send request")?;

        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            // the server reports failures as {"detail": ...}
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.detail)
                .unwrap_or(body);
            anyhow::bail!("API error ({}): {}", status, message);
        }

        response.json().await.context("Failed to parse response")
    }
}

// API response types

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub message: String,
    pub models: Vec<String>,
    pub fruits_endpoint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FruitList {
    pub available_fruits: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictRequest {
    pub fruit: String,
    #[serde(rename = "form_Dried")]
    pub form_dried: bool,
    #[serde(rename = "form_Fresh")]
    pub form_fresh: bool,
    #[serde(rename = "form_Frozen")]
    pub form_frozen: bool,
    #[serde(rename = "form_Juice")]
    pub form_juice: bool,
    pub yield_factor: f64,
    pub cup_eq_size: f64,
    pub cup_eq_price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Predictions {
    #[serde(rename = "RandomForest")]
    pub random_forest: f64,
    #[serde(rename = "LinearRegression")]
    pub linear_regression: f64,
    #[serde(rename = "DecisionTree")]
    pub decision_tree: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResult {
    pub matched_fruit: String,
    pub predictions: Predictions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub models_loaded: usize,
    pub known_fruits: usize,
    pub loaded_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}
