//! API client for communicating with the ML service

use anyhow::{Context, Result};
use predictor_lib::flights::FlightStatus;
use predictor_lib::health::{HealthResponse, ReadinessResponse};
use predictor_lib::models::PredictionQuality;
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Non-success answer from the service
#[derive(Debug, Error)]
#[error("API error ({status}) {code}: {message}")]
pub struct ApiFailure {
    pub status: u16,
    pub code: String,
    pub message: String,
}

impl ApiFailure {
    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }
}

/// API client for the ML service
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

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).context("Invalid path")
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;

        Self::parse(response).await
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let response = self
            .client
            .post(self.url(path)?)
            .json(body)
            .send()
            .await
            .context("Failed to send request")?;

        Self::parse(response).await
    }

    /// Make a PUT request with JSON body
    pub async fn put<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let response = self
            .client
            .put(self.url(path)?)
            .json(body)
            .send()
            .await
            .context("Failed to send request")?;

        Self::parse(response).await
    }

    /// GET a probe endpoint whose body is meaningful for any status code
    pub async fn probe<T: DeserializeOwned>(&self, path: &str) -> Result<(u16, T)> {
        let response = self
            .client
            .get(self.url(path)?)
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status().as_u16();
        let body = response.json().await.context("Failed to parse response")?;
        Ok((status, body))
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let failure = match serde_json::from_str::<ErrorResponse>(&body) {
                Ok(err) => ApiFailure {
                    status: status.as_u16(),
                    code: err.code,
                    message: err.message,
                },
                Err(_) => ApiFailure {
                    status: status.as_u16(),
                    code: status.canonical_reason().unwrap_or("UNKNOWN").to_string(),
                    message: body,
                },
            };
            return Err(failure.into());
        }

        response.json().await.context("Failed to parse response")
    }

    pub async fn predict(&self, request: &PredictRequest) -> Result<PredictResponse> {
        self.post("predict", request).await
    }

    pub async fn latest_flight(&self, flight: &str) -> Result<FlightStatus> {
        let mut url = self.url("api/v1/flights/latest")?;
        url.query_pairs_mut().append_pair("flight", flight);
        self.get(url).await
    }

    pub async fn update_flight(&self, status: &FlightStatus) -> Result<FlightStatus> {
        self.put("api/v1/flights", status).await
    }

    pub async fn health(&self) -> Result<(u16, HealthResponse)> {
        self.probe("healthz").await
    }

    pub async fn readiness(&self) -> Result<(u16, ReadinessResponse)> {
        self.probe("readyz").await
    }
}

// API request/response types

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    pub flight: String,
    pub origin: String,
    pub destination: String,
    pub scheduled_dep_iso: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub probability_delay_over_30min: f32,
    pub quality: PredictionQuality,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}
