use anyhow::Context;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::errors::ServiceError;

/// Passthrough to the public forecast API.
#[derive(Debug, Clone)]
pub struct WeatherService {
    client: Client,
    url: String,
}

impl WeatherService {
    pub fn new(url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to construct reqwest client for weather service")?;

        Ok(Self::with_client(url, client))
    }

    pub fn with_client(url: impl Into<String>, client: Client) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Fetches the current forecast document as-is.
    #[instrument(skip(self), fields(url = %self.url))]
    pub async fn current_forecast(&self) -> Result<Value, ServiceError> {
        let response = self
            .client
            .get(&self.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                ServiceError::ExternalServiceError(format!(
                    "Failed to connect to weather API: {}",
                    e
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::ExternalServiceError(format!(
                "Weather API returned error status: {}",
                status
            )));
        }

        let payload = response.json::<Value>().await.map_err(|e| {
            ServiceError::ExternalServiceError(format!(
                "Failed to parse weather API response: {}",
                e
            ))
        })?;

        debug!("Weather forecast fetched");
        Ok(payload)
    }
}
