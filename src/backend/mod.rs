//! Client for the chart calculation and geocoding backend
//!
//! The backend is owned by another service; this module only speaks its HTTP contract.

mod types;

use std::collections::HashMap;
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use thiserror::Error;

pub use types::{
    ChartDetails, ChartElement, ChartRequest, Coordinates, ElementKind, PlaceDetails,
    PlacePrediction, PlacesResponse, StructuredFormatting, TemporaryChart,
};

/// Autocomplete inputs shorter than this are not sent
const MIN_AUTOCOMPLETE_LEN: usize = 2;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The places API answered with a non-OK status
    #[error("places API error: {0}")]
    Places(String),
}

/// Backend API client
pub struct BackendClient {
    base_url: String,
    client: reqwest::Client,
    predictions: Mutex<HashMap<String, Vec<PlacePrediction>>>,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            predictions: Mutex::new(HashMap::new()),
        }
    }

    /// Build API URL
    fn api_url(&self, path: &str) -> String {
        format!("{}/api/v1/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn read<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, BackendError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }

    /// Submit birth data; returns the id of the temporary chart
    pub async fn calculate_chart(&self, request: &ChartRequest) -> Result<String, BackendError> {
        let response = self
            .client
            .post(self.api_url("onboarding/calculate-temporary-chart"))
            .json(request)
            .send()
            .await?;

        let chart: TemporaryChart = Self::read(response).await?;
        tracing::debug!("Temporary chart created: {}", chart.temporary_chart_id);
        Ok(chart.temporary_chart_id)
    }

    /// Fetch a calculated temporary chart
    pub async fn chart(&self, temporary_chart_id: &str) -> Result<ChartDetails, BackendError> {
        let response = self
            .client
            .get(self.api_url(&format!("onboarding/temporary-chart/{}", temporary_chart_id)))
            .send()
            .await?;
        Self::read(response).await
    }

    /// City predictions for a partial input, memoized per normalized input
    pub async fn autocomplete(&self, input: &str) -> Result<Vec<PlacePrediction>, BackendError> {
        let key = input.trim().to_lowercase();
        if key.chars().count() < MIN_AUTOCOMPLETE_LEN {
            return Ok(Vec::new());
        }

        if let Some(cached) = self.cached_predictions(&key) {
            return Ok(cached);
        }

        let response = self
            .client
            .get(self.api_url("location/autocomplete"))
            .query(&[
                ("input_text", key.as_str()),
                ("types", "(cities)"),
                ("language", "en"),
            ])
            .send()
            .await?;

        let places: PlacesResponse = Self::read(response).await?;
        let predictions = match places.status.as_str() {
            "OK" => places.predictions,
            "ZERO_RESULTS" => Vec::new(),
            other => return Err(BackendError::Places(other.to_string())),
        };

        self.predictions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, predictions.clone());
        Ok(predictions)
    }

    fn cached_predictions(&self, key: &str) -> Option<Vec<PlacePrediction>> {
        self.predictions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    /// Coordinates, address and timezone of a predicted place
    pub async fn place_details(&self, place_id: &str) -> Result<PlaceDetails, BackendError> {
        let response = self
            .client
            .get(self.api_url("location/details"))
            .query(&[("place_id", place_id)])
            .send()
            .await?;
        Self::read(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url() {
        let client = BackendClient::new("https://vera.up.railway.app/");
        assert_eq!(
            client.api_url("onboarding/calculate-temporary-chart"),
            "https://vera.up.railway.app/api/v1/onboarding/calculate-temporary-chart"
        );
    }

    #[tokio::test]
    async fn test_short_input_skips_request() {
        // Unroutable base: any request would fail
        let client = BackendClient::new("http://127.0.0.1:1");
        assert!(client.autocomplete(" b ").await.unwrap().is_empty());
        assert!(client.autocomplete("").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_memoized_predictions() {
        let client = BackendClient::new("http://127.0.0.1:1");
        let prediction = PlacePrediction {
            description: "Berlin, Germany".to_string(),
            place_id: "abc".to_string(),
            structured_formatting: StructuredFormatting {
                main_text: "Berlin".to_string(),
                secondary_text: "Germany".to_string(),
            },
        };
        client
            .predictions
            .lock()
            .unwrap()
            .insert("berlin".to_string(), vec![prediction.clone()]);

        let found = client.autocomplete("  Berlin ").await.unwrap();
        assert_eq!(found, vec![prediction]);
    }
}
