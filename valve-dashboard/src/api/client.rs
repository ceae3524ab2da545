//! Prediction service client
//!
//! Thin wrapper over the two service endpoints, plus the bounded readiness
//! poll the dashboard runs at startup.

use std::time::Duration;

use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::{sleep, Instant};

use crate::data::ResamplingMethod;

/// Request timeout for individual calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),

    #[error("service returned status {0}")]
    Server(u16),

    #[error("failed to decode service response: {0}")]
    Parse(String),

    #[error("service did not answer within {0:?}")]
    Timeout(Duration),

    #[error("service reported unknown resampling method '{0}'")]
    UnknownMethod(String),
}

/// Prediction returned by `/predict_from_cycle`.
#[derive(Debug, Clone, Deserialize)]
pub struct Prediction {
    pub valve_condition: String,
    pub confidence: f64,
}

#[derive(Debug, Deserialize)]
struct ResamplingMethodResponse {
    resampling_method: String,
}

#[derive(Debug, Serialize)]
struct PredictRequest {
    input_data: Vec<Vec<f64>>,
}

/// Client for the valve prediction service.
pub struct ApiClient {
    base_url: String,
    http_client: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: String) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
        }
    }

    /// Single metadata probe; doubles as the readiness check.
    pub async fn get_resampling_method(&self) -> Result<ResamplingMethod, ApiError> {
        let url = format!("{}/get_resampling_method", self.base_url);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ApiError::Server(response.status().as_u16()));
        }

        let body: ResamplingMethodResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))?;

        body.resampling_method
            .parse()
            .map_err(|_| ApiError::UnknownMethod(body.resampling_method))
    }

    /// Poll the service until it answers, with a fixed sleep between
    /// attempts.
    ///
    /// Gives up with `ApiError::Timeout` once `max_wait` has elapsed instead
    /// of hanging indefinitely.
    pub async fn wait_for_resampling_method(
        &self,
        max_wait: Duration,
        interval: Duration,
    ) -> Result<ResamplingMethod, ApiError> {
        let start = Instant::now();

        loop {
            match self.get_resampling_method().await {
                Ok(method) => return Ok(method),
                // The service is up but misconfigured; retrying won't help
                Err(ApiError::UnknownMethod(token)) => {
                    return Err(ApiError::UnknownMethod(token));
                }
                Err(e) => {
                    if start.elapsed() >= max_wait {
                        return Err(ApiError::Timeout(max_wait));
                    }
                    log::debug!("service not ready yet ({}), retrying", e);
                    sleep(interval).await;
                }
            }
        }
    }

    /// Request a prediction for one aligned cycle.
    pub async fn predict_from_cycle(
        &self,
        cycle: ArrayView2<'_, f64>,
    ) -> Result<Prediction, ApiError> {
        let url = format!("{}/predict_from_cycle", self.base_url);

        let input_data: Vec<Vec<f64>> = cycle
            .rows()
            .into_iter()
            .map(|row| row.to_vec())
            .collect();
        let request = PredictRequest { input_data };

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ApiError::Server(response.status().as_u16()));
        }

        response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn readiness_poll_times_out_against_dead_service() {
        // Nothing listens on the discard port; every attempt fails fast.
        let client = ApiClient::new("http://127.0.0.1:9".to_string());

        let result = client
            .wait_for_resampling_method(Duration::from_millis(50), Duration::from_millis(10))
            .await;

        assert!(matches!(result, Err(ApiError::Timeout(_))));
    }

    #[test]
    fn trailing_slash_is_normalized() {
        let client = ApiClient::new("http://127.0.0.1:8000/".to_string());
        assert_eq!(client.base_url, "http://127.0.0.1:8000");
    }
}
