use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use shared::protocol::{RunPredictionResponse, REALTIME_PATH, RUN_PREDICTION_PATH};
use tracing::{debug, warn};
use url::Url;

pub mod controller;
pub mod error;
pub mod format;
pub mod presenter;
pub mod view;

pub use controller::{RealtimePayload, RefreshController, RefreshOutcome};
pub use error::FetchError;
pub use view::{DashboardView, ElementId, MemoryView, ViewCommand};

/// Backend operations a refresh cycle needs.
#[async_trait]
pub trait PredictionSource: Send + Sync {
    /// Asks the backend to run the predictor. Fails on any non-OK status.
    async fn run_prediction(&self) -> Result<(), FetchError>;
    /// Latest formatted record(s) as raw JSON. The HTTP status is not checked;
    /// error payloads are interpreted by the caller.
    async fn fetch_realtime(&self) -> Result<Value, FetchError>;
}

pub struct DashboardClient {
    http: Client,
    server_url: Url,
}

impl DashboardClient {
    pub fn new(server_url: &str) -> Result<Self, FetchError> {
        Self::with_timeout(server_url, None)
    }

    pub fn with_timeout(server_url: &str, timeout: Option<Duration>) -> Result<Self, FetchError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            server_url: Url::parse(server_url)?,
        })
    }

    pub fn server_url(&self) -> &Url {
        &self.server_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, FetchError> {
        Ok(self.server_url.join(path)?)
    }
}

#[async_trait]
impl PredictionSource for DashboardClient {
    async fn run_prediction(&self) -> Result<(), FetchError> {
        let url = self.endpoint(RUN_PREDICTION_PATH)?;
        let res = self.http.get(url).send().await?;
        let status = res.status();
        let body = res.bytes().await?;

        if !status.is_success() {
            let error_body = decode_body(status, &body)?;
            let message = error_body
                .get("error")
                .map(format::display_value)
                .unwrap_or_else(|| "unknown error".to_string());
            warn!(status = status.as_u16(), %message, "prediction run rejected");
            return Err(FetchError::Server {
                status: status.as_u16(),
                message,
            });
        }

        match serde_json::from_slice::<RunPredictionResponse>(&body) {
            Ok(run) => debug!(message = %run.message, "prediction run finished"),
            Err(_) => debug!("prediction run finished"),
        }
        Ok(())
    }

    async fn fetch_realtime(&self) -> Result<Value, FetchError> {
        let url = self.endpoint(REALTIME_PATH)?;
        let res = self.http.get(url).send().await?;
        let status = res.status();
        let body = res.bytes().await?;
        decode_body(status, &body)
    }
}

/// Decodes a JSON body, naming the status when a non-OK response is not JSON.
fn decode_body(status: StatusCode, body: &[u8]) -> Result<Value, FetchError> {
    serde_json::from_slice(body).map_err(|source| {
        if status.is_success() {
            FetchError::Decode(source)
        } else {
            FetchError::UnreadableBody {
                status: status.as_u16(),
                source,
            }
        }
    })
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
