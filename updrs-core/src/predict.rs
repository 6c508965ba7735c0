//! Prediction client: one awaited HTTP call per validated record.
//!
//! The [`Predictor`] trait is the seam between the pipeline and the remote
//! service, so tests and offline demos run against [`MockPredictor`] instead
//! of a live endpoint. The HTTP implementation makes a single call with no
//! internal timeout, retry, or caching; each call is independent and
//! at-most-once from the client's perspective.

use crate::error::PredictError;
use crate::features::{FeatureRecord, Prediction};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// Submits a validated feature record and returns the two severity scores.
#[async_trait]
pub trait Predictor: Send + Sync {
    async fn predict(&self, record: &FeatureRecord) -> Result<Prediction, PredictError>;
}

/// HTTP client for a remote predictor speaking the `POST /predict` contract.
pub struct HttpPredictor {
    client: Client,
    base_url: String,
}

impl HttpPredictor {
    /// Create a client for the service at `base_url` (e.g. `http://localhost:5000`).
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Interpret a completed HTTP exchange as a prediction or an error.
    ///
    /// A success status with a garbled body is an error, never a partial
    /// success. A non-success status carries the body's `error` field when
    /// the service sent one, otherwise the raw body or the status reason.
    fn interpret_response(status: u16, body: &str) -> Result<Prediction, PredictError> {
        if !(200..300).contains(&status) {
            let message = serde_json::from_str::<serde_json::Value>(body)
                .ok()
                .and_then(|v| v["error"].as_str().map(String::from))
                .unwrap_or_else(|| {
                    if body.trim().is_empty() {
                        reqwest::StatusCode::from_u16(status)
                            .ok()
                            .and_then(|s| s.canonical_reason())
                            .unwrap_or("no detail")
                            .to_string()
                    } else {
                        body.trim().to_string()
                    }
                });
            return Err(PredictError::Status { status, message });
        }

        serde_json::from_str::<Prediction>(body).map_err(|e| PredictError::InvalidResponse {
            message: format!("invalid prediction body: {e}"),
        })
    }
}

#[async_trait]
impl Predictor for HttpPredictor {
    async fn predict(&self, record: &FeatureRecord) -> Result<Prediction, PredictError> {
        let url = format!("{}/predict", self.base_url);
        debug!(url = url.as_str(), "sending prediction request");

        let response = self
            .client
            .post(&url)
            .json(record)
            .send()
            .await
            .map_err(|e| PredictError::Connection {
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| PredictError::Connection {
                message: format!("failed to read response body: {e}"),
            })?;

        Self::interpret_response(status, &body)
    }
}

/// Canned predictor for tests and offline demos.
///
/// Returns the same configured result on every call and counts how many
/// times it was invoked.
pub struct MockPredictor {
    result: Result<Prediction, PredictError>,
    calls: AtomicUsize,
}

impl MockPredictor {
    /// A predictor that always succeeds with the given scores.
    pub fn returning(prediction: Prediction) -> Self {
        Self {
            result: Ok(prediction),
            calls: AtomicUsize::new(0),
        }
    }

    /// A predictor that always fails with the given error.
    pub fn failing(error: PredictError) -> Self {
        Self {
            result: Err(error),
            calls: AtomicUsize::new(0),
        }
    }

    /// How many times `predict` has been called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Predictor for MockPredictor {
    async fn predict(&self, _record: &FeatureRecord) -> Result<Prediction, PredictError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}
