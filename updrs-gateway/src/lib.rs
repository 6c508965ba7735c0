//! HTTP gateway for the prediction service.
//!
//! Exposes one passthrough route, `POST /predict`, which forwards the JSON
//! body verbatim to the upstream model server and returns its answer, plus
//! `GET /health`. The upstream call sits behind the [`Upstream`] trait so
//! router tests run against a stub. CORS is permissive; clients live on
//! other origins during development.

use async_trait::async_trait;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error};
use updrs_core::GatewayConfig;

/// The upstream model server could not answer.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("upstream connection failed: {message}")]
    Connection { message: String },

    #[error("upstream returned HTTP {status}: {message}")]
    Status { status: u16, message: String },
}

/// The one call the gateway makes: forward a feature map, get scores back.
#[async_trait]
pub trait Upstream: Send + Sync {
    async fn predict(&self, features: Value) -> Result<Value, UpstreamError>;
}

/// Real upstream over HTTP.
pub struct HttpUpstream {
    client: reqwest::Client,
    base_url: String,
}

impl HttpUpstream {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn predict(&self, features: Value) -> Result<Value, UpstreamError> {
        let url = format!("{}/predict", self.base_url);
        debug!(url = url.as_str(), "forwarding prediction request upstream");

        let response = self
            .client
            .post(&url)
            .json(&features)
            .send()
            .await
            .map_err(|e| UpstreamError::Connection {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .ok()
                .filter(|body| !body.trim().is_empty())
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("no detail").to_string());
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response.json().await.map_err(|e| UpstreamError::Connection {
            message: format!("failed to read upstream body: {e}"),
        })
    }
}

/// Shared router state: the upstream plus its URL for the health report.
#[derive(Clone)]
pub struct GatewayState {
    upstream: Arc<dyn Upstream>,
    upstream_url: String,
}

impl GatewayState {
    pub fn new(upstream: Arc<dyn Upstream>, upstream_url: impl Into<String>) -> Self {
        Self {
            upstream,
            upstream_url: upstream_url.into(),
        }
    }
}

/// Build the gateway router with `/predict` and `/health`.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/predict", post(predict_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Forward the request body upstream; any upstream failure is a 502 with an
/// `error` detail, never a fabricated prediction.
async fn predict_handler(State(state): State<GatewayState>, Json(features): Json<Value>) -> Response {
    match state.upstream.predict(features).await {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(e) => {
            error!(error = %e, "upstream prediction failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

async fn health_handler(State(state): State<GatewayState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "upstream": state.upstream_url,
    }))
}

/// Serve the gateway until the process is stopped.
pub async fn run(config: &GatewayConfig) -> anyhow::Result<()> {
    let state = GatewayState::new(
        Arc::new(HttpUpstream::new(config.upstream.clone())),
        config.upstream.clone(),
    );
    let app = router(state);
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = addr.as_str(), upstream = config.upstream.as_str(), "gateway listening");
    axum::serve(listener, app).await?;
    Ok(())
}
