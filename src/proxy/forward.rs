//! Outbound call to the backend.

use std::time::Duration;

use axum::body::Bytes;
use axum::http::{HeaderMap, Method};
use axum::response::Response;
use reqwest::redirect::Policy;

use crate::config::TimeoutConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::http::response::relay;
use crate::routing::TargetUrl;

/// A request ready to leave the gateway.
#[derive(Debug)]
pub struct ForwardRequest {
    pub method: Method,
    pub target: TargetUrl,
    /// Already sanitized.
    pub headers: HeaderMap,
    /// `None` for GET and HEAD.
    pub body: Option<Bytes>,
}

/// HTTP client for the backend. Never follows redirects and never caches.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: reqwest::Client,
}

impl Forwarder {
    pub fn new(timeouts: &TimeoutConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .redirect(Policy::none())
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .timeout(Duration::from_secs(timeouts.request_secs))
            .no_proxy()
            .build()?;

        Ok(Self { client })
    }

    /// Send the request once and relay whatever the backend answers.
    ///
    /// Backend 3xx/4xx/5xx are responses, not errors. Only failing to get a
    /// response at all is a Transport error.
    pub async fn forward(&self, request: ForwardRequest) -> GatewayResult<Response> {
        let mut builder = self
            .client
            .request(request.method, request.target.as_url().clone())
            .headers(request.headers);

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let upstream = builder.send().await.map_err(|e| {
            tracing::warn!(target_url = %request.target, error = %e, "Backend request failed");
            GatewayError::Transport(e.to_string())
        })?;

        tracing::debug!(
            target_url = %request.target,
            status = %upstream.status(),
            "Backend responded"
        );

        Ok(relay(upstream))
    }
}
