//! Per-request pipeline.
//!
//! ```text
//! normalize → guard → build target → guard → sanitize headers
//!     → read body (non GET/HEAD) → [production] identity token → forward → relay
//! ```
//!
//! Steps run strictly in order and nothing is retried.

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;

use crate::error::{GatewayError, GatewayResult};
use crate::http::server::AppState;
use crate::proxy::forward::ForwardRequest;
use crate::routing::{guard, NormalizedPath, TargetUrl, API_PREFIX};
use crate::security::{install_identity_token, strip_request_headers};

/// How a request left the pipeline when it did not fail.
#[derive(Debug)]
pub enum Outcome {
    /// Internal namespace requested; answer 404 without touching the network.
    Blocked,
    /// Backend response, ready to hand back.
    Relayed(Response),
}

/// Run one inbound request through the gateway.
pub async fn process(state: &AppState, request: Request<Body>) -> GatewayResult<Outcome> {
    let config = state.config.load_full();
    let (parts, body) = request.into_parts();

    // The router matched on the raw path, so this is still percent-encoded.
    let raw_path = parts.uri.path().strip_prefix(API_PREFIX).unwrap_or_default();
    let path = NormalizedPath::parse(raw_path)?;
    if guard::blocks_path(&path) {
        return Ok(Outcome::Blocked);
    }

    let origin = config
        .upstream
        .backend_url
        .as_deref()
        .ok_or_else(|| GatewayError::Configuration("BACKEND_URL is not set".to_string()))?;
    let target = TargetUrl::build(origin, &path, parts.uri.query())?;
    if guard::blocks_target(&target) {
        return Ok(Outcome::Blocked);
    }

    let mut headers = parts.headers;
    strip_request_headers(&mut headers);

    let body = if parts.method == Method::GET || parts.method == Method::HEAD {
        None
    } else {
        let bytes = axum::body::to_bytes(body, config.limits.max_body_bytes)
            .await
            .map_err(|e| GatewayError::Transport(format!("failed to read request body: {e}")))?;
        Some(bytes)
    };

    if config.is_production() {
        let token = state.tokens.fetch(&config.identity, &target.audience()).await?;
        install_identity_token(&mut headers, &token)?;
    }

    let forwarder = state.forwarder.load_full();
    let response = forwarder
        .forward(ForwardRequest {
            method: parts.method,
            target,
            headers,
            body,
        })
        .await?;

    Ok(Outcome::Relayed(response))
}
