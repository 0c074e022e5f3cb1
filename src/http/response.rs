//! Response construction.
//!
//! # Responsibilities
//! - Relay backend responses: status and sanitized headers copied, body streamed
//! - Build the gateway's own JSON envelopes (`{"detail": ...}`)
//!
//! # Design Decisions
//! - Streaming responses avoid buffering entire body
//! - Hop-by-hop headers stripped before the response leaves the gateway

use axum::body::Body;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::security::strip_response_headers;

/// Generic body for the blocked namespace; never says why.
pub const NOT_FOUND_DETAIL: &str = "Not Found";

/// A `{"detail": message}` JSON response.
pub fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

pub fn not_found() -> Response {
    detail(StatusCode::NOT_FOUND, NOT_FOUND_DETAIL)
}

/// Turn a backend response into the caller's response without buffering the body.
pub fn relay(upstream: reqwest::Response) -> Response {
    let status = upstream.status();
    let mut headers = upstream.headers().clone();
    strip_response_headers(&mut headers);

    let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}
