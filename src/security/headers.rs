//! Header sanitation between the caller and the backend.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers in both directions
//! - Drop `Host` and `Content-Length` from forwarded requests (the client recomputes them)
//! - Swap in the gateway's identity token, keeping the caller's credential aside
//!
//! # Design Decisions
//! - Fixed header set; `HeaderMap` lookups are already case-insensitive
//! - Responses keep everything else (content-type, caching, custom headers)

use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};

use crate::identity::{IdentityToken, TokenError};

/// Headers meaningful only for a single transport leg.
pub const HOP_BY_HOP_HEADERS: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Request headers the outbound client must compute itself.
pub const RECOMPUTED_REQUEST_HEADERS: [HeaderName; 2] = [header::HOST, header::CONTENT_LENGTH];

/// Where the caller's own `Authorization` goes once the identity token replaces it.
pub const X_FORWARDED_AUTHORIZATION: HeaderName = HeaderName::from_static("x-forwarded-authorization");

/// Prepare inbound request headers for forwarding.
pub fn strip_request_headers(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP_HEADERS.iter().chain(RECOMPUTED_REQUEST_HEADERS.iter()) {
        headers.remove(name);
    }
}

/// Prepare backend response headers for relaying.
pub fn strip_response_headers(headers: &mut HeaderMap) {
    for name in &HOP_BY_HOP_HEADERS {
        headers.remove(name);
    }
}

/// Replace `Authorization` with the gateway's bearer token.
///
/// An existing caller credential is copied to `X-Forwarded-Authorization` first.
pub fn install_identity_token(headers: &mut HeaderMap, token: &IdentityToken) -> Result<(), TokenError> {
    let bearer = HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
        .map_err(|_| TokenError::InvalidHeader)?;

    if let Some(original) = headers.remove(header::AUTHORIZATION) {
        headers.insert(X_FORWARDED_AUTHORIZATION, original);
    }
    headers.insert(header::AUTHORIZATION, bearer);
    Ok(())
}
