//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses and URLs parse
//! - Validate value ranges (timeouts > 0, limits > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Backend origin problems (missing or malformed) are not errors here;
//!   requests fail with 502 until a usable origin is configured

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("identity.metadata_url '{0}' must be an absolute http URL")]
    MetadataUrl(String),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("observability.metrics_address '{0}' is not a socket address")]
    MetricsAddress(String),
}

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    // The metadata server is only reachable over plain http on the local link.
    if !is_http_url(&config.identity.metadata_url, false) {
        errors.push(ValidationError::MetadataUrl(config.identity.metadata_url.clone()));
    }

    if config.identity.timeout_secs == 0 {
        errors.push(ValidationError::Zero("identity.timeout_secs"));
    }
    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.connect_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.request_secs"));
    }
    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::Zero("limits.max_body_bytes"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(config.observability.metrics_address.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// True if `url` can serve as the backend origin: absolute http(s) with a host.
pub fn is_usable_backend_url(url: &str) -> bool {
    is_http_url(url.trim(), true)
}

fn is_http_url(value: &str, allow_https: bool) -> bool {
    match Url::parse(value) {
        Ok(url) => {
            let scheme_ok = url.scheme() == "http" || (allow_https && url.scheme() == "https");
            scheme_ok && url.host_str().is_some()
        }
        Err(_) => false,
    }
}
