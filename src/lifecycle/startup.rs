//! Startup orchestration.
//!
//! # Responsibilities
//! - Load configuration from a file or the environment
//! - Report what the gateway will do before traffic arrives
//!
//! # Design Decisions
//! - Invalid configuration is fatal at startup
//! - A missing or malformed backend origin is only a warning; requests answer
//!   502 until a usable one is set

use std::path::Path;

use crate::config::validation::is_usable_backend_url;
use crate::config::{loader, ConfigError, GatewayConfig};

/// Load the configuration the binary starts with.
pub fn load_configuration(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    match path {
        Some(path) => loader::load_config(path),
        None => loader::from_env(),
    }
}

/// Log the effective configuration. Call after logging is initialized.
pub fn report(config: &GatewayConfig) {
    tracing::info!(
        bind_address = %config.listener.bind_address,
        deployment = ?config.deployment,
        connect_timeout_secs = config.timeouts.connect_secs,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    match &config.upstream.backend_url {
        Some(url) if is_usable_backend_url(url) => {
            tracing::info!(backend_url = %url, "Forwarding /api/v1/* to backend")
        }
        Some(url) => tracing::warn!(
            backend_url = %url,
            "BACKEND_URL is not an absolute http(s) URL; proxied requests will fail with 502"
        ),
        None => tracing::warn!("BACKEND_URL is not set; proxied requests will fail with 502"),
    }

    if config.is_production() {
        tracing::info!(
            metadata_url = %config.identity.metadata_url,
            "Identity tokens will be attached to forwarded requests"
        );
    }
}
