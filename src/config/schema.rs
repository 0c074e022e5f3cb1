//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Default metadata endpoint that issues identity tokens on the production platform.
pub const DEFAULT_METADATA_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/identity";

/// Root configuration for the gateway.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Backend API the gateway forwards to.
    pub upstream: UpstreamConfig,

    /// Deployment mode. Production enables the identity token exchange.
    pub deployment: Deployment,

    /// Identity token settings (production only).
    pub identity: IdentityConfig,

    /// Timeout configuration for outbound calls.
    pub timeouts: TimeoutConfig,

    /// Request limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl GatewayConfig {
    /// True when forwarded requests must carry a freshly minted identity token.
    pub fn is_production(&self) -> bool {
        self.deployment == Deployment::Production
    }
}

/// Listener configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Backend origin configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Backend origin URL (e.g., "https://api.example.com").
    ///
    /// Left optional on purpose: a missing origin fails individual requests
    /// with 502 instead of preventing startup.
    pub backend_url: Option<String>,
}

/// Where the gateway is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Deployment {
    #[default]
    Development,
    Production,
}

impl Deployment {
    /// Parse the value of the `APP_ENV` variable. Anything other than
    /// "production" is treated as development.
    pub fn from_env_value(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("production") {
            Deployment::Production
        } else {
            Deployment::Development
        }
    }
}

/// Identity token provider configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Metadata endpoint returning identity tokens.
    pub metadata_url: String,

    /// Timeout for the token round trip in seconds.
    pub timeout_secs: u64,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            metadata_url: DEFAULT_METADATA_URL.to_string(),
            timeout_secs: 5,
        }
    }
}

/// Timeout configuration for the forwarded call.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}

/// Request limits.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum buffered request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 10 * 1024 * 1024, // 10MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_development_without_backend() {
        let config = GatewayConfig::default();
        assert!(!config.is_production());
        assert!(config.upstream.backend_url.is_none());
        assert_eq!(config.identity.metadata_url, DEFAULT_METADATA_URL);
    }

    #[test]
    fn parses_partial_toml() {
        let config: GatewayConfig = toml::from_str(
            r#"
            deployment = "production"

            [upstream]
            backend_url = "https://api.example.com"
            "#,
        )
        .unwrap();

        assert!(config.is_production());
        assert_eq!(config.upstream.backend_url.as_deref(), Some("https://api.example.com"));
        assert_eq!(config.timeouts.request_secs, 30);
    }

    #[test]
    fn deployment_from_env_value() {
        assert_eq!(Deployment::from_env_value("production"), Deployment::Production);
        assert_eq!(Deployment::from_env_value(" PRODUCTION "), Deployment::Production);
        assert_eq!(Deployment::from_env_value("staging"), Deployment::Development);
    }
}
