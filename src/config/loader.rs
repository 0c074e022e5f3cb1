//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{Deployment, GatewayConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable holding the backend origin.
pub const ENV_BACKEND_URL: &str = "BACKEND_URL";
/// Environment variable selecting the deployment mode.
pub const ENV_APP_ENV: &str = "APP_ENV";
/// Environment variable overriding the listener address.
pub const ENV_BIND_ADDRESS: &str = "GATEWAY_BIND_ADDRESS";
/// Environment variable overriding the metadata endpoint.
pub const ENV_METADATA_URL: &str = "METADATA_URL";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file, then apply environment overrides.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let mut config: GatewayConfig = toml::from_str(&content)?;

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Build a configuration from defaults and the process environment only.
pub fn from_env() -> Result<GatewayConfig, ConfigError> {
    let mut config = GatewayConfig::default();
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Overlay environment values onto a configuration.
///
/// Empty values are ignored so an exported-but-blank `BACKEND_URL` still
/// counts as missing.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(url) = non_empty(ENV_BACKEND_URL) {
        config.upstream.backend_url = Some(url.trim().to_string());
    }
    if let Some(env) = non_empty(ENV_APP_ENV) {
        config.deployment = Deployment::from_env_value(&env);
    }
    if let Some(addr) = non_empty(ENV_BIND_ADDRESS) {
        config.listener.bind_address = addr;
    }
    if let Some(url) = non_empty(ENV_METADATA_URL) {
        config.identity.metadata_url = url;
    }
}
