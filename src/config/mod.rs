//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional) + environment (BACKEND_URL, APP_ENV, ...)
//!     → loader.rs (parse, deserialize, apply env overrides)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → stored in an ArcSwap and read once per request
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → server swaps the new snapshot in
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - The backend origin may be absent; that is a per-request failure, not a startup one

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{
    Deployment, GatewayConfig, IdentityConfig, LimitsConfig, ListenerConfig, ObservabilityConfig,
    TimeoutConfig, UpstreamConfig,
};
