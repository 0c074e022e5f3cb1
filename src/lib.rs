//! Restricted reverse proxy in front of the travel-planning backend API.
//!
//! Forwards `/api/v1/*` to the configured backend while keeping the
//! `internal` namespace unreachable, stripping hop-by-hop headers, and (in
//! production) attaching a fresh service identity token to every request.

pub mod config;
pub mod error;
pub mod http;
pub mod identity;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod routing;
pub mod security;

pub use config::GatewayConfig;
pub use error::{GatewayError, GatewayResult};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
