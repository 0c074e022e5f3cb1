//! Service identity subsystem.
//!
//! # Data Flow
//! ```text
//! Production request with target URL
//!     → audience = backend origin (scheme://host[:port])
//!     → metadata.rs (GET metadata server, Metadata-Flavor: Google)
//!     → IdentityToken (used once, then dropped)
//!     → security::headers installs it as Authorization
//! ```
//!
//! # Design Decisions
//! - A token is fetched per forwarded request and never cached
//! - Every failure maps to a Token error, answered with 502

pub mod metadata;

use axum::http::StatusCode;
use thiserror::Error;

pub use metadata::{MetadataTokenProvider, METADATA_FLAVOR};

/// Failure to obtain an identity token.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The metadata server answered with a non-success status.
    #[error("metadata server returned {0}")]
    Fetch(StatusCode),

    /// The metadata server answered 2xx with an empty body.
    #[error("metadata server returned an empty token")]
    Empty,

    /// The metadata server could not be reached or read.
    #[error("metadata server unreachable: {0}")]
    Unreachable(String),

    /// The token cannot be carried in an HTTP header.
    #[error("identity token is not a valid header value")]
    InvalidHeader,
}

/// Opaque bearer token asserting the gateway's own identity.
#[derive(Clone, PartialEq, Eq)]
pub struct IdentityToken(String);

impl IdentityToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Tokens must never end up in logs.
impl std::fmt::Debug for IdentityToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "IdentityToken(<{} bytes>)", self.0.len())
    }
}
