//! Gateway error type.
//!
//! Every failure on the request path becomes one of these variants and is
//! turned into a response in exactly one place, [`IntoResponse`]. Logging is
//! left to the handler, which knows the request ID. Blocking the internal
//! namespace is a policy outcome and is not represented here.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::http::response::detail;
use crate::identity::TokenError;
use crate::routing::DecodeError;

/// Result alias used across the request pipeline.
pub type GatewayResult<T> = Result<T, GatewayError>;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// The backend origin is missing or unusable.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A path segment carries malformed percent-encoding.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// No identity token could be obtained.
    #[error("identity token error: {0}")]
    Token(#[from] TokenError),

    /// The backend could not be reached, or the request body could not be read.
    #[error("transport error: {0}")]
    Transport(String),
}

impl GatewayError {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::Configuration(_) => "configuration",
            GatewayError::Decode(_) => "decode",
            GatewayError::Token(_) => "token",
            GatewayError::Transport(_) => "transport",
        }
    }

    /// Message returned to the caller. Internal details stay in the logs.
    pub fn public_message(&self) -> &'static str {
        match self {
            GatewayError::Configuration(_) => "Backend API is not configured",
            GatewayError::Decode(_) => "Invalid request path encoding",
            GatewayError::Token(_) => "Failed to obtain service identity token",
            GatewayError::Transport(_) => "Failed to reach backend API",
        }
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::BAD_GATEWAY
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        detail(self.status(), self.public_message())
    }
}
