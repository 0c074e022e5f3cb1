//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request headers
//!     → headers.rs (strip hop-by-hop, Host, Content-Length)
//!     → [production] headers.rs (install identity token)
//!     → forwarded
//!
//! Backend response headers
//!     → headers.rs (strip hop-by-hop)
//!     → relayed
//! ```

pub mod headers;

pub use headers::{
    install_identity_token, strip_request_headers, strip_response_headers, HOP_BY_HOP_HEADERS,
    X_FORWARDED_AUTHORIZATION,
};
