//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, /api/v1/{*path} route)
//!     → request.rs (request ID)
//!     → proxy pipeline (normalize, guard, sanitize, forward)
//!     → response.rs (relay or JSON envelope)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestUuid, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
