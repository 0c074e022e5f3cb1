//! Request forwarding subsystem.
//!
//! # Responsibilities
//! - Drive a request through normalization, guarding and header sanitation
//! - Acquire an identity token in production
//! - Forward once and relay the backend response
//!
//! # Design Decisions
//! - No retries, no caching, no redirect following
//! - Non-GET/HEAD bodies are buffered (bounded by `limits.max_body_bytes`)
//! - Responses are streamed back unbuffered

pub mod forward;
pub mod pipeline;

pub use forward::{ForwardRequest, Forwarder};
pub use pipeline::{process, Outcome};
