//! Path handling subsystem.
//!
//! # Data Flow
//! ```text
//! Raw path after /api/v1/ (undecoded, untrusted)
//!     → normalize.rs (decode once, trim, drop empties)
//!     → guard.rs (internal namespace? → 404)
//!     → target.rs (origin + /api/v1/ + segments + query)
//!     → guard.rs again on the built URL
//! ```
//!
//! # Design Decisions
//! - The router hands over the raw path; nothing decodes before normalize.rs
//! - Reserved names and prefixes are constants, not configuration

pub mod guard;
pub mod normalize;
pub mod target;

pub use guard::{blocks_path, blocks_target, INTERNAL_NAMESPACE};
pub use normalize::{DecodeError, NormalizedPath};
pub use target::{TargetUrl, API_PREFIX};
