//! Internal namespace guard.
//!
//! # Responsibilities
//! - Block paths whose first segment is the reserved `internal` namespace
//! - Re-check the built target URL so nothing slips through URL normalization
//!
//! # Design Decisions
//! - Case-insensitive comparison
//! - The check decodes repeatedly (bounded), so `%252Finternal` is blocked too
//! - A target that no longer sits under the API prefix is treated as blocked

use crate::routing::normalize::{clean_segment, decode_segment, NormalizedPath};
use crate::routing::target::TargetUrl;

/// Reserved first path segment.
pub const INTERNAL_NAMESPACE: &str = "internal";

const MAX_DECODE_PASSES: usize = 8;

/// True if the normalized path addresses the internal namespace.
pub fn blocks_path(path: &NormalizedPath) -> bool {
    path.first().is_some_and(is_internal_segment)
}

/// True if the built target escapes the API prefix or lands in the internal namespace.
pub fn blocks_target(target: &TargetUrl) -> bool {
    let path = target.as_url().path();
    match path.strip_prefix(target.api_prefix()) {
        Some(rest) => is_internal_segment(rest),
        None => true,
    }
}

/// Check one segment, decoding until it stops changing.
///
/// Only the part before the first `/` counts, since a decoded `internal/x`
/// still routes into the namespace once joined into a URL.
pub fn is_internal_segment(segment: &str) -> bool {
    let mut current = segment.to_string();
    for _ in 0..MAX_DECODE_PASSES {
        if leading_component(&current).eq_ignore_ascii_case(INTERNAL_NAMESPACE) {
            return true;
        }
        if !current.contains('%') {
            return false;
        }
        match decode_segment(&current) {
            Ok(next) if next != current => current = next,
            _ => return false,
        }
    }
    leading_component(&current).eq_ignore_ascii_case(INTERNAL_NAMESPACE)
}

fn leading_component(value: &str) -> &str {
    let head = clean_segment(value).split('/').next().unwrap_or_default();
    clean_segment(head)
}
