//! Path segment decoding and normalization.
//!
//! # Responsibilities
//! - Split the raw routed path into segments
//! - Percent-decode each segment exactly once, rejecting malformed escapes
//! - Trim whitespace and slashes, drop segments that end up empty
//!
//! # Design Decisions
//! - Decoding happens before trimming so `%2Finternal` becomes `internal`
//! - One bad segment fails the whole path (no partial forwarding)

use std::borrow::Cow;
use std::fmt;

use thiserror::Error;

/// A path segment could not be percent-decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// A `%` not followed by two hex digits.
    #[error("malformed percent-encoding in path segment at byte {offset}")]
    MalformedEscape { segment: String, offset: usize },

    /// Escapes decode to bytes that are not UTF-8.
    #[error("path segment does not decode to valid UTF-8")]
    InvalidUtf8 { segment: String },
}

/// Decoded, trimmed, non-empty path segments.
///
/// Never contains an empty segment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NormalizedPath {
    segments: Vec<String>,
}

impl NormalizedPath {
    /// Normalize raw segments as delivered by the router.
    pub fn from_raw<'a, I>(raw: I) -> Result<Self, DecodeError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut segments = Vec::new();
        for segment in raw {
            let decoded = decode_segment(segment)?;
            let cleaned = clean_segment(&decoded);
            if !cleaned.is_empty() {
                segments.push(cleaned.to_string());
            }
        }
        Ok(Self { segments })
    }

    /// Normalize the `/`-separated remainder of a request path.
    pub fn parse(raw_path: &str) -> Result<Self, DecodeError> {
        Self::from_raw(raw_path.split('/'))
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn first(&self) -> Option<&str> {
        self.segments.first().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Segments joined with `/`.
    pub fn join(&self) -> String {
        self.segments.join("/")
    }
}

impl fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.join())
    }
}

/// Percent-decode a single segment.
///
/// Unlike a lenient decoder, a stray `%` is an error rather than a literal.
pub fn decode_segment(raw: &str) -> Result<String, DecodeError> {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let well_formed = i + 2 < bytes.len()
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit();
            if !well_formed {
                return Err(DecodeError::MalformedEscape {
                    segment: raw.to_string(),
                    offset: i,
                });
            }
            i += 3;
        } else {
            i += 1;
        }
    }

    urlencoding::decode(raw)
        .map(Cow::into_owned)
        .map_err(|_| DecodeError::InvalidUtf8 {
            segment: raw.to_string(),
        })
}

/// Strip surrounding whitespace and slashes.
///
/// Both are removed together, so `" / internal / "` reduces to `internal`.
pub fn clean_segment(decoded: &str) -> &str {
    decoded.trim_matches(|c: char| c.is_whitespace() || c == '/')
}
