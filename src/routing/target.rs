//! Upstream URL construction.

use url::Url;

use crate::error::GatewayError;
use crate::routing::normalize::NormalizedPath;

/// Mount point of the backend API, on both sides of the gateway.
pub const API_PREFIX: &str = "/api/v1/";

/// Fully qualified upstream URL for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetUrl {
    url: Url,
    api_prefix: String,
}

impl TargetUrl {
    /// Compose `origin + /api/v1/ + segments + ?query`.
    ///
    /// Any base path on the origin is kept in front of the API prefix. Runs of
    /// slashes collapse to one and the query is copied as given.
    pub fn build(origin: &str, path: &NormalizedPath, query: Option<&str>) -> Result<Self, GatewayError> {
        let mut url = Url::parse(origin.trim())
            .map_err(|e| GatewayError::Configuration(format!("invalid backend URL: {e}")))?;

        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(GatewayError::Configuration(
                "backend URL must be an absolute http(s) URL".to_string(),
            ));
        }

        let base = url.path().trim_end_matches('/').to_string();
        let api_prefix = collapse_slashes(&format!("{base}{API_PREFIX}"));
        let full_path = collapse_slashes(&format!("{api_prefix}{}", path.join()));

        url.set_path(&full_path);
        url.set_query(query);
        url.set_fragment(None);

        Ok(Self { url, api_prefix })
    }

    pub fn as_url(&self) -> &Url {
        &self.url
    }

    /// Path prefix every public target must stay under.
    pub fn api_prefix(&self) -> &str {
        &self.api_prefix
    }

    /// Scheme, host and non-default port of the backend, e.g. `https://api.example.com`.
    pub fn audience(&self) -> String {
        self.url.origin().ascii_serialization()
    }
}

impl std::fmt::Display for TargetUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.url)
    }
}

fn collapse_slashes(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut previous_slash = false;
    for c in path.chars() {
        if c == '/' {
            if !previous_slash {
                out.push(c);
            }
            previous_slash = true;
        } else {
            out.push(c);
            previous_slash = false;
        }
    }
    out
}
