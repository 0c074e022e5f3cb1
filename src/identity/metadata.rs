//! Identity tokens from the platform metadata server.

use std::time::Duration;

use axum::body::Body;
use axum::http::{header, HeaderName, Method, Request};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::time;
use url::Url;

use crate::config::IdentityConfig;
use crate::identity::{IdentityToken, TokenError};
use crate::observability::metrics;

/// Header that marks a request as coming from a metadata client.
pub const METADATA_FLAVOR: HeaderName = HeaderName::from_static("metadata-flavor");

const METADATA_FLAVOR_VALUE: &str = "Google";

/// Upper bound on a token response body.
const MAX_TOKEN_BYTES: usize = 64 * 1024;

/// Fetches a fresh identity token for every call.
#[derive(Clone)]
pub struct MetadataTokenProvider {
    client: Client<HttpConnector, Body>,
}

impl MetadataTokenProvider {
    pub fn new() -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self { client }
    }

    /// Request a token bound to `audience`.
    pub async fn fetch(&self, config: &IdentityConfig, audience: &str) -> Result<IdentityToken, TokenError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let result = match time::timeout(timeout, self.fetch_inner(&config.metadata_url, audience)).await {
            Ok(result) => result,
            Err(_) => Err(TokenError::Unreachable(format!(
                "timed out after {}s",
                config.timeout_secs
            ))),
        };

        metrics::record_token_fetch(result.is_ok());
        result
    }

    async fn fetch_inner(&self, metadata_url: &str, audience: &str) -> Result<IdentityToken, TokenError> {
        let mut url = Url::parse(metadata_url)
            .map_err(|e| TokenError::Unreachable(format!("invalid metadata URL: {e}")))?;
        url.query_pairs_mut()
            .append_pair("audience", audience)
            .append_pair("format", "full");

        let request = Request::builder()
            .method(Method::GET)
            .uri(url.as_str())
            .header(METADATA_FLAVOR, METADATA_FLAVOR_VALUE)
            .header(header::CACHE_CONTROL, "no-cache")
            .body(Body::empty())
            .map_err(|e| TokenError::Unreachable(format!("failed to build request: {e}")))?;

        let response = self
            .client
            .request(request)
            .await
            .map_err(|e| TokenError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = %status, "Metadata server refused identity token");
            return Err(TokenError::Fetch(status));
        }

        let bytes = axum::body::to_bytes(Body::new(response.into_body()), MAX_TOKEN_BYTES)
            .await
            .map_err(|e| TokenError::Unreachable(format!("failed to read token: {e}")))?;

        let token = String::from_utf8_lossy(&bytes).trim().to_string();
        if token.is_empty() {
            return Err(TokenError::Empty);
        }

        tracing::debug!(audience = %audience, "Identity token acquired");
        Ok(IdentityToken::new(token))
    }
}

impl Default for MetadataTokenProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned response per connection and keep the request heads.
    async fn metadata_server(status_line: &'static str, body: &'static str) -> (SocketAddr, Arc<Mutex<Vec<String>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = vec![0u8; 4096];
                let n = socket.read(&mut buf).await.unwrap_or(0);
                log.lock().unwrap().push(String::from_utf8_lossy(&buf[..n]).to_string());
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_line,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        (addr, seen)
    }

    fn config_for(addr: SocketAddr) -> IdentityConfig {
        IdentityConfig {
            metadata_url: format!("http://{addr}/computeMetadata/v1/instance/service-accounts/default/identity"),
            timeout_secs: 2,
        }
    }

    #[tokio::test]
    async fn returns_trimmed_token_and_sends_contract() {
        let (addr, seen) = metadata_server("200 OK", "  eyJhbGciOi.token \n").await;
        let provider = MetadataTokenProvider::new();

        let token = provider
            .fetch(&config_for(addr), "https://api.example.com")
            .await
            .unwrap();
        assert_eq!(token.as_str(), "eyJhbGciOi.token");

        let requests = seen.lock().unwrap();
        let head = requests[0].to_ascii_lowercase();
        assert!(head.starts_with(
            "get /computemetadata/v1/instance/service-accounts/default/identity?audience=https%3a%2f%2fapi.example.com&format=full "
        ));
        assert!(head.contains("metadata-flavor: google"));
    }

    #[tokio::test]
    async fn non_success_is_fetch_error() {
        let (addr, _) = metadata_server("403 Forbidden", "denied").await;
        let err = MetadataTokenProvider::new()
            .fetch(&config_for(addr), "https://api.example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, TokenError::Fetch(status) if status.as_u16() == 403));
    }

    #[tokio::test]
    async fn blank_body_is_empty_error() {
        let (addr, _) = metadata_server("200 OK", " \n ").await;
        let err = MetadataTokenProvider::new()
            .fetch(&config_for(addr), "https://api.example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, TokenError::Empty));
    }

    #[tokio::test]
    async fn unreachable_server_is_reported() {
        // Bind then drop to get a port nobody listens on.
        let addr = TcpListener::bind("127.0.0.1:0").await.unwrap().local_addr().unwrap();
        let err = MetadataTokenProvider::new()
            .fetch(&config_for(addr), "https://api.example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, TokenError::Unreachable(_)));
    }

    #[tokio::test]
    async fn every_call_fetches_again() {
        let (addr, seen) = metadata_server("200 OK", "token").await;
        let provider = MetadataTokenProvider::new();
        let config = config_for(addr);

        provider.fetch(&config, "https://api.example.com").await.unwrap();
        provider.fetch(&config, "https://api.example.com").await.unwrap();

        assert_eq!(seen.lock().unwrap().len(), 2);
    }
}
