//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all API route
//! - Wire up middleware (tracing, request ID)
//! - Hold the hot-swappable configuration snapshot
//! - Dispatch requests to the proxy pipeline and map outcomes to responses
//! - Serve until the shutdown signal fires

use std::sync::Arc;
use std::time::Instant;

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    routing::{get, MethodRouter},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::http::request::{request_id, RequestUuid, X_REQUEST_ID};
use crate::http::response::not_found;
use crate::identity::MetadataTokenProvider;
use crate::observability::metrics;
use crate::proxy::{self, Forwarder, Outcome};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ArcSwap<GatewayConfig>>,
    /// Rebuilt whenever a reload changes the outbound timeouts.
    pub forwarder: Arc<ArcSwap<Forwarder>>,
    pub tokens: MetadataTokenProvider,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: Arc<ArcSwap<GatewayConfig>>,
    forwarder: Arc<ArcSwap<Forwarder>>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, reqwest::Error> {
        let forwarder = Arc::new(ArcSwap::from_pointee(Forwarder::new(&config.timeouts)?));
        let config = Arc::new(ArcSwap::from_pointee(config));

        let state = AppState {
            config: config.clone(),
            forwarder: forwarder.clone(),
            tokens: MetadataTokenProvider::new(),
        };

        Ok(Self {
            router: Self::build_router(state),
            config,
            forwarder,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        let proxy: MethodRouter<AppState> = get(proxy_handler)
            .post(proxy_handler)
            .put(proxy_handler)
            .delete(proxy_handler);

        Router::new()
            .route("/api/v1/", proxy.clone())
            .route("/api/v1/{*path}", proxy)
            .with_state(state)
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, RequestUuid))
    }

    /// The fully layered router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Current configuration snapshot.
    pub fn config(&self) -> Arc<GatewayConfig> {
        self.config.load_full()
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Configurations received on `config_updates` replace the current one
    /// for every request that starts afterwards.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<GatewayConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let config = self.config.clone();
        let forwarder = self.forwarder.clone();
        tokio::spawn(async move {
            while let Some(new_config) = config_updates.recv().await {
                apply_reload(&config, &forwarder, new_config);
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Swap in a reloaded configuration.
///
/// The forwarder is replaced before the config so no request sees new
/// timeouts in the snapshot while still using the old client.
fn apply_reload(
    config: &ArcSwap<GatewayConfig>,
    forwarder: &ArcSwap<Forwarder>,
    new_config: GatewayConfig,
) {
    if new_config.timeouts != config.load().timeouts {
        match Forwarder::new(&new_config.timeouts) {
            Ok(rebuilt) => {
                forwarder.store(Arc::new(rebuilt));
                tracing::info!(
                    connect_timeout_secs = new_config.timeouts.connect_secs,
                    request_timeout_secs = new_config.timeouts.request_secs,
                    "Backend client rebuilt with new timeouts"
                );
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to rebuild backend client, keeping current configuration");
                return;
            }
        }
    }

    tracing::info!(
        backend_configured = new_config.upstream.backend_url.is_some(),
        deployment = ?new_config.deployment,
        "Configuration reloaded"
    );
    config.store(Arc::new(new_config));
}

/// Catch-all handler for `/api/v1/*`.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(request.headers()).to_string();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        "Proxying request"
    );

    match proxy::process(&state, request).await {
        Ok(Outcome::Blocked) => {
            tracing::warn!(request_id = %request_id, path = %path, "Blocked internal namespace");
            metrics::record_request(&method, 404, "blocked", start_time);
            not_found()
        }
        Ok(Outcome::Relayed(response)) => {
            metrics::record_request(&method, response.status().as_u16(), "forwarded", start_time);
            response
        }
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                path = %path,
                kind = e.kind(),
                error = %e,
                "Request failed"
            );
            metrics::record_request(&method, e.status().as_u16(), "error", start_time);
            e.into_response()
        }
    }
}
