//! Travel API gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────────────────┐
//!                    │                       GATEWAY                            │
//!  Client request    │  ┌──────────┐   ┌───────────┐   ┌───────────────┐        │
//!  ──────────────────┼─▶│  http    │──▶│  routing  │──▶│   security    │        │
//!   /api/v1/{*path}  │  │  server  │   │ normalize │   │  strip hop-   │        │
//!                    │  └──────────┘   │ guard/404 │   │  by-hop hdrs  │        │
//!                    │                 │  target   │   └───────┬───────┘        │
//!                    │                 └───────────┘           │                │
//!                    │                              production ▼                │
//!                    │                              ┌───────────────┐           │
//!                    │                              │   identity    │◀──────────┼── metadata
//!                    │                              │ token (fresh) │           │   server
//!                    │                              └───────┬───────┘           │
//!                    │                                      ▼                   │
//!  Client response   │  ┌──────────┐                ┌───────────────┐           │
//!  ◀─────────────────┼──│ response │◀───────────────│    proxy      │◀──────────┼── Backend
//!                    │  │  relay   │                │   forward     │           │   API
//!                    │  └──────────┘                └───────────────┘           │
//!                    └──────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use travel_gateway::config::watcher::ConfigWatcher;
use travel_gateway::lifecycle::{signals, startup, Shutdown};
use travel_gateway::observability::{logging, metrics};
use travel_gateway::HttpServer;

#[derive(Parser)]
#[command(name = "travel-gateway")]
#[command(about = "Restricted reverse proxy for the travel planning API", long_about = None)]
struct Cli {
    /// TOML configuration file. Without it, defaults plus environment variables apply.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = startup::load_configuration(cli.config.as_deref())?;
    logging::init(&config.observability);

    tracing::info!("travel-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    startup::report(&config);

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    // Hot reload only makes sense with a file to watch.
    let (_watcher, config_updates) = match &cli.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path, &config);
            match watcher.run() {
                Ok(handle) => (Some(handle), updates),
                Err(e) => {
                    tracing::warn!(error = %e, "Config watcher unavailable, hot reload disabled");
                    (None, updates)
                }
            }
        }
        None => {
            let (_, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_shutdown_signal().await;
        shutdown.trigger();
    });

    let server = HttpServer::new(config)?;
    server.run(listener, config_updates, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
