//! Wiki Mediator - a caching mediator service for wiki queries
//!
//! Serves line-delimited JSON requests over TCP, answering from bounded
//! time-expiring caches and falling back to en.wikipedia.org on misses.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wiki_mediator::backend::WikipediaBackend;
use wiki_mediator::{
    spawn_roll_task, spawn_sweep_task, Config, ConnectionDispatcher, WikiMediator,
};

/// Main entry point for the Wiki Mediator server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the mediator over the Wikipedia backend
/// 4. Start background sweep tasks (one per cache) and the statistics roll
/// 5. Bind the connection dispatcher on the configured port
/// 6. Serve until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wiki_mediator=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Wiki Mediator Server");

    // Load configuration from environment variables
    let config = Config::from_env();
    info!(
        "Configuration loaded: port={}, max_connections={}, cache_capacity={}, cache_timeout={}s",
        config.server_port, config.max_connections, config.cache_capacity, config.cache_timeout
    );

    let mediator = Arc::new(WikiMediator::new(
        Arc::new(WikipediaBackend::new()),
        &config,
    ));
    info!("Mediator initialized against en.wikipedia.org");

    // Background tasks: one sweep per cache plus the statistics roll
    let tasks: Vec<JoinHandle<()>> = vec![
        spawn_sweep_task(mediator.search_cache(), config.sweep_interval),
        spawn_sweep_task(mediator.page_cache(), config.sweep_interval),
        spawn_sweep_task(mediator.connected_cache(), config.sweep_interval),
        spawn_sweep_task(mediator.path_cache(), config.sweep_interval),
        spawn_roll_task(mediator.stats()),
    ];
    info!("Background sweep and roll tasks started");

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let dispatcher = ConnectionDispatcher::bind(addr, mediator, config.max_connections)
        .await
        .context("failed to bind dispatcher")?;
    info!("Server listening on {}", addr);

    tokio::select! {
        result = dispatcher.serve() => {
            result.context("dispatcher terminated")?;
        }
        _ = shutdown_signal() => {}
    }

    for task in tasks {
        task.abort();
    }
    warn!("Background tasks aborted");
    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
