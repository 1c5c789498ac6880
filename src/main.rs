//! Movie Catalog - A TMDb-backed movie catalog service
//!
//! Server binary: loads configuration, wires the store, the upstream client
//! and the catalog, then serves the HTTP API.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use movie_catalog::cache::MemoryStore;
use movie_catalog::tasks::{fetch_missing_details, populate, warm_popular_caches};
use movie_catalog::tmdb::{MovieFetcher, TmdbClient};
use movie_catalog::{create_router, spawn_cleanup_task, AppState, Config};

/// Main entry point for the movie catalog server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the store and the upstream client
/// 4. Optionally sync the catalog and warm the cache
/// 5. Start background TTL cleanup task
/// 6. Serve the router until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "movie_catalog=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Movie Catalog Server");

    let config = Config::from_env();
    info!(
        port = config.server_port,
        max_entries = config.max_entries,
        cleanup_interval_secs = config.cleanup_interval.as_secs(),
        tmdb_base_url = %config.tmdb.base_url,
        "Configuration loaded"
    );
    if config.tmdb.api_key.is_empty() {
        warn!("TMDB_API_KEY is not set, upstream requests will fail");
    }

    let store = Arc::new(MemoryStore::new(config.max_entries));
    let upstream: Arc<dyn MovieFetcher> = Arc::new(
        TmdbClient::new(&config.tmdb).context("failed to build the TMDb client")?,
    );
    let state = AppState::with_store(store.clone(), upstream.clone(), &config);

    if config.sync.on_startup {
        // Sync writes go straight to the upstream; the invalidator keeps
        // derived views consistent.
        populate(
            upstream.as_ref(),
            &state.catalog,
            &state.invalidator,
            &config.sync,
        )
        .await;
        fetch_missing_details(
            upstream.as_ref(),
            &state.catalog,
            &state.invalidator,
            config.sync.details_limit,
        )
        .await;
    }

    if config.warm_cache_on_startup {
        warm_popular_caches(state.fetcher.as_ref()).await;
    }

    let cleanup_handle = spawn_cleanup_task(store, config.cleanup_interval);
    info!("Background cleanup task started");

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the cleanup task and allows graceful shutdown.
async fn shutdown_signal(cleanup_handle: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
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

    cleanup_handle.abort();
    warn!("Cleanup task aborted");
}
