//! Breakerboard Server: live circuit breaker metrics for dashboards.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, fmt};

use breakerboard_api::{AppState, build_router};
use breakerboard_core::config::AppConfig;
use breakerboard_core::error::AppError;
use breakerboard_core::traits::SystemClock;
use breakerboard_store::StoreManager;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("BREAKERBOARD_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Breakerboard v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Counter store ────────────────────────────────────
    tracing::info!(
        "Initializing counter store (provider: {})...",
        config.store.provider
    );
    let store = Arc::new(StoreManager::new(&config.store).await?);

    // ── Step 2: Stream pipeline + state ──────────────────────────
    let shutdown = CancellationToken::new();
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let state = AppState::build(config, store, Arc::new(SystemClock), shutdown.clone())?;

    // ── Step 3: HTTP server ──────────────────────────────────────
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;
    tracing::info!("Listening on {}", addr);

    let stream_shutdown = shutdown.clone();
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, closing streams...");
        stream_shutdown.cancel();
    });

    let mut server = tokio::spawn(async move { server.await });
    tokio::select! {
        joined = &mut server => return server_result(joined),
        _ = shutdown.cancelled() => {}
    }

    match tokio::time::timeout(grace, server).await {
        Ok(joined) => server_result(joined)?,
        Err(_) => tracing::warn!("Graceful shutdown timed out after {:?}", grace),
    }

    Ok(())
}

/// Flatten the server task's join result
fn server_result(
    joined: Result<std::io::Result<()>, tokio::task::JoinError>,
) -> Result<(), AppError> {
    match joined {
        Ok(Ok(())) => {
            tracing::info!("Server stopped");
            Ok(())
        }
        Ok(Err(e)) => Err(AppError::internal(format!("Server error: {}", e))),
        Err(e) => Err(AppError::internal(format!("Server task failed: {}", e))),
    }
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
