//! Serve command - Run the Logtide server
//!
//! HTTP ingest and export service over one ClickHouse log table.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use logtide_api::{AppState, build_router};
use logtide_config::Config;
use logtide_export::{ExportCoordinator, ExportOptions, TempRegistry, sweep_orphans};
use logtide_ingest::{IngestCoordinator, IngestOptions};
use logtide_store::LogStore;

use crate::cmd::{load_config, store_config};

/// Serve command arguments
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Path to configuration file (defaults to configs/logtide.toml if not specified)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Run the serve command
pub async fn run(args: ServeArgs) -> Result<()> {
    let config_path = args
        .config
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(default)".to_string());

    info!(
        version = env!("CARGO_PKG_VERSION"),
        platform = std::env::consts::OS,
        arch = std::env::consts::ARCH,
        config = %config_path,
        "Logtide starting"
    );

    let config = load_config(args.config)?;

    if let Err(e) = run_server(config).await {
        error!(error = %e, "server error");
        return Err(e);
    }

    info!("Logtide shutdown complete");
    Ok(())
}

/// Main server run loop
async fn run_server(config: Config) -> Result<()> {
    let store = LogStore::new(&store_config(&config)).context("failed to open log store")?;

    // The store only needs to be up once traffic arrives, so a failed
    // ping is worth a warning but not a refusal to start.
    if let Err(e) = store.ping().await {
        warn!(error = %e, url = %config.store.url, "store not reachable at startup");
    }

    let temp_dir = config
        .export
        .temp_dir
        .clone()
        .unwrap_or_else(std::env::temp_dir);

    // Crash leftovers from previous runs
    match sweep_orphans(&temp_dir) {
        Ok(0) => {}
        Ok(removed) => info!(files = removed, "removed orphaned export temp files"),
        Err(e) => warn!(
            path = %temp_dir.display(),
            error = %e,
            "could not sweep export temp directory"
        ),
    }

    let registry = Arc::new(TempRegistry::new());

    let ingest = IngestCoordinator::new(
        store.clone(),
        IngestOptions {
            poll_interval: config.ingest.poll_interval,
            poll_timeout: config.ingest.poll_timeout,
        },
    );
    let exports = ExportCoordinator::new(
        store.clone(),
        Arc::clone(&registry),
        ExportOptions {
            row_limit_threshold: config.export.row_limit_threshold,
            temp_dir,
            batch_rows: config.export.batch_rows,
        },
    );

    let app = build_router(AppState::new(store, ingest, exports))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    let addr = config.server.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .context("failed to bind API server")?;

    info!(addr = %addr, table = %config.store.table, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown())
        .await
        .context("server error")?;

    // In-flight export temp files go with the server
    let swept = registry.sweep();
    if swept > 0 {
        info!(files = swept, "removed in-flight export temp files");
    }

    Ok(())
}

/// Wait for SIGINT or SIGTERM
async fn wait_for_shutdown() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
