//! metalmap-mv (Map Viewer) - Metal band choropleth map
//!
//! Serves a world map shaded by the number of metal bands per country of
//! origin, with decade, status and subgenre filters, a drill-down band table
//! and band search.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use metalmap_common::config::{resolve_config_path, TomlConfig};
use metalmap_mv::loader::load_into;
use metalmap_mv::{build_router, AppState};

/// Command-line arguments for metalmap-mv
#[derive(Parser, Debug)]
#[command(name = "metalmap-mv")]
#[command(about = "Metal band choropleth map viewer")]
#[command(version)]
struct Args {
    /// Config file (overrides METALMAP_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "METALMAP_PORT")]
    port: Option<u16>,

    /// Band table CSV
    #[arg(long)]
    bands_csv: Option<PathBuf>,

    /// Topology URL or path
    #[arg(long)]
    topology: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = TomlConfig::load_or_default(args.config.as_deref());
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(path) = args.bands_csv {
        config.data.bands_csv = path;
    }
    if let Some(topology) = args.topology {
        config.data.topology = topology;
    }

    // Initialize tracing; RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting Metal Map Viewer (metalmap-mv) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    match resolve_config_path(args.config.as_deref()) {
        Some(path) => info!("Config file: {}", path.display()),
        None => info!("Config file: none (compiled defaults)"),
    }
    info!("Band table: {}", config.data.bands_csv.display());
    info!("Topology: {}", config.data.topology);

    let state = AppState::new(config.ui.clone());

    // Load in the background; data endpoints answer 503 until it completes
    tokio::spawn(load_into(state.clone(), config.data.clone()));

    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("metalmap-mv listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
