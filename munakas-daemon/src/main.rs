//! Munakas Daemon - live CS2 radar broadcaster
//!
//! Polls the telemetry bridge, fans player data out to every connected
//! viewer over WebSocket and serves the radar map catalog on connect.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use munakas_broadcaster::BroadcastHub;
use munakas_daemon::bridge::open_bridge;
use munakas_daemon::catalog::CatalogProvider;
use munakas_daemon::config::DaemonConfig;
use munakas_daemon::server::{router, AppState};
use munakas_daemon::telemetry::TelemetryPoller;
use munakas_maps::MapCatalog;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "munakas-daemon", version, about = "Live CS2 radar broadcaster")]
struct Args {
    /// Path to config.toml (created with defaults if missing)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listen address
    #[arg(short, long)]
    bind: Option<String>,

    /// Override the radar asset directory
    #[arg(short, long)]
    assets: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => DaemonConfig::load_from(path),
        None => DaemonConfig::load(),
    }
    .context("Failed to load configuration")?;

    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(assets) = args.assets {
        config.assets_dir = assets;
    }

    // RUST_LOG wins over the configured level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with_target(false)
        .init();

    info!(
        "🛰️ Starting Munakas Daemon v{} ({})",
        env!("CARGO_PKG_VERSION"),
        option_env!("GIT_COMMIT_HASH").unwrap_or("unknown")
    );
    info!("📋 Configuration loaded from {}", config.config_path.display());

    let hub = Arc::new(BroadcastHub::new(config.queue_capacity, config.write_timeout()));
    hub.start().await.context("Failed to start broadcast hub")?;

    // Telemetry producer; failing to attach is fatal
    let mut bridge = open_bridge(&config.telemetry).context("Failed to open telemetry bridge")?;
    if let Err(e) = bridge.init() {
        error!("❌ Telemetry bridge failed to start: {}", e);
        return Err(e).context("Failed to initialize telemetry bridge");
    }
    info!("🔌 Telemetry source: {:?}", config.telemetry.source);

    let (map_tx, map_rx) = watch::channel(None);
    let poller = TelemetryPoller::new(bridge, hub.publisher(), map_tx, config.poll_interval());
    let stop = Arc::new(AtomicBool::new(false));
    let poller_stop = Arc::clone(&stop);
    let poller_task = tokio::task::spawn_blocking(move || poller.run(&poller_stop));

    if !config.assets_dir.is_dir() {
        warn!("⚠️ Asset directory {} not found; catalog will be empty", config.assets_dir.display());
    }
    let catalog = MapCatalog::with_image_extension(&config.assets_dir, &config.image_extension);
    let state = AppState {
        hub: Arc::clone(&hub),
        catalog: Arc::new(CatalogProvider::new(catalog, config.catalog_mode)),
        current_map: map_rx,
    };
    let app = router(state, &config.ws_path);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!("🚀 Listening on ws://{}{}", config.bind_addr, config.ws_path);

    tokio::select! {
        result = axum::serve(listener, app) => {
            if let Err(e) = result {
                error!("Server error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("🛑 Received shutdown signal");
        }
    }

    info!("🧹 Shutting down...");
    stop.store(true, Ordering::Relaxed);
    if let Err(e) = poller_task.await {
        error!("Telemetry poller panicked: {}", e);
    }
    if let Err(e) = hub.stop().await {
        warn!("Failed to stop broadcast hub: {}", e);
    }

    info!("👋 Munakas daemon stopped");
    Ok(())
}
