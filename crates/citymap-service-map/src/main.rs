//! citymap HTTP service binary.
//!
//! # Configuration
//!
//! - `CITYMAP_GRAPH_PATH` - road graph JSON document (default: `/data/graph.json`)
//! - `CITYMAP_TILE_DIR` - tile image directory (default: `/data/img`)
//! - `CITYMAP_MAX_DEPTH` - deepest tile level (default: 7)
//! - `CITYMAP_TILE_SIZE` - tile edge in pixels (default: 256)
//! - `SERVICE_PORT` - HTTP port (default: 8080)
//! - `RUST_LOG` - Log level (default: info)
//! - `LOG_FORMAT` - Log format: json (default) or text
//! - `METRICS_ENABLED` - set to `false` to skip the Prometheus recorder

use std::net::SocketAddr;

use tracing::{error, info};

use citymap_service_shared::{
    init_logging, init_metrics, AppState, LoggingConfig, MetricsConfig, ServiceConfig,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let logging_config = LoggingConfig::from_env().with_service("map");
    if let Err(e) = init_logging(&logging_config) {
        eprintln!("failed to initialize logging: {e}");
    }

    let metrics_config = MetricsConfig::from_env();
    if let Err(e) = init_metrics(&metrics_config) {
        tracing::warn!(error = %e, "failed to initialize metrics, continuing without metrics");
    }

    let config = ServiceConfig::from_env();
    info!(
        graph_path = %config.graph_path.display(),
        tile_dir = %config.tile_dir.display(),
        max_depth = config.max_depth,
        port = config.port,
        "starting map service"
    );

    let state = AppState::load(&config).map_err(|e| {
        error!(error = %e, path = %config.graph_path.display(), "failed to load application state");
        e
    })?;
    info!(state = ?state, "application state loaded");

    let app = citymap_service_map::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(addr = %addr, "listening on");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("map service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
