//! Prometheus metrics.
//!
//! This module provides:
//! - [`MetricsConfig`]: whether metrics are collected
//! - [`init_metrics`]: install the Prometheus recorder
//! - [`metrics_handler`]: axum handler for `/metrics`
//! - business metric helpers for routes and raster queries
//!
//! # Example
//!
//! ```no_run
//! use citymap_service_shared::metrics::{MetricsConfig, init_metrics, metrics_handler};
//! use axum::{Router, routing::get};
//!
//! init_metrics(&MetricsConfig::default()).expect("failed to initialize metrics");
//! let app: Router = Router::new().route("/metrics", get(metrics_handler));
//! ```

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

/// Global Prometheus handle for rendering metrics.
static PROMETHEUS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl MetricsConfig {
    /// `METRICS_ENABLED=false` turns collection off; anything else leaves it on.
    pub fn from_env() -> Self {
        let enabled = std::env::var("METRICS_ENABLED")
            .map(|v| !v.eq_ignore_ascii_case("false"))
            .unwrap_or(true);
        Self { enabled }
    }
}

/// Install the Prometheus recorder. Only the first successful call wins.
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    if !config.enabled {
        return Err(MetricsError::Disabled);
    }
    if PROMETHEUS_HANDLE.get().is_some() {
        return Err(MetricsError::AlreadyInitialized);
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| MetricsError::InstallFailed(e.to_string()))?;

    PROMETHEUS_HANDLE
        .set(handle)
        .map_err(|_| MetricsError::AlreadyInitialized)
}

/// Axum handler for the `/metrics` endpoint (Prometheus text format).
pub async fn metrics_handler() -> String {
    PROMETHEUS_HANDLE
        .get()
        .map(|h| h.render())
        .unwrap_or_else(|| "# Metrics not initialized\n".to_string())
}

#[derive(Debug, Clone)]
pub enum MetricsError {
    Disabled,
    AlreadyInitialized,
    InstallFailed(String),
}

impl std::fmt::Display for MetricsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricsError::Disabled => write!(f, "metrics are disabled"),
            MetricsError::AlreadyInitialized => write!(f, "metrics recorder already initialized"),
            MetricsError::InstallFailed(e) => {
                write!(f, "failed to install metrics recorder: {}", e)
            }
        }
    }
}

impl std::error::Error for MetricsError {}

// =============================================================================
// Business Metrics Helpers
// =============================================================================

/// Increments `citymap_routes_calculated_total`.
pub fn record_route_calculated(algorithm: &str) {
    metrics::counter!(
        "citymap_routes_calculated_total",
        "algorithm" => algorithm.to_string()
    )
    .increment(1);
}

/// Increments `citymap_routes_failed_total`.
///
/// `reason` is a short label such as `no_path` or `validation_error`.
pub fn record_route_failed(reason: &str) {
    metrics::counter!(
        "citymap_routes_failed_total",
        "reason" => reason.to_string()
    )
    .increment(1);
}

/// Records the number of intersections on a route to `citymap_route_nodes`.
pub fn record_route_nodes(nodes: usize, algorithm: &str) {
    metrics::histogram!(
        "citymap_route_nodes",
        "algorithm" => algorithm.to_string()
    )
    .record(nodes as f64);
}

/// Increments `citymap_raster_queries_total`, labelled by outcome.
pub fn record_raster_query(success: bool) {
    metrics::counter!(
        "citymap_raster_queries_total",
        "success" => if success { "true" } else { "false" }
    )
    .increment(1);
}

/// Records the tile count of a raster answer to `citymap_tiles_returned`.
pub fn record_tiles_returned(count: usize, depth: u8) {
    metrics::histogram!(
        "citymap_tiles_returned",
        "depth" => depth.to_string()
    )
    .record(count as f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_config_default() {
        assert!(MetricsConfig::default().enabled);
    }

    #[test]
    fn test_disabled_metrics_are_not_installed() {
        let result = init_metrics(&MetricsConfig { enabled: false });
        assert!(matches!(result, Err(MetricsError::Disabled)));
    }

    #[test]
    fn test_metrics_handler_returns_prometheus_format() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let output = rt.block_on(async { metrics_handler().await });

        assert!(
            output.contains('#') || output.is_empty(),
            "metrics output should be Prometheus text or the not-initialized comment"
        );
    }

    #[test]
    fn test_business_metric_helpers_do_not_panic_without_recorder() {
        record_route_calculated("a-star");
        record_route_failed("no_path");
        record_route_nodes(12, "dijkstra");
        record_raster_query(true);
        record_raster_query(false);
        record_tiles_returned(9, 7);
    }

    #[test]
    fn test_metrics_error_display() {
        assert_eq!(MetricsError::Disabled.to_string(), "metrics are disabled");
        assert_eq!(
            MetricsError::AlreadyInitialized.to_string(),
            "metrics recorder already initialized"
        );
        assert!(MetricsError::InstallFailed("boom".to_string())
            .to_string()
            .contains("boom"));
    }
}
