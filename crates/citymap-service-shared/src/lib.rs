//! Shared infrastructure for the citymap HTTP service.
//!
//! - [`AppState`]: road graph, tile index and the current route
//! - [`ServiceConfig`]: environment-driven startup configuration
//! - [`health`]: liveness and readiness handlers
//! - [`ProblemDetails`]: RFC 9457 error bodies
//! - [`ServiceResponse`]: uncached JSON body for route and raster answers
//! - [`metrics`], [`logging`], [`middleware`]: observability plumbing
//! - Query types with validation for each endpoint
//!
//! Handlers stay thin: parse, validate, call `citymap-lib`, format.
//!
//! The [`test_utils`] module provides fixture-backed state for handler tests.
//! Enable the `test-utils` feature to use it from other crates.

#![deny(warnings)]

pub mod config;
mod health;
pub mod logging;
pub mod metrics;
pub mod middleware;
mod problem;
mod request;
mod response;
mod state;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::ServiceConfig;
pub use health::{
    health_live, health_ready, GraphSummary, HealthState, HealthStatus, TileSummary,
};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use metrics::{
    init_metrics, metrics_handler, record_raster_query, record_route_calculated,
    record_route_failed, record_route_nodes, record_tiles_returned, MetricsConfig, MetricsError,
};
pub use middleware::{cors_layer, extract_or_generate_request_id, MetricsLayer, RequestId};
pub use problem::{
    from_lib_error, ProblemDetails, PROBLEM_INTERNAL_ERROR, PROBLEM_INVALID_REQUEST,
    PROBLEM_ROUTE_NOT_FOUND, PROBLEM_SERVICE_UNAVAILABLE, PROBLEM_TILE_NOT_FOUND,
};
pub use request::{RasterQuery, RouteAlgorithm, RouteQuery, Validate};
pub use response::ServiceResponse;
pub use state::{AppState, AppStateError};
