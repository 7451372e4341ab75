//! Route planning and raster query HTTP service.
//!
//! # Endpoints
//!
//! - `GET /route` - shortest route between two coordinates; becomes the current route
//! - `GET /clear_route` - forget the current route
//! - `GET /raster` - tiles covering a viewport, plus the current route in pixels
//! - `GET /tiles/{id}` - tile image bytes (`root`, `<id>` or `<id>.png`)
//! - `GET /metrics` - Prometheus metrics endpoint
//! - `GET /health/live` - liveness probe
//! - `GET /health/ready` - readiness probe

#![deny(warnings)]

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Extension, Router,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use citymap_lib::{
    plan_raster, plan_route, Error as LibError, NodeId, PixelPoint, RasterPlan, RoutePlan, TileId,
};
use citymap_service_shared::{
    cors_layer, from_lib_error, health_live, health_ready, metrics_handler, record_raster_query,
    record_route_calculated, record_route_failed, record_route_nodes, record_tiles_returned,
    AppState, MetricsLayer, ProblemDetails, RasterQuery, RequestId, RouteQuery, ServiceResponse,
    Validate,
};

/// Route answer. An unreachable goal is a normal answer with `found: false`.
#[derive(Debug, Serialize)]
pub struct RouteResponse {
    pub found: bool,
    /// Node ids from start to goal; empty when no route exists.
    pub route: Vec<NodeId>,
    pub cost: f64,
    /// Intersection the start coordinate snapped to.
    pub start: NodeId,
    /// Intersection the end coordinate snapped to.
    pub goal: NodeId,
    pub algorithm: String,
}

impl RouteResponse {
    fn found(plan: &RoutePlan) -> Self {
        Self {
            found: true,
            route: plan.steps.clone(),
            cost: plan.cost,
            start: plan.start,
            goal: plan.goal,
            algorithm: plan.algorithm.to_string(),
        }
    }

    fn unreachable(start: NodeId, goal: NodeId, algorithm: String) -> Self {
        Self {
            found: false,
            route: Vec::new(),
            cost: 0.0,
            start,
            goal,
            algorithm,
        }
    }
}

/// Raster answer, in the field names the map front end reads.
#[derive(Debug, Serialize)]
pub struct RasterResponse {
    pub raster_ul_lon: f64,
    pub raster_ul_lat: f64,
    pub raster_lr_lon: f64,
    pub raster_lr_lat: f64,
    pub raster_width: u32,
    pub raster_height: u32,
    pub depth: u8,
    pub query_success: bool,
    /// Row-major, top row first.
    pub tile_ids: Vec<TileId>,
    pub rows: usize,
    pub columns: usize,
    /// The current route projected into raster pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_overlay: Option<Vec<PixelPoint>>,
}

impl RasterResponse {
    fn new(plan: &RasterPlan, route_overlay: Option<Vec<PixelPoint>>) -> Self {
        Self {
            raster_ul_lon: plan.upper_left.lon,
            raster_ul_lat: plan.upper_left.lat,
            raster_lr_lon: plan.lower_right.lon,
            raster_lr_lat: plan.lower_right.lat,
            raster_width: plan.raster_width,
            raster_height: plan.raster_height,
            depth: plan.depth,
            query_success: plan.success,
            tile_ids: plan.tile_ids(),
            rows: plan.rows,
            columns: plan.columns,
            route_overlay,
        }
    }
}

/// Build the service router over `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/route", get(route_handler))
        .route("/clear_route", get(clear_route_handler))
        .route("/raster", get(raster_handler))
        .route("/tiles/{id}", get(tile_handler))
        .route("/metrics", get(metrics_handler))
        .route("/health/live", get(health_live))
        .route("/health/ready", get(health_ready))
        .layer(TraceLayer::new_for_http())
        .layer(MetricsLayer)
        .layer(cors_layer())
        .with_state(state)
}

fn request_id_of(extension: Option<Extension<RequestId>>) -> String {
    extension
        .map(|Extension(id)| id)
        .unwrap_or_else(RequestId::generate)
        .to_string()
}

/// Handle GET /route requests.
async fn route_handler(
    State(state): State<AppState>,
    request_id: Option<Extension<RequestId>>,
    query: Result<Query<RouteQuery>, QueryRejection>,
) -> Response {
    let request_id = request_id_of(request_id);

    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => {
            record_route_failed("validation_error");
            return ProblemDetails::bad_request(rejection.body_text(), request_id).into_response();
        }
    };

    info!(
        request_id = %request_id,
        start_lon = query.start_lon,
        start_lat = query.start_lat,
        end_lon = query.end_lon,
        end_lat = query.end_lat,
        algorithm = ?query.algorithm,
        "handling route request"
    );

    if let Err(problem) = query.validate(&request_id) {
        record_route_failed("validation_error");
        return (*problem).into_response();
    }

    let request = query.to_request();
    match plan_route(state.graph(), &request) {
        Ok(plan) => {
            let algorithm = plan.algorithm.to_string();
            record_route_calculated(&algorithm);
            record_route_nodes(plan.steps.len(), &algorithm);
            info!(
                request_id = %request_id,
                start = plan.start,
                goal = plan.goal,
                nodes = plan.steps.len(),
                cost = plan.cost,
                "route computed successfully"
            );

            let response = RouteResponse::found(&plan);
            state.set_current_route(Some(plan));
            ServiceResponse::new(response).into_response()
        }
        Err(LibError::RouteNotFound { start, goal }) => {
            record_route_failed("no_path");
            info!(request_id = %request_id, start, goal, "goal is unreachable");

            state.clear_current_route();
            ServiceResponse::new(RouteResponse::unreachable(
                start,
                goal,
                request.algorithm.to_string(),
            ))
            .into_response()
        }
        Err(e) => {
            let reason = match &e {
                LibError::EmptyGraph => "empty_graph",
                LibError::InvalidRoutePoint { .. } => "validation_error",
                _ => "internal_error",
            };
            record_route_failed(reason);
            error!(request_id = %request_id, error = %e, "route planning failed");
            from_lib_error(&e, &request_id).into_response()
        }
    }
}

/// Handle GET /clear_route requests.
async fn clear_route_handler(State(state): State<AppState>) -> ServiceResponse<bool> {
    state.clear_current_route();
    info!("current route cleared");
    ServiceResponse::new(true)
}

/// Handle GET /raster requests.
///
/// A viewport the map cannot answer is reported with `query_success: false`;
/// only an unusable output size is a client error.
async fn raster_handler(
    State(state): State<AppState>,
    request_id: Option<Extension<RequestId>>,
    query: Result<Query<RasterQuery>, QueryRejection>,
) -> Response {
    let request_id = request_id_of(request_id);

    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => {
            return ProblemDetails::bad_request(rejection.body_text(), request_id).into_response();
        }
    };

    if let Err(problem) = query.validate(&request_id) {
        return (*problem).into_response();
    }

    let plan = plan_raster(state.tiles(), &query.to_request(), state.tile_size());
    record_raster_query(plan.success);

    let overlay = if plan.success {
        record_tiles_returned(plan.tiles.len(), plan.depth);
        state
            .current_route()
            .map(|route| plan.route_overlay(&route.positions(state.graph())))
    } else {
        None
    };

    info!(
        request_id = %request_id,
        depth = plan.depth,
        tiles = plan.tiles.len(),
        success = plan.success,
        "raster query answered"
    );

    ServiceResponse::new(RasterResponse::new(&plan, overlay)).into_response()
}

/// Handle GET /tiles/{id} requests.
async fn tile_handler(
    State(state): State<AppState>,
    request_id: Option<Extension<RequestId>>,
    Path(name): Path<String>,
) -> Response {
    let request_id = request_id_of(request_id);

    let Some(raw) = parse_tile_name(&name) else {
        return ProblemDetails::bad_request(
            format!("'{}' is not a tile image id", name),
            request_id,
        )
        .into_response();
    };

    let id = match state.tiles().tile_by_id(raw) {
        Ok(tile) => tile.image_id,
        Err(e) => return from_lib_error(&e, &request_id).into_response(),
    };

    match state.tile_store().tile_bytes(id) {
        Ok(bytes) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "image/png")],
            bytes,
        )
            .into_response(),
        Err(e) => {
            warn!(request_id = %request_id, tile = %id, error = %e, "tile image unavailable");
            from_lib_error(&e, &request_id).into_response()
        }
    }
}

/// Accepts `root`, a numeric image id, either optionally suffixed `.png`.
fn parse_tile_name(name: &str) -> Option<u64> {
    let stem = name.strip_suffix(".png").unwrap_or(name);
    if stem == "root" {
        return Some(TileId::ROOT.value());
    }
    stem.parse().ok()
}
