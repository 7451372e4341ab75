//! Liveness and readiness handlers.
//!
//! Readiness reports what the service has loaded: the road graph, the tile
//! pyramid and whether a route is currently drawn on rasters.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::AppState;

const SERVICE: &str = env!("CARGO_PKG_NAME");
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    Ok,
    NotReady,
}

/// Size of the loaded road graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GraphSummary {
    pub nodes: usize,
    pub edges: usize,
}

/// Shape of the tile pyramid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TileSummary {
    pub max_depth: u8,
    pub tile_size: u32,
    pub tiles: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub status: HealthState,
    pub service: &'static str,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph: Option<GraphSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tiles: Option<TileSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_active: Option<bool>,
}

impl HealthStatus {
    fn alive() -> Self {
        Self {
            status: HealthState::Ok,
            service: SERVICE,
            version: VERSION,
            reason: None,
            graph: None,
            tiles: None,
            route_active: None,
        }
    }

    /// Readiness of `state`: not ready while the road graph is empty, since
    /// every route query would fail.
    pub fn of(state: &AppState) -> Self {
        let graph = GraphSummary {
            nodes: state.graph().len(),
            edges: state.graph().edge_count(),
        };
        let tiles = TileSummary {
            max_depth: state.tiles().max_depth(),
            tile_size: state.tile_size(),
            tiles: state.tiles().len(),
        };
        let (status, reason) = if graph.nodes == 0 {
            (HealthState::NotReady, Some("road graph is empty".to_string()))
        } else {
            (HealthState::Ok, None)
        };

        Self {
            status,
            reason,
            graph: Some(graph),
            tiles: Some(tiles),
            route_active: Some(state.current_route().is_some()),
            ..Self::alive()
        }
    }
}

/// `GET /health/live`
pub async fn health_live() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthStatus::alive()))
}

/// `GET /health/ready`; 503 while [`HealthStatus::of`] is not ready.
pub async fn health_ready(State(state): State<AppState>) -> Response {
    let status = HealthStatus::of(&state);
    let code = match status.status {
        HealthState::Ok => StatusCode::OK,
        HealthState::NotReady => StatusCode::SERVICE_UNAVAILABLE,
    };
    (code, Json(status)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{fixture_nodes, test_state};
    use citymap_lib::{plan_route_between, RouteAlgorithm};

    #[test]
    fn liveness_carries_no_state() {
        let json = serde_json::to_value(HealthStatus::alive()).unwrap();
        assert_eq!(json["status"], "ok");
        assert!(json.get("graph").is_none());
        assert!(json.get("route_active").is_none());
    }

    #[test]
    fn readiness_summarises_the_fixture() {
        let status = HealthStatus::of(&test_state());
        assert_eq!(status.status, HealthState::Ok);
        assert_eq!(status.graph.map(|g| g.nodes), Some(10));
        let tiles = status.tiles.unwrap();
        assert_eq!(tiles.max_depth, 7);
        assert_eq!(tiles.tile_size, 256);
        assert_eq!(status.route_active, Some(false));
    }

    #[test]
    fn readiness_notices_the_current_route() {
        let state = test_state();
        let plan = plan_route_between(
            state.graph(),
            fixture_nodes::NORTH_WEST,
            fixture_nodes::SOUTH_EAST,
            RouteAlgorithm::AStar,
        )
        .unwrap();
        state.set_current_route(Some(plan));
        assert_eq!(HealthStatus::of(&state).route_active, Some(true));
    }

    #[tokio::test]
    async fn ready_handler_is_ok_for_the_fixture() {
        let response = health_ready(State(test_state())).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
