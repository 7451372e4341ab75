use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::geo::GeoPoint;
use crate::graph::{GeoGraph, NodeId};
use crate::path::{find_route_a_star, find_route_dijkstra, PathResult};

/// Supported routing algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RouteAlgorithm {
    /// Dijkstra's algorithm (uniform cost, no heuristic).
    Dijkstra,
    /// A* search guided by straight-line distance.
    #[default]
    #[serde(rename = "a-star")]
    AStar,
}

impl RouteAlgorithm {
    fn search(self, graph: &GeoGraph, start: NodeId, goal: NodeId) -> Option<PathResult> {
        match self {
            RouteAlgorithm::Dijkstra => find_route_dijkstra(graph, start, goal),
            RouteAlgorithm::AStar => find_route_a_star(graph, start, goal),
        }
    }
}

impl fmt::Display for RouteAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            RouteAlgorithm::Dijkstra => "dijkstra",
            RouteAlgorithm::AStar => "a-star",
        };
        f.write_str(value)
    }
}

/// High-level route planning request between two arbitrary points.
#[derive(Debug, Clone, Copy)]
pub struct RouteRequest {
    pub start: GeoPoint,
    pub goal: GeoPoint,
    pub algorithm: RouteAlgorithm,
}

impl RouteRequest {
    /// Convenience constructor for A* routes.
    pub fn a_star(start: GeoPoint, goal: GeoPoint) -> Self {
        Self {
            start,
            goal,
            algorithm: RouteAlgorithm::AStar,
        }
    }
}

/// Planned route returned by the library.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutePlan {
    pub algorithm: RouteAlgorithm,
    /// Graph node the start point snapped to.
    pub start: NodeId,
    /// Graph node the goal point snapped to.
    pub goal: NodeId,
    pub steps: Vec<NodeId>,
    pub cost: f64,
}

impl RoutePlan {
    /// Number of edges traversed.
    pub fn hop_count(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }

    /// Positions of every step, in route order.
    pub fn positions(&self, graph: &GeoGraph) -> Vec<GeoPoint> {
        self.steps
            .iter()
            .filter_map(|&id| graph.position(id))
            .collect()
    }
}

/// Snap both request points to their nearest graph nodes and compute the
/// shortest route between them.
pub fn plan_route(graph: &GeoGraph, request: &RouteRequest) -> Result<RoutePlan> {
    if graph.is_empty() {
        return Err(Error::EmptyGraph);
    }

    let start = snap(graph, request.start)?;
    let goal = snap(graph, request.goal)?;
    debug!(start, goal, algorithm = %request.algorithm, "snapped route endpoints");

    plan_route_between(graph, start, goal, request.algorithm)
}

/// Compute the shortest route between two known node ids.
pub fn plan_route_between(
    graph: &GeoGraph,
    start: NodeId,
    goal: NodeId,
    algorithm: RouteAlgorithm,
) -> Result<RoutePlan> {
    for id in [start, goal] {
        if !graph.contains(id) {
            return Err(Error::UnknownNode { id });
        }
    }

    let Some(result) = algorithm.search(graph, start, goal) else {
        return Err(Error::RouteNotFound { start, goal });
    };

    Ok(RoutePlan {
        algorithm,
        start,
        goal,
        steps: result.nodes,
        cost: result.cost,
    })
}

fn snap(graph: &GeoGraph, point: GeoPoint) -> Result<NodeId> {
    graph
        .nearest_node(point)
        .ok_or(Error::InvalidRoutePoint {
            lon: point.lon,
            lat: point.lat,
        })
}
