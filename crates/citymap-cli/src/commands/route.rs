//! Route command handler for computing paths between two coordinates.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use citymap_lib::{
    plan_route, Error as RouteError, GeoGraph, GeoPoint, GraphDataProvider, JsonGraphProvider,
    NodeId, RouteAlgorithm, RoutePlan, RouteRequest,
};

use crate::output::{write_json, write_route_text, OutputFormat};

/// Arguments for the route command.
#[derive(Debug, Clone)]
pub struct RouteCommandArgs {
    pub from: GeoPoint,
    pub to: GeoPoint,
    pub algorithm: RouteAlgorithm,
}

impl RouteCommandArgs {
    pub fn to_request(&self) -> RouteRequest {
        RouteRequest {
            start: self.from,
            goal: self.to,
            algorithm: self.algorithm,
        }
    }
}

/// JSON shape of a route answer. Matches the HTTP service.
#[derive(Debug, Serialize)]
struct RouteOutput {
    found: bool,
    route: Vec<NodeId>,
    cost: f64,
    start: NodeId,
    goal: NodeId,
    algorithm: RouteAlgorithm,
}

impl From<&RoutePlan> for RouteOutput {
    fn from(plan: &RoutePlan) -> Self {
        Self {
            found: true,
            route: plan.steps.clone(),
            cost: plan.cost,
            start: plan.start,
            goal: plan.goal,
            algorithm: plan.algorithm,
        }
    }
}

/// Load the road graph document at `path`.
pub fn load_graph(path: &Path) -> Result<GeoGraph> {
    let graph = JsonGraphProvider::new(path)
        .load()
        .with_context(|| format!("failed to load road graph from {}", path.display()))?;
    tracing::debug!(nodes = graph.len(), edges = graph.edge_count(), "graph loaded");
    Ok(graph)
}

/// Handle the route subcommand.
///
/// An unreachable goal is reported, not treated as a failure.
pub fn handle_route_command<W: Write>(
    graph_path: &Path,
    args: &RouteCommandArgs,
    format: OutputFormat,
    out: &mut W,
) -> Result<()> {
    let graph = load_graph(graph_path)?;

    match plan_route(&graph, &args.to_request()) {
        Ok(plan) => match format {
            OutputFormat::Json => write_json(out, &RouteOutput::from(&plan))?,
            OutputFormat::Text => write_route_text(out, &plan, &graph)?,
        },
        Err(RouteError::RouteNotFound { start, goal }) => match format {
            OutputFormat::Json => write_json(
                out,
                &RouteOutput {
                    found: false,
                    route: Vec::new(),
                    cost: 0.0,
                    start,
                    goal,
                    algorithm: args.algorithm,
                },
            )?,
            OutputFormat::Text => {
                writeln!(out, "No route found from node {} to node {}", start, goal)?
            }
        },
        Err(e) => return Err(anyhow::Error::new(e).context("route planning failed")),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_request_keeps_points_and_algorithm() {
        let args = RouteCommandArgs {
            from: GeoPoint::new(-122.27, 37.87),
            to: GeoPoint::new(-122.26, 37.86),
            algorithm: RouteAlgorithm::Dijkstra,
        };
        let request = args.to_request();
        assert_eq!(request.start, args.from);
        assert_eq!(request.goal, args.to);
        assert_eq!(request.algorithm, RouteAlgorithm::Dijkstra);
    }

    #[test]
    fn missing_graph_file_is_an_error_with_context() {
        let error = load_graph(Path::new("/nonexistent/graph.json")).unwrap_err();
        assert!(format!("{error:#}").contains("failed to load road graph"));
    }
}
