//! Graph data providers.
//!
//! A provider hands the library a fully populated [`GeoGraph`] before the
//! first search. Any structural problem in the source data (duplicate ids,
//! edges to unknown nodes) is returned as an error from [`GraphDataProvider::load`]
//! and is meant to stop initialization; nothing downstream attempts to repair
//! a corrupt graph.
//!
//! # Document format
//!
//! ```json
//! {
//!   "nodes": [{"id": 1, "lon": -122.25, "lat": 37.86}],
//!   "edges": [{"from": 1, "to": 2}, {"from": 2, "to": 3, "oneway": true}]
//! }
//! ```
//!
//! Edges are two-way unless `oneway` is set.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::geo::GeoPoint;
use crate::graph::{GeoGraph, NodeId};

/// Source of road graph data.
pub trait GraphDataProvider {
    /// Build the complete graph. Errors are fatal for the caller.
    fn load(&self) -> Result<GeoGraph>;
}

/// Node entry in a [`GraphDocument`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    pub lon: f64,
    pub lat: f64,
}

/// Edge entry in a [`GraphDocument`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub from: NodeId,
    pub to: NodeId,
    #[serde(default)]
    pub oneway: bool,
}

/// Serializable node and edge lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub edges: Vec<EdgeRecord>,
}

impl GraphDocument {
    /// Parse a document from a JSON string.
    pub fn from_json(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Insert every node, then every edge, into a fresh graph.
    pub fn into_graph(self) -> Result<GeoGraph> {
        let mut graph = GeoGraph::new();
        for node in &self.nodes {
            graph.insert_node(node.id, GeoPoint::new(node.lon, node.lat))?;
        }
        for edge in &self.edges {
            if edge.oneway {
                graph.insert_edge(edge.from, edge.to)?;
            } else {
                graph.insert_bidirectional(edge.from, edge.to)?;
            }
        }
        debug!(
            nodes = graph.len(),
            edges = graph.edge_count(),
            "graph document converted"
        );
        Ok(graph)
    }
}

impl GraphDataProvider for GraphDocument {
    fn load(&self) -> Result<GeoGraph> {
        self.clone().into_graph()
    }
}

/// Reads a [`GraphDocument`] from a JSON file on disk.
#[derive(Debug, Clone)]
pub struct JsonGraphProvider {
    path: PathBuf,
}

impl JsonGraphProvider {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl GraphDataProvider for JsonGraphProvider {
    fn load(&self) -> Result<GeoGraph> {
        if !self.path.exists() {
            return Err(Error::GraphDataNotFound {
                path: self.path.clone(),
            });
        }

        info!(path = %self.path.display(), "loading graph data");
        let source = fs::read_to_string(&self.path)?;
        let graph = GraphDocument::from_json(&source)?.into_graph()?;
        info!(
            nodes = graph.len(),
            edges = graph.edge_count(),
            "graph data loaded"
        );
        Ok(graph)
    }
}
