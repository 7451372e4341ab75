use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

use kiddo::float::kdtree::KdTree;
use kiddo::SquaredEuclidean;
use tracing::debug;

use crate::error::{Error, Result};
use crate::geo::{euclidean_distance, GeoPoint};

/// Numeric identifier for a road graph node.
pub type NodeId = i64;

/// KD-tree bucket size (kiddo default).
const BUCKET_SIZE: usize = 32;

/// A road graph vertex.
///
/// Identity is the node id alone; the position is payload.
#[derive(Debug, Clone, Copy)]
pub struct GraphNode {
    pub id: NodeId,
    pub position: GeoPoint,
}

impl PartialEq for GraphNode {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for GraphNode {}

impl Hash for GraphNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Directed edge with its Euclidean weight fixed at insertion time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connection {
    pub from: NodeId,
    pub to: NodeId,
    pub weight: f64,
}

/// Road graph keyed by node id.
///
/// Edges are directed. Providers that model two-way streets must insert both
/// directions (see [`GeoGraph::insert_bidirectional`]). The graph is meant to
/// be filled once at startup and then shared read-only between searches.
#[derive(Default)]
pub struct GeoGraph {
    nodes: HashMap<NodeId, GraphNode>,
    adjacency: HashMap<NodeId, Vec<Connection>>,
    edge_count: usize,
    locator: OnceLock<NodeLocator>,
}

impl GeoGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node. Ids must be unique and coordinates finite.
    pub fn insert_node(&mut self, id: NodeId, position: GeoPoint) -> Result<()> {
        if !position.is_finite() {
            return Err(Error::InvalidCoordinates { id });
        }
        if self.nodes.contains_key(&id) {
            return Err(Error::DuplicateNode { id });
        }
        self.nodes.insert(id, GraphNode { id, position });
        self.adjacency.insert(id, Vec::new());
        self.locator = OnceLock::new();
        Ok(())
    }

    /// Insert the directed edge `from -> to` between two existing nodes and
    /// return its weight. Re-inserting an existing edge is a no-op.
    pub fn insert_edge(&mut self, from: NodeId, to: NodeId) -> Result<f64> {
        let from_position = self
            .position(from)
            .ok_or(Error::MissingEdgeEndpoint {
                from,
                to,
                missing: from,
            })?;
        let to_position = self.position(to).ok_or(Error::MissingEdgeEndpoint {
            from,
            to,
            missing: to,
        })?;

        let weight = euclidean_distance(from_position, to_position);
        let edges = self.adjacency.entry(from).or_default();
        if edges.iter().any(|edge| edge.to == to) {
            return Ok(weight);
        }
        edges.push(Connection { from, to, weight });
        self.edge_count += 1;
        Ok(weight)
    }

    /// Insert `a -> b` and `b -> a`.
    pub fn insert_bidirectional(&mut self, a: NodeId, b: NodeId) -> Result<f64> {
        self.insert_edge(a, b)?;
        self.insert_edge(b, a)
    }

    pub fn node(&self, id: NodeId) -> Option<&GraphNode> {
        self.nodes.get(&id)
    }

    pub fn position(&self, id: NodeId) -> Option<GeoPoint> {
        self.nodes.get(&id).map(|node| node.position)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Outgoing edges of `id`; empty for unknown ids.
    pub fn neighbours(&self, id: NodeId) -> &[Connection] {
        self.adjacency
            .get(&id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Sum of edge weights along `path`, or `None` when two consecutive
    /// nodes are not joined by an edge.
    pub fn path_cost(&self, path: &[NodeId]) -> Option<f64> {
        path.windows(2).try_fold(0.0, |total, pair| {
            self.neighbours(pair[0])
                .iter()
                .find(|edge| edge.to == pair[1])
                .map(|edge| total + edge.weight)
        })
    }

    /// Closest node to `point` by Euclidean distance.
    ///
    /// The KD-tree backing this lookup is built on first use and discarded
    /// whenever a node is inserted.
    pub fn nearest_node(&self, point: GeoPoint) -> Option<NodeId> {
        if self.nodes.is_empty() || !point.is_finite() {
            return None;
        }
        let locator = self.locator.get_or_init(|| NodeLocator::build(&self.nodes));
        locator.nearest(point)
    }
}

impl fmt::Debug for GeoGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeoGraph")
            .field("node_count", &self.nodes.len())
            .field("edge_count", &self.edge_count)
            .finish()
    }
}

/// KD-tree over distinct node positions.
///
/// Coincident nodes share one tree entry owned by the smallest id. A kiddo
/// leaf holds at most `BUCKET_SIZE` items at one point, so duplicates must
/// never reach the tree.
struct NodeLocator {
    tree: KdTree<f64, usize, 2, BUCKET_SIZE, u32>,
    ids: Vec<NodeId>,
}

impl NodeLocator {
    fn build(nodes: &HashMap<NodeId, GraphNode>) -> Self {
        let mut sorted: Vec<NodeId> = nodes.keys().copied().collect();
        // Sorted so that equidistant candidates resolve the same way every run.
        sorted.sort_unstable();

        let mut seen: HashSet<(u64, u64)> = HashSet::with_capacity(sorted.len());
        let mut ids = Vec::with_capacity(sorted.len());
        let mut tree: KdTree<f64, usize, 2, BUCKET_SIZE, u32> = KdTree::new();
        for id in sorted {
            let position = nodes[&id].position;
            if !seen.insert(position_key(position)) {
                continue;
            }
            tree.add(&[position.lon, position.lat], ids.len());
            ids.push(id);
        }

        debug!(
            node_count = nodes.len(),
            distinct_positions = ids.len(),
            "built node locator"
        );
        Self { tree, ids }
    }

    fn nearest(&self, point: GeoPoint) -> Option<NodeId> {
        if self.ids.is_empty() {
            return None;
        }
        let hit = self
            .tree
            .nearest_one::<SquaredEuclidean>(&[point.lon, point.lat]);
        self.ids.get(hit.item).copied()
    }
}

/// Bit pattern of a position with `-0.0` folded into `0.0`.
fn position_key(position: GeoPoint) -> (u64, u64) {
    ((position.lon + 0.0).to_bits(), (position.lat + 0.0).to_bits())
}
