use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap, HashSet};

use priority_queue::PriorityQueue;
use tracing::debug;

use crate::geo::euclidean_distance;
use crate::graph::{GeoGraph, NodeId};

/// Outcome of a successful search.
#[derive(Debug, Clone, PartialEq)]
pub struct PathResult {
    /// Node ids from start to goal, both inclusive.
    pub nodes: Vec<NodeId>,
    /// Sum of edge weights along `nodes`.
    pub cost: f64,
    /// Number of nodes settled before the goal was reached.
    pub explored: usize,
}

/// Find the shortest route between `start` and `goal` using A*.
pub fn find_route(graph: &GeoGraph, start: NodeId, goal: NodeId) -> Option<PathResult> {
    find_route_a_star(graph, start, goal)
}

/// Run A* search guided by the straight-line distance to the goal.
///
/// Edge weights are themselves Euclidean distances, so the heuristic is
/// admissible and consistent and the first time the goal leaves the frontier
/// its cost is optimal. Returns `None` when either id is unknown or the goal
/// is unreachable; a partial path is never returned.
///
/// All scratch state (costs, predecessors, frontier, closed set) belongs to
/// this call, so concurrent searches over a shared graph do not interfere.
pub fn find_route_a_star(graph: &GeoGraph, start: NodeId, goal: NodeId) -> Option<PathResult> {
    let goal_position = graph.position(goal)?;
    if !graph.contains(start) {
        return None;
    }
    if start == goal {
        return Some(PathResult {
            nodes: vec![start],
            cost: 0.0,
            explored: 0,
        });
    }

    let heuristic = |node: NodeId| -> f64 {
        graph
            .position(node)
            .map_or(0.0, |position| euclidean_distance(position, goal_position))
    };

    let mut context = SearchContext::new(start);
    let mut closed: HashSet<NodeId> = HashSet::new();
    let mut frontier = Frontier::new();
    frontier.push(start, frontier_key(start, heuristic(start)));

    while let Some((current, _)) = frontier.pop() {
        closed.insert(current);

        if current == goal {
            debug!(start, goal, explored = closed.len(), "a* reached goal");
            return Some(context.into_result(start, goal, closed.len()));
        }

        let current_cost = context.cost(current);
        for edge in graph.neighbours(current) {
            if closed.contains(&edge.to) {
                continue;
            }
            let tentative = current_cost + edge.weight;
            if tentative < context.cost(edge.to) {
                context.record(edge.to, tentative, current);
                // Raises the key only when the new f-score is lower.
                let key = frontier_key(edge.to, tentative + heuristic(edge.to));
                frontier.push_increase(edge.to, key);
            }
        }
    }

    debug!(start, goal, explored = closed.len(), "a* frontier exhausted");
    None
}

/// Run Dijkstra's algorithm, i.e. uniform-cost search without a heuristic.
///
/// Kept as an independent oracle for the A* search and as a selectable
/// algorithm for callers.
pub fn find_route_dijkstra(graph: &GeoGraph, start: NodeId, goal: NodeId) -> Option<PathResult> {
    if !graph.contains(start) || !graph.contains(goal) {
        return None;
    }
    if start == goal {
        return Some(PathResult {
            nodes: vec![start],
            cost: 0.0,
            explored: 0,
        });
    }

    let mut context = SearchContext::new(start);
    let mut settled = 0usize;
    let mut queue = BinaryHeap::new();
    queue.push(QueueEntry::new(start, 0.0));

    while let Some(entry) = queue.pop() {
        let current_cost = context.cost(entry.node);
        // Stale entry left behind by a later improvement.
        if entry.cost.0 > current_cost {
            continue;
        }
        settled += 1;

        if entry.node == goal {
            return Some(context.into_result(start, goal, settled));
        }

        for edge in graph.neighbours(entry.node) {
            let next_cost = current_cost + edge.weight;
            if next_cost < context.cost(edge.to) {
                context.record(edge.to, next_cost, entry.node);
                queue.push(QueueEntry::new(edge.to, next_cost));
            }
        }
    }

    None
}

/// Per-search side table keyed by node id.
struct SearchContext {
    entries: HashMap<NodeId, SearchEntry>,
}

#[derive(Debug, Clone, Copy)]
struct SearchEntry {
    cost: f64,
    predecessor: Option<NodeId>,
}

impl SearchContext {
    fn new(start: NodeId) -> Self {
        let mut entries = HashMap::new();
        entries.insert(
            start,
            SearchEntry {
                cost: 0.0,
                predecessor: None,
            },
        );
        Self { entries }
    }

    fn cost(&self, node: NodeId) -> f64 {
        self.entries
            .get(&node)
            .map_or(f64::INFINITY, |entry| entry.cost)
    }

    fn record(&mut self, node: NodeId, cost: f64, predecessor: NodeId) {
        self.entries.insert(
            node,
            SearchEntry {
                cost,
                predecessor: Some(predecessor),
            },
        );
    }

    fn into_result(self, start: NodeId, goal: NodeId, explored: usize) -> PathResult {
        let cost = self.cost(goal);
        let mut nodes = Vec::new();
        let mut current = Some(goal);
        while let Some(node) = current {
            nodes.push(node);
            if node == start {
                break;
            }
            current = self.entries.get(&node).and_then(|entry| entry.predecessor);
        }
        nodes.reverse();
        PathResult {
            nodes,
            cost,
            explored,
        }
    }
}

/// A* open set. `PriorityQueue` pops the greatest priority, so the key is
/// reversed: lowest f-score first, then lowest node id.
type Frontier = PriorityQueue<NodeId, Reverse<(FloatOrd, NodeId)>>;

fn frontier_key(node: NodeId, priority: f64) -> Reverse<(FloatOrd, NodeId)> {
    Reverse((FloatOrd(priority), node))
}

#[derive(Copy, Clone, Debug, Default)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq(&other.0)
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct QueueEntry {
    node: NodeId,
    cost: FloatOrd,
}

impl QueueEntry {
    fn new(node: NodeId, cost: f64) -> Self {
        Self {
            node,
            cost: FloatOrd(cost),
        }
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap becomes a min-heap by cost.
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
