//! Test utilities for handler testing.
//!
//! Fixtures live under `docs/fixtures/` at the workspace root: a ten-node
//! road graph and a handful of tiny tile images.

use std::path::PathBuf;

use citymap_lib::{FsTileStore, GraphDataProvider, JsonGraphProvider, MapExtent, TileIndex};
use citymap_lib::{DEFAULT_MAX_DEPTH, TILE_SIZE};

use crate::config::ServiceConfig;
use crate::state::AppState;

pub const TEST_GRAPH_PATH: &str =
    concat!(env!("CARGO_MANIFEST_DIR"), "/../../docs/fixtures/graph.json");

pub const TEST_TILE_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../docs/fixtures/img");

pub fn fixture_graph_path() -> PathBuf {
    PathBuf::from(TEST_GRAPH_PATH)
}

pub fn fixture_tile_dir() -> PathBuf {
    PathBuf::from(TEST_TILE_DIR)
}

/// Configuration pointing at the fixtures.
pub fn test_config() -> ServiceConfig {
    ServiceConfig {
        graph_path: fixture_graph_path(),
        tile_dir: fixture_tile_dir(),
        ..ServiceConfig::default()
    }
}

/// Build a fresh `AppState` over the fixtures.
///
/// Each call gets its own current-route slot, so tests that set a route do
/// not leak it into each other.
///
/// # Panics
///
/// Panics if the fixture graph cannot be loaded.
pub fn test_state() -> AppState {
    let path = fixture_graph_path();
    let graph = JsonGraphProvider::new(&path)
        .load()
        .unwrap_or_else(|e| panic!("failed to load test fixture from {:?}: {}", path, e));
    let tiles = TileIndex::build(&MapExtent::default(), DEFAULT_MAX_DEPTH)
        .unwrap_or_else(|e| panic!("failed to build test tile index: {}", e));

    AppState::from_components(
        graph,
        tiles,
        Box::new(FsTileStore::new(fixture_tile_dir())),
        TILE_SIZE,
    )
}

/// Intersections in the fixture graph.
///
/// Nodes 1 to 9 form a three by three street grid, numbered row by row from
/// the north-west corner. The street from 5 to 6 is one-way.
pub mod fixture_nodes {
    pub const NORTH_WEST: i64 = 1;
    pub const SOUTH_EAST: i64 = 9;
    /// No streets at all.
    pub const ISOLATED: i64 = 10;
}

/// Generate a unique request ID for testing.
pub fn test_request_id() -> String {
    crate::middleware::RequestId::generate().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_paths_exist() {
        assert!(fixture_graph_path().is_file());
        assert!(fixture_tile_dir().join("root.png").is_file());
    }

    #[test]
    fn test_state_loads_successfully() {
        let state = test_state();
        assert_eq!(state.graph().len(), 10);
        assert_eq!(state.tiles().max_depth(), DEFAULT_MAX_DEPTH);
        assert!(state.graph().node(fixture_nodes::ISOLATED).is_some());
    }

    #[test]
    fn test_config_loads_the_same_fixture() {
        let state = AppState::load(&test_config()).unwrap();
        assert_eq!(state.graph().len(), test_state().graph().len());
    }

    #[test]
    fn test_request_id_unique() {
        assert_ne!(test_request_id(), test_request_id());
    }
}
