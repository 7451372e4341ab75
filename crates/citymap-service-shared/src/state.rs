//! Application state for the HTTP service.
//!
//! The road graph and tile index are loaded once at startup and never change.
//! The only mutable piece is the current route, which `/route` replaces and
//! `/clear_route` resets, and which `/raster` draws over the returned tiles.

use std::sync::{Arc, PoisonError, RwLock};

use citymap_lib::{
    Error as LibError, FsTileStore, GeoGraph, GraphDataProvider, JsonGraphProvider, MapExtent,
    RoutePlan, TileImageStore, TileIndex,
};

use crate::config::ServiceConfig;

/// Error during application state initialization.
#[derive(Debug)]
pub enum AppStateError {
    /// Graph document not found.
    GraphNotFound(String),

    /// Graph document present but unusable (bad JSON, dangling edge, ...).
    GraphLoad(LibError),

    /// Tile index could not be built for the configured depth.
    TileIndex(LibError),
}

impl std::fmt::Display for AppStateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GraphNotFound(path) => write!(f, "graph data not found: {}", path),
            Self::GraphLoad(e) => write!(f, "failed to load graph: {}", e),
            Self::TileIndex(e) => write!(f, "failed to build tile index: {}", e),
        }
    }
}

impl std::error::Error for AppStateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::GraphLoad(e) | Self::TileIndex(e) => Some(e),
            Self::GraphNotFound(_) => None,
        }
    }
}

impl From<LibError> for AppStateError {
    fn from(err: LibError) -> Self {
        match err {
            LibError::GraphDataNotFound { path } => Self::GraphNotFound(path.display().to_string()),
            other => Self::GraphLoad(other),
        }
    }
}

/// Shared application state for all axum handlers.
///
/// Cheap to clone; every clone sees the same graph, tiles and current route.
///
/// # Example
///
/// ```ignore
/// use axum::{Router, routing::get, extract::State};
/// use citymap_service_shared::{AppState, ServiceConfig};
///
/// async fn handler(State(state): State<AppState>) {
///     let graph = state.graph();
///     // ... use graph
/// }
///
/// let state = AppState::load(&ServiceConfig::from_env()).unwrap();
/// let app = Router::new()
///     .route("/route", get(handler))
///     .with_state(state);
/// ```
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    graph: GeoGraph,
    tiles: TileIndex,
    tile_store: Box<dyn TileImageStore>,
    tile_size: u32,
    current_route: RwLock<Option<RoutePlan>>,
}

impl AppState {
    /// Load the graph and build the tile index described by `config`.
    ///
    /// Any structural problem in the graph data is fatal.
    pub fn load(config: &ServiceConfig) -> Result<Self, AppStateError> {
        let graph = JsonGraphProvider::new(&config.graph_path).load()?;
        tracing::info!(
            nodes = graph.len(),
            edges = graph.edge_count(),
            "graph loaded successfully"
        );

        let tiles = TileIndex::build(&MapExtent::default(), config.max_depth)
            .map_err(AppStateError::TileIndex)?;
        tracing::info!(
            max_depth = tiles.max_depth(),
            tiles = tiles.len(),
            "tile index built"
        );

        if !config.tile_dir.is_dir() {
            tracing::warn!(
                path = %config.tile_dir.display(),
                "tile directory not found, tile images will be unavailable"
            );
        }

        Ok(Self::from_components(
            graph,
            tiles,
            Box::new(FsTileStore::new(&config.tile_dir)),
            config.tile_size,
        ))
    }

    /// Create application state from pre-built components.
    pub fn from_components(
        graph: GeoGraph,
        tiles: TileIndex,
        tile_store: Box<dyn TileImageStore>,
        tile_size: u32,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                graph,
                tiles,
                tile_store,
                tile_size,
                current_route: RwLock::new(None),
            }),
        }
    }

    pub fn graph(&self) -> &GeoGraph {
        &self.inner.graph
    }

    pub fn tiles(&self) -> &TileIndex {
        &self.inner.tiles
    }

    pub fn tile_store(&self) -> &dyn TileImageStore {
        self.inner.tile_store.as_ref()
    }

    pub fn tile_size(&self) -> u32 {
        self.inner.tile_size
    }

    /// Snapshot of the most recently computed route, if any.
    pub fn current_route(&self) -> Option<RoutePlan> {
        self.inner
            .current_route
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the current route. `None` clears it.
    pub fn set_current_route(&self, route: Option<RoutePlan>) {
        *self
            .inner
            .current_route
            .write()
            .unwrap_or_else(PoisonError::into_inner) = route;
    }

    pub fn clear_current_route(&self) {
        self.set_current_route(None);
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("node_count", &self.inner.graph.len())
            .field("tile_depth", &self.inner.tiles.max_depth())
            .field("tile_size", &self.inner.tile_size)
            .field("has_current_route", &self.current_route().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use citymap_lib::{GeoPoint, RouteAlgorithm};

    fn minimal_state() -> AppState {
        let mut graph = GeoGraph::new();
        graph
            .insert_node(1, GeoPoint::new(-122.27, 37.87))
            .unwrap();
        graph
            .insert_node(2, GeoPoint::new(-122.26, 37.86))
            .unwrap();
        graph.insert_bidirectional(1, 2).unwrap();
        let tiles = TileIndex::build(&MapExtent::default(), 2).unwrap();
        AppState::from_components(graph, tiles, Box::new(FsTileStore::new("/tmp")), 256)
    }

    fn sample_plan() -> RoutePlan {
        RoutePlan {
            algorithm: RouteAlgorithm::AStar,
            start: 1,
            goal: 2,
            steps: vec![1, 2],
            cost: 0.01,
        }
    }

    #[test]
    fn test_app_state_from_components() {
        let state = minimal_state();
        assert_eq!(state.graph().len(), 2);
        assert_eq!(state.tiles().max_depth(), 2);
        assert_eq!(state.tile_size(), 256);
        assert!(state.current_route().is_none());
    }

    #[test]
    fn test_current_route_is_shared_between_clones() {
        let state1 = minimal_state();
        let state2 = state1.clone();

        state1.set_current_route(Some(sample_plan()));
        assert_eq!(state2.current_route(), Some(sample_plan()));

        state2.clear_current_route();
        assert!(state1.current_route().is_none());
    }

    #[test]
    fn test_app_state_debug() {
        let state = minimal_state();
        let debug = format!("{:?}", state);

        assert!(debug.contains("AppState"));
        assert!(debug.contains("node_count"));
        assert!(debug.contains("has_current_route"));
    }

    #[test]
    fn test_app_state_error_display() {
        let err = AppStateError::GraphNotFound("/path/to/graph.json".to_string());
        assert!(err.to_string().contains("/path/to/graph.json"));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_app_state_load_nonexistent() {
        let config = ServiceConfig {
            graph_path: "/nonexistent/path/to/graph.json".into(),
            ..ServiceConfig::default()
        };

        match AppState::load(&config).unwrap_err() {
            AppStateError::GraphNotFound(path) => {
                assert!(path.contains("nonexistent"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_app_state_rejects_unsupported_depth() {
        let config = ServiceConfig {
            graph_path: crate::test_utils::fixture_graph_path(),
            max_depth: 12,
            ..ServiceConfig::default()
        };

        assert!(matches!(
            AppState::load(&config).unwrap_err(),
            AppStateError::TileIndex(LibError::TileDepthUnsupported { .. })
        ));
    }
}
