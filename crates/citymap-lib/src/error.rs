use std::path::PathBuf;

use thiserror::Error;

use crate::graph::NodeId;

/// Convenient result alias for the citymap library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Graph data file could not be located at the resolved path.
    #[error("graph data not found at {path}")]
    GraphDataNotFound { path: PathBuf },

    /// Raised when the same node id is supplied twice while loading.
    #[error("duplicate node id {id} in graph data")]
    DuplicateNode { id: NodeId },

    /// Raised when an edge references a node that was never inserted.
    #[error("edge {from} -> {to} references missing node {missing}")]
    MissingEdgeEndpoint {
        from: NodeId,
        to: NodeId,
        missing: NodeId,
    },

    /// Raised when a node carries coordinates that cannot be used for distances.
    #[error("node {id} has non-finite coordinates")]
    InvalidCoordinates { id: NodeId },

    /// Raised when a route endpoint is not a usable coordinate.
    #[error("invalid route point ({lon}, {lat})")]
    InvalidRoutePoint { lon: f64, lat: f64 },

    /// Raised when a route is requested on a graph without nodes.
    #[error("graph contains no nodes")]
    EmptyGraph,

    /// Raised when a node id could not be found in the graph.
    #[error("unknown node id: {id}")]
    UnknownNode { id: NodeId },

    /// Raised when no route could be found between two nodes.
    #[error("no route found between {start} and {goal}")]
    RouteNotFound { start: NodeId, goal: NodeId },

    /// Raised when a tile index is requested deeper than can be built eagerly.
    #[error("tile depth {requested} exceeds the supported maximum of {max}")]
    TileDepthUnsupported { requested: u8, max: u8 },

    /// Raised when the root extent of the tile pyramid is degenerate.
    #[error("invalid map extent: {message}")]
    InvalidExtent { message: String },

    /// Raised when an image id does not address a tile in the index.
    #[error("unknown tile id {id}")]
    UnknownTile { id: u64 },

    /// Raised when the tile image store has no image for a tile.
    #[error("tile image {id} not found at {path}")]
    TileImageNotFound { id: u64, path: PathBuf },

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for JSON decoding errors from graph documents.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
