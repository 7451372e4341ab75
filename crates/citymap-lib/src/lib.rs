//! citymap library entry points.
//!
//! This crate exposes the road graph model, the A* path finder, the map tile
//! quadtree and the raster query engine. Higher-level consumers (CLI, HTTP
//! service) should only depend on the functions exported here instead of
//! reimplementing behavior.
//!

#![deny(warnings)]

pub mod error;
pub mod geo;
pub mod graph;
pub mod path;
pub mod provider;
pub mod routing;
pub mod tiles;

pub use error::{Error, Result};
pub use geo::{euclidean_distance, BoundingBox, GeoPoint};
pub use graph::{Connection, GeoGraph, GraphNode, NodeId};
pub use path::{find_route, find_route_a_star, find_route_dijkstra, PathResult};
pub use provider::{EdgeRecord, GraphDataProvider, GraphDocument, JsonGraphProvider, NodeRecord};
pub use routing::{plan_route, plan_route_between, RouteAlgorithm, RoutePlan, RouteRequest};
pub use tiles::{
    plan_raster, required_depth, FsTileStore, MapExtent, PixelPoint, Quadrant, RasterPlan,
    RasterRequest, TileId, TileImageStore, TileIndex, TileNode, DEFAULT_MAX_DEPTH,
    MAX_SUPPORTED_DEPTH, MAX_TILE_SIZE, TILE_SIZE,
};
