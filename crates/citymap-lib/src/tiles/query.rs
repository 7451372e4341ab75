//! Raster queries against the tile pyramid.
//!
//! A query names a viewport (upper-left and lower-right corners) and the
//! pixel size it will be drawn at. The engine picks the shallowest depth
//! whose tiles are at least as detailed as the viewport's own
//! degrees-per-pixel, collects every tile at that depth that overlaps the
//! viewport, and reports them top row first, left to right.

use serde::Serialize;
use tracing::debug;

use super::{TileId, TileIndex, TileNode};
use crate::geo::{BoundingBox, GeoPoint};

/// Relative slack when comparing resolutions, so that a viewport exactly one
/// quadrant wide does not tip into the next depth through rounding.
const DEPTH_TOLERANCE: f64 = 1e-9;

/// Viewport and output size of a raster query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterRequest {
    pub upper_left: GeoPoint,
    pub lower_right: GeoPoint,
    /// Output width in pixels.
    pub width: f64,
    /// Output height in pixels.
    pub height: f64,
}

impl RasterRequest {
    pub fn new(upper_left: GeoPoint, lower_right: GeoPoint, width: f64, height: f64) -> Self {
        Self {
            upper_left,
            lower_right,
            width,
            height,
        }
    }

    /// Why the request cannot be answered, if it cannot.
    pub fn problem(&self) -> Option<&'static str> {
        if !self.upper_left.is_finite() || !self.lower_right.is_finite() {
            return Some("viewport coordinates must be finite");
        }
        if !(self.width.is_finite() && self.width > 0.0) {
            return Some("width must be a positive number of pixels");
        }
        if !(self.height.is_finite() && self.height > 0.0) {
            return Some("height must be a positive number of pixels");
        }
        if self.lower_right.lon <= self.upper_left.lon {
            return Some("lower-right longitude must be greater than upper-left longitude");
        }
        if self.lower_right.lat >= self.upper_left.lat {
            return Some("lower-right latitude must be less than upper-left latitude");
        }
        None
    }

    pub fn is_valid(&self) -> bool {
        self.problem().is_none()
    }

    pub fn bbox(&self) -> BoundingBox {
        BoundingBox::from_corners(self.upper_left, self.lower_right)
    }

    /// Longitudinal degrees per pixel of the requested viewport.
    pub fn lon_dpp(&self) -> f64 {
        (self.lower_right.lon - self.upper_left.lon) / self.width
    }
}

/// Pixel coordinate inside a composed raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PixelPoint {
    pub x: i64,
    pub y: i64,
}

/// Tiles selected for a raster query, plus the geometry of their mosaic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RasterPlan {
    /// Selected tiles, top row first, left to right within a row.
    pub tiles: Vec<TileNode>,
    pub rows: usize,
    pub columns: usize,
    /// Upper-left corner of the first tile.
    pub upper_left: GeoPoint,
    /// Lower-right corner of the last tile.
    pub lower_right: GeoPoint,
    pub depth: u8,
    pub raster_width: u32,
    pub raster_height: u32,
    pub success: bool,
}

impl RasterPlan {
    /// An unsuccessful result carrying no tiles.
    pub fn failure(depth: u8) -> Self {
        Self {
            tiles: Vec::new(),
            rows: 0,
            columns: 0,
            upper_left: GeoPoint::new(0.0, 0.0),
            lower_right: GeoPoint::new(0.0, 0.0),
            depth,
            raster_width: 0,
            raster_height: 0,
            success: false,
        }
    }

    pub fn tile_ids(&self) -> Vec<TileId> {
        self.tiles.iter().map(|tile| tile.image_id).collect()
    }

    /// Tiles grouped by row, each row ordered left to right.
    pub fn grid(&self) -> Vec<&[TileNode]> {
        if self.columns == 0 {
            return Vec::new();
        }
        self.tiles.chunks(self.columns).collect()
    }

    /// Project a point into the raster's pixel space.
    ///
    /// Returns `None` for an unsuccessful plan. Points outside the mosaic
    /// project outside `0..raster_width` / `0..raster_height`.
    pub fn pixel_position(&self, point: GeoPoint) -> Option<PixelPoint> {
        if !self.success || self.raster_width == 0 || self.raster_height == 0 {
            return None;
        }
        let x_dpp = (self.lower_right.lon - self.upper_left.lon) / f64::from(self.raster_width);
        let y_dpp = (self.upper_left.lat - self.lower_right.lat) / f64::from(self.raster_height);
        Some(PixelPoint {
            x: ((point.lon - self.upper_left.lon) / x_dpp).floor() as i64,
            y: ((self.upper_left.lat - point.lat) / y_dpp).floor() as i64,
        })
    }

    /// Pixel polyline through a route's node positions, in route order.
    pub fn route_overlay(&self, positions: &[GeoPoint]) -> Vec<PixelPoint> {
        positions
            .iter()
            .filter_map(|&point| self.pixel_position(point))
            .collect()
    }
}

/// Shallowest depth whose tiles resolve at least as finely as the request.
///
/// Starting from the root, the depth increases while a tile's longitudinal
/// degrees per pixel is still coarser than the request's, and never passes
/// `max_depth`.
pub fn required_depth(
    root: &BoundingBox,
    request: &RasterRequest,
    tile_size: u32,
    max_depth: u8,
) -> u8 {
    let target = request.lon_dpp();
    let root_span = root.width();
    let tile_px = f64::from(tile_size.max(1));

    let mut depth = 0u8;
    while depth < max_depth {
        let tile_dpp = root_span / (f64::from(1u32 << depth) * tile_px);
        if tile_dpp <= target * (1.0 + DEPTH_TOLERANCE) {
            break;
        }
        depth += 1;
    }
    depth
}

/// Answer a raster query. Never panics: an unusable request or a viewport
/// outside the root extent comes back with `success == false`.
pub fn plan_raster(index: &TileIndex, request: &RasterRequest, tile_size: u32) -> RasterPlan {
    if let Some(problem) = request.problem() {
        debug!(problem, "rejecting raster query");
        return RasterPlan::failure(0);
    }
    if tile_size == 0 {
        debug!("rejecting raster query with zero tile size");
        return RasterPlan::failure(0);
    }

    let depth = required_depth(&index.bounds(), request, tile_size, index.max_depth());
    let query = request.bbox();

    let mut tiles = Vec::new();
    collect(index, index.root(), &query, depth, &mut tiles);
    if tiles.is_empty() {
        debug!(depth, "raster query does not intersect the map");
        return RasterPlan::failure(depth);
    }
    tiles.sort_by_key(|tile| (tile.row, tile.col));

    let (first, last) = (tiles[0], tiles[tiles.len() - 1]);
    let rows = last.row - first.row + 1;
    let columns = last.col - first.col + 1;
    let (Some(raster_width), Some(raster_height)) =
        (pixel_span(columns, tile_size), pixel_span(rows, tile_size))
    else {
        debug!(depth, rows, columns, tile_size, "raster dimensions overflow");
        return RasterPlan::failure(depth);
    };
    debug!(depth, rows, columns, "raster query planned");

    RasterPlan {
        rows,
        columns,
        upper_left: first.bbox.upper_left(),
        lower_right: last.bbox.lower_right(),
        depth,
        raster_width,
        raster_height,
        success: true,
        tiles,
    }
}

fn pixel_span(tiles: usize, tile_size: u32) -> Option<u32> {
    u32::try_from(tiles).ok()?.checked_mul(tile_size)
}

fn collect(
    index: &TileIndex,
    node: &TileNode,
    query: &BoundingBox,
    depth: u8,
    out: &mut Vec<TileNode>,
) {
    if !node.bbox.overlaps(query) {
        return;
    }
    if node.depth == depth {
        out.push(*node);
        return;
    }
    let Some(children) = index.children(node) else {
        return;
    };
    for child in children {
        if !child.bbox.overlaps(query) {
            continue;
        }
        if child.depth == depth {
            out.push(*child);
        } else {
            collect(index, child, query, depth, out);
        }
    }
}
