//! Map tile pyramid.
//!
//! The pyramid is a complete quadtree over a fixed root extent. Every node
//! carries an image id whose decimal digits spell the path from the root
//! (1 = NW, 2 = NE, 3 = SW, 4 = SE), so id `142` is the NW child of the SE
//! child of the NW child of the root. The root itself is id `0`.

mod index;
mod query;
mod store;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geo::{BoundingBox, GeoPoint};

pub use index::{TileIndex, TileNode};
pub use query::{plan_raster, required_depth, PixelPoint, RasterPlan, RasterRequest};
pub use store::{FsTileStore, TileImageStore};

/// Edge length of a tile image in pixels.
pub const TILE_SIZE: u32 = 256;

/// Largest tile edge the service and CLI accept.
pub const MAX_TILE_SIZE: u32 = 4096;

/// Pyramid depth used when nothing else is configured.
pub const DEFAULT_MAX_DEPTH: u8 = 7;

/// Deepest pyramid the index will build eagerly (4^9 leaves).
pub const MAX_SUPPORTED_DEPTH: u8 = 9;

const ROOT_ULLON: f64 = -122.2998046875;
const ROOT_ULLAT: f64 = 37.892195547244356;
const ROOT_LRLON: f64 = -122.2119140625;
const ROOT_LRLAT: f64 = 37.82280243352756;

/// Geographic extent covered by the root tile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapExtent {
    bounds: BoundingBox,
}

impl MapExtent {
    /// Validate and wrap a root extent.
    ///
    /// The lower-right corner must lie strictly right of and below the
    /// upper-left corner.
    pub fn new(upper_left: GeoPoint, lower_right: GeoPoint) -> Result<Self> {
        if !upper_left.is_finite() || !lower_right.is_finite() {
            return Err(Error::InvalidExtent {
                message: "corners must be finite".to_string(),
            });
        }
        if lower_right.lon <= upper_left.lon || lower_right.lat >= upper_left.lat {
            return Err(Error::InvalidExtent {
                message: format!(
                    "lower-right ({}, {}) is not right of and below upper-left ({}, {})",
                    lower_right.lon, lower_right.lat, upper_left.lon, upper_left.lat
                ),
            });
        }
        Ok(Self {
            bounds: BoundingBox::from_corners(upper_left, lower_right),
        })
    }

    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }
}

impl Default for MapExtent {
    /// Central Berkeley, the area covered by the bundled tile set.
    fn default() -> Self {
        Self {
            bounds: BoundingBox::from_corners(
                GeoPoint::new(ROOT_ULLON, ROOT_ULLAT),
                GeoPoint::new(ROOT_LRLON, ROOT_LRLAT),
            ),
        }
    }
}

/// One of the four children of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quadrant {
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

impl Quadrant {
    /// Quadrants in child order.
    pub const ALL: [Quadrant; 4] = [
        Quadrant::NorthWest,
        Quadrant::NorthEast,
        Quadrant::SouthWest,
        Quadrant::SouthEast,
    ];

    /// Digit appended to the parent id.
    pub fn digit(self) -> u64 {
        match self {
            Quadrant::NorthWest => 1,
            Quadrant::NorthEast => 2,
            Quadrant::SouthWest => 3,
            Quadrant::SouthEast => 4,
        }
    }

    pub fn from_digit(digit: u64) -> Option<Self> {
        match digit {
            1 => Some(Quadrant::NorthWest),
            2 => Some(Quadrant::NorthEast),
            3 => Some(Quadrant::SouthWest),
            4 => Some(Quadrant::SouthEast),
            _ => None,
        }
    }

    /// `(row, col)` offset of this quadrant inside its parent's 2x2 block.
    pub fn offset(self) -> (usize, usize) {
        match self {
            Quadrant::NorthWest => (0, 0),
            Quadrant::NorthEast => (0, 1),
            Quadrant::SouthWest => (1, 0),
            Quadrant::SouthEast => (1, 1),
        }
    }

    fn from_offset(row: usize, col: usize) -> Self {
        Quadrant::ALL[(row % 2) * 2 + col % 2]
    }
}

/// Path-encoded tile image id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileId(u64);

impl TileId {
    pub const ROOT: TileId = TileId(0);

    /// Accept a raw id only if every digit names a quadrant.
    pub fn from_raw(raw: u64) -> Option<Self> {
        let mut rest = raw;
        while rest > 0 {
            Quadrant::from_digit(rest % 10)?;
            rest /= 10;
        }
        Some(TileId(raw))
    }

    pub fn value(self) -> u64 {
        self.0
    }

    pub fn is_root(self) -> bool {
        self.0 == 0
    }

    pub fn child(self, quadrant: Quadrant) -> TileId {
        TileId(self.0 * 10 + quadrant.digit())
    }

    /// Number of digits, which is also the tile's depth.
    pub fn depth(self) -> u8 {
        let mut depth = 0;
        let mut rest = self.0;
        while rest > 0 {
            depth += 1;
            rest /= 10;
        }
        depth
    }

    /// Quadrants from the root down to this tile.
    pub fn path(self) -> Vec<Quadrant> {
        let mut path = Vec::with_capacity(self.depth() as usize);
        let mut rest = self.0;
        while rest > 0 {
            if let Some(quadrant) = Quadrant::from_digit(rest % 10) {
                path.push(quadrant);
            }
            rest /= 10;
        }
        path.reverse();
        path
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_encode_the_path_from_the_root() {
        let id = TileId::ROOT
            .child(Quadrant::NorthWest)
            .child(Quadrant::SouthEast)
            .child(Quadrant::NorthWest);
        assert_eq!(id.value(), 142);
        assert_eq!(id.depth(), 3);
        assert_eq!(
            id.path(),
            vec![Quadrant::NorthWest, Quadrant::SouthEast, Quadrant::NorthWest]
        );
    }

    #[test]
    fn raw_ids_must_use_quadrant_digits() {
        assert_eq!(TileId::from_raw(0), Some(TileId::ROOT));
        assert_eq!(TileId::from_raw(4321).map(TileId::depth), Some(4));
        assert!(TileId::from_raw(15).is_none());
        assert!(TileId::from_raw(103).is_none());
    }

    #[test]
    fn quadrant_offsets_round_trip() {
        for quadrant in Quadrant::ALL {
            let (row, col) = quadrant.offset();
            assert_eq!(Quadrant::from_offset(row, col), quadrant);
        }
    }

    #[test]
    fn default_extent_is_valid() {
        let extent = MapExtent::default();
        let bounds = extent.bounds();
        assert!(MapExtent::new(bounds.upper_left(), bounds.lower_right()).is_ok());
        assert!(bounds.width() > 0.0);
        assert!(bounds.height() > 0.0);
    }

    #[test]
    fn inverted_extent_is_rejected() {
        let err = MapExtent::new(GeoPoint::new(1.0, 0.0), GeoPoint::new(0.0, 1.0)).unwrap_err();
        assert!(matches!(err, Error::InvalidExtent { .. }));
    }
}
