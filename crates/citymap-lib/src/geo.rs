//! Planar geometry over raw longitude/latitude.
//!
//! Coordinates are treated as Cartesian `(x, y) = (lon, lat)`. That is only
//! accurate at city scale, which is the scale the road graph and tile pyramid
//! cover.

use serde::{Deserialize, Serialize};

/// A geographic position, `lon` on the x-axis and `lat` on the y-axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Euclidean distance to another point in degrees.
    pub fn distance_to(&self, other: &Self) -> f64 {
        euclidean_distance(*self, *other)
    }

    pub fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }
}

/// `sqrt((lon2-lon1)^2 + (lat2-lat1)^2)`, used for edge weights and the A*
/// heuristic alike.
pub fn euclidean_distance(a: GeoPoint, b: GeoPoint) -> f64 {
    let dx = b.lon - a.lon;
    let dy = b.lat - a.lat;
    (dx * dx + dy * dy).sqrt()
}

/// Axis-aligned box anchored at its upper-left corner.
///
/// Height is measured downward: the lower edge sits at `y - height` because
/// latitude decreases towards the bottom of the map. Corners are stored
/// directly so that boxes produced by splitting share bit-identical edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    upper_left: GeoPoint,
    lower_right: GeoPoint,
}

impl BoundingBox {
    /// Build a box from `(x, y, width, height)` with height measured downward.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            upper_left: GeoPoint::new(x, y),
            lower_right: GeoPoint::new(x + width, y - height),
        }
    }

    /// Build a box from its upper-left and lower-right corners.
    pub fn from_corners(upper_left: GeoPoint, lower_right: GeoPoint) -> Self {
        Self {
            upper_left,
            lower_right,
        }
    }

    pub fn x(&self) -> f64 {
        self.upper_left.lon
    }

    pub fn y(&self) -> f64 {
        self.upper_left.lat
    }

    pub fn width(&self) -> f64 {
        self.lower_right.lon - self.upper_left.lon
    }

    pub fn height(&self) -> f64 {
        self.upper_left.lat - self.lower_right.lat
    }

    pub fn upper_left(&self) -> GeoPoint {
        self.upper_left
    }

    pub fn lower_right(&self) -> GeoPoint {
        self.lower_right
    }

    pub fn left(&self) -> f64 {
        self.upper_left.lon.min(self.lower_right.lon)
    }

    pub fn right(&self) -> f64 {
        self.upper_left.lon.max(self.lower_right.lon)
    }

    pub fn top(&self) -> f64 {
        self.upper_left.lat.max(self.lower_right.lat)
    }

    pub fn bottom(&self) -> f64 {
        self.upper_left.lat.min(self.lower_right.lat)
    }

    pub fn area(&self) -> f64 {
        (self.right() - self.left()) * (self.top() - self.bottom())
    }

    /// Geometric midpoint of the box.
    pub fn midpoint(&self) -> GeoPoint {
        GeoPoint::new(
            (self.lower_right.lon - self.upper_left.lon) / 2.0 + self.upper_left.lon,
            (self.upper_left.lat - self.lower_right.lat) / 2.0 + self.lower_right.lat,
        )
    }

    /// Whether the interiors of two boxes intersect.
    ///
    /// Both boxes are normalised to min/max bounds first, so a box with a
    /// negative width or height still compares correctly. Boxes that only
    /// share an edge do not overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() > other.bottom()
            && self.bottom() < other.top()
    }

    /// Whether `point` lies inside the box or on its boundary.
    pub fn contains(&self, point: GeoPoint) -> bool {
        point.lon >= self.left()
            && point.lon <= self.right()
            && point.lat >= self.bottom()
            && point.lat <= self.top()
    }

    /// Split into four equal quadrants by the midpoint, ordered NW, NE, SW, SE.
    pub fn quadrants(&self) -> [BoundingBox; 4] {
        let ul = self.upper_left;
        let lr = self.lower_right;
        let mid = self.midpoint();
        [
            Self::from_corners(ul, mid),
            Self::from_corners(GeoPoint::new(mid.lon, ul.lat), GeoPoint::new(lr.lon, mid.lat)),
            Self::from_corners(GeoPoint::new(ul.lon, mid.lat), GeoPoint::new(mid.lon, lr.lat)),
            Self::from_corners(mid, lr),
        ]
    }
}
