use serde::Serialize;
use tracing::debug;

use super::{MapExtent, Quadrant, TileId, MAX_SUPPORTED_DEPTH};
use crate::error::{Error, Result};
use crate::geo::BoundingBox;

/// A single tile in the pyramid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TileNode {
    pub bbox: BoundingBox,
    pub image_id: TileId,
    pub depth: u8,
    /// Row within the tile's level, counted from the top.
    pub row: usize,
    /// Column within the tile's level, counted from the left.
    pub col: usize,
}

/// Eagerly built, immutable tile quadtree.
///
/// Levels are stored as row-major arenas: level `d` holds `4^d` tiles laid
/// out on a `2^d` by `2^d` grid, so the children of `(row, col)` sit at
/// `(2 * row + dr, 2 * col + dc)` on the next level.
#[derive(Debug, Clone)]
pub struct TileIndex {
    levels: Vec<Vec<TileNode>>,
}

impl TileIndex {
    /// Build every level from the root extent down to `max_depth`.
    pub fn build(extent: &MapExtent, max_depth: u8) -> Result<Self> {
        if max_depth > MAX_SUPPORTED_DEPTH {
            return Err(Error::TileDepthUnsupported {
                requested: max_depth,
                max: MAX_SUPPORTED_DEPTH,
            });
        }

        let mut levels = Vec::with_capacity(max_depth as usize + 1);
        levels.push(vec![TileNode {
            bbox: extent.bounds(),
            image_id: TileId::ROOT,
            depth: 0,
            row: 0,
            col: 0,
        }]);

        for depth in 1..=max_depth {
            let parents = &levels[depth as usize - 1];
            let parent_side = side(depth - 1);
            let child_side = side(depth);
            let mut level = Vec::with_capacity(child_side * child_side);

            for row in 0..child_side {
                for col in 0..child_side {
                    let parent = &parents[(row / 2) * parent_side + col / 2];
                    let quadrant = Quadrant::from_offset(row, col);
                    let quadrant_index = (row % 2) * 2 + col % 2;
                    level.push(TileNode {
                        bbox: parent.bbox.quadrants()[quadrant_index],
                        image_id: parent.image_id.child(quadrant),
                        depth,
                        row,
                        col,
                    });
                }
            }
            levels.push(level);
        }

        debug!(
            max_depth,
            leaves = levels.last().map(Vec::len).unwrap_or(0),
            "tile index built"
        );
        Ok(Self { levels })
    }

    pub fn root(&self) -> &TileNode {
        &self.levels[0][0]
    }

    pub fn bounds(&self) -> BoundingBox {
        self.root().bbox
    }

    pub fn max_depth(&self) -> u8 {
        (self.levels.len() - 1) as u8
    }

    /// Total number of tiles across all levels.
    pub fn len(&self) -> usize {
        self.levels.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// All tiles of one level in row-major order. Empty past `max_depth`.
    pub fn level(&self, depth: u8) -> &[TileNode] {
        self.levels
            .get(depth as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn node(&self, depth: u8, row: usize, col: usize) -> Option<&TileNode> {
        let width = side(depth);
        if row >= width || col >= width {
            return None;
        }
        self.levels.get(depth as usize)?.get(row * width + col)
    }

    /// Children of `node` in NW, NE, SW, SE order, or `None` for a leaf.
    pub fn children(&self, node: &TileNode) -> Option<[&TileNode; 4]> {
        let depth = node.depth.checked_add(1)?;
        let next = self.levels.get(depth as usize)?;
        let width = side(depth);
        let at = move |quadrant: Quadrant| {
            let (dr, dc) = quadrant.offset();
            &next[(node.row * 2 + dr) * width + node.col * 2 + dc]
        };
        Some([
            at(Quadrant::NorthWest),
            at(Quadrant::NorthEast),
            at(Quadrant::SouthWest),
            at(Quadrant::SouthEast),
        ])
    }

    /// Resolve a raw image id by walking its digits down from the root.
    pub fn tile_by_id(&self, raw: u64) -> Result<&TileNode> {
        let id = TileId::from_raw(raw).ok_or(Error::UnknownTile { id: raw })?;
        if id.depth() > self.max_depth() {
            return Err(Error::UnknownTile { id: raw });
        }

        let (mut row, mut col) = (0usize, 0usize);
        for quadrant in id.path() {
            let (dr, dc) = quadrant.offset();
            row = row * 2 + dr;
            col = col * 2 + dc;
        }
        self.node(id.depth(), row, col)
            .ok_or(Error::UnknownTile { id: raw })
    }
}

/// Tiles along one edge of a level.
fn side(depth: u8) -> usize {
    1usize << depth
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::GeoPoint;
    use crate::tiles::DEFAULT_MAX_DEPTH;

    fn unit_extent() -> MapExtent {
        MapExtent::new(GeoPoint::new(0.0, 8.0), GeoPoint::new(8.0, 0.0)).unwrap()
    }

    #[test]
    fn every_level_is_complete() {
        let index = TileIndex::build(&unit_extent(), 4).unwrap();
        assert_eq!(index.max_depth(), 4);
        for depth in 0..=4u8 {
            assert_eq!(index.level(depth).len(), 4usize.pow(depth as u32));
        }
        assert!(index.level(5).is_empty());
        assert_eq!(index.len(), 1 + 4 + 16 + 64 + 256);
    }

    #[test]
    fn ids_have_one_digit_per_level() {
        let index = TileIndex::build(&unit_extent(), 3).unwrap();
        for depth in 0..=3u8 {
            for tile in index.level(depth) {
                assert_eq!(tile.image_id.depth(), depth);
                assert_eq!(tile.depth, depth);
            }
        }
    }

    #[test]
    fn nw_se_nw_is_142() {
        let index = TileIndex::build(&unit_extent(), 3).unwrap();
        let nw = index.children(index.root()).unwrap()[0];
        let se = index.children(nw).unwrap()[3];
        let nw_again = index.children(se).unwrap()[0];
        assert_eq!(nw_again.image_id.value(), 142);
        assert_eq!(nw_again.depth, 3);
        assert_eq!((nw_again.row, nw_again.col), (2, 2));
        assert_eq!(index.tile_by_id(142).unwrap(), nw_again);
    }

    #[test]
    fn leaves_have_no_children() {
        let index = TileIndex::build(&unit_extent(), 2).unwrap();
        for tile in index.level(2) {
            assert!(index.children(tile).is_none());
        }
        for tile in index.level(1) {
            assert!(index.children(tile).is_some());
        }
    }

    #[test]
    fn child_boxes_split_the_parent_at_its_midpoint() {
        let index = TileIndex::build(&unit_extent(), 1).unwrap();
        let [nw, ne, sw, se] = index.children(index.root()).unwrap();
        assert_eq!(nw.bbox, BoundingBox::new(0.0, 8.0, 4.0, 4.0));
        assert_eq!(ne.bbox, BoundingBox::new(4.0, 8.0, 4.0, 4.0));
        assert_eq!(sw.bbox, BoundingBox::new(0.0, 4.0, 4.0, 4.0));
        assert_eq!(se.bbox, BoundingBox::new(4.0, 4.0, 4.0, 4.0));
        assert_eq!(
            [nw, ne, sw, se].map(|tile| tile.image_id.value()),
            [1, 2, 3, 4]
        );
    }

    #[test]
    fn tiles_partition_the_root_at_every_depth() {
        let extent = MapExtent::default();
        let index = TileIndex::build(&extent, DEFAULT_MAX_DEPTH).unwrap();
        let root = extent.bounds();

        for depth in 0..=index.max_depth() {
            let width = side(depth);
            let level = index.level(depth);
            let total: f64 = level.iter().map(|tile| tile.bbox.area()).sum();
            assert!((total - root.area()).abs() <= root.area() * 1e-9);

            for tile in level {
                if tile.col == 0 {
                    assert_eq!(tile.bbox.left(), root.left());
                }
                if tile.col == width - 1 {
                    assert_eq!(tile.bbox.right(), root.right());
                }
                if tile.row == 0 {
                    assert_eq!(tile.bbox.top(), root.top());
                }
                if tile.row == width - 1 {
                    assert_eq!(tile.bbox.bottom(), root.bottom());
                }
                // Neighbours share their edges exactly, so no gap or overlap.
                if let Some(right) = index.node(depth, tile.row, tile.col + 1) {
                    assert_eq!(tile.bbox.right(), right.bbox.left());
                    assert!(!tile.bbox.overlaps(&right.bbox));
                }
                if let Some(below) = index.node(depth, tile.row + 1, tile.col) {
                    assert_eq!(tile.bbox.bottom(), below.bbox.top());
                    assert!(!tile.bbox.overlaps(&below.bbox));
                }
            }
        }
    }

    #[test]
    fn unknown_ids_are_rejected() {
        let index = TileIndex::build(&unit_extent(), 2).unwrap();
        assert!(matches!(
            index.tile_by_id(111),
            Err(Error::UnknownTile { id: 111 })
        ));
        assert!(matches!(
            index.tile_by_id(19),
            Err(Error::UnknownTile { id: 19 })
        ));
        assert_eq!(index.tile_by_id(0).unwrap().image_id, TileId::ROOT);
        assert_eq!(index.tile_by_id(43).unwrap().image_id.value(), 43);
    }

    #[test]
    fn depth_beyond_supported_maximum_is_rejected() {
        let err = TileIndex::build(&unit_extent(), MAX_SUPPORTED_DEPTH + 1).unwrap_err();
        assert!(matches!(err, Error::TileDepthUnsupported { .. }));
    }
}
