use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::TileId;
use crate::error::{Error, Result};

/// Source of encoded tile images.
///
/// Bytes are returned as stored; decoding and compositing belong to the
/// caller.
pub trait TileImageStore: Send + Sync {
    fn tile_bytes(&self, id: TileId) -> Result<Vec<u8>>;
}

/// Tile images laid out flat in one directory: `root.png` for the root and
/// `<id>.png` for every other tile.
#[derive(Debug, Clone)]
pub struct FsTileStore {
    dir: PathBuf,
}

impl FsTileStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn image_path(&self, id: TileId) -> PathBuf {
        if id.is_root() {
            self.dir.join("root.png")
        } else {
            self.dir.join(format!("{id}.png"))
        }
    }
}

impl TileImageStore for FsTileStore {
    fn tile_bytes(&self, id: TileId) -> Result<Vec<u8>> {
        let path = self.image_path(id);
        if !path.is_file() {
            return Err(Error::TileImageNotFound {
                id: id.value(),
                path,
            });
        }
        debug!(tile = %id, path = %path.display(), "reading tile image");
        Ok(fs::read(&path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiles::Quadrant;

    #[test]
    fn root_and_children_use_distinct_file_names() {
        let store = FsTileStore::new("/srv/img");
        assert_eq!(store.image_path(TileId::ROOT), Path::new("/srv/img/root.png"));
        let id = TileId::ROOT
            .child(Quadrant::SouthWest)
            .child(Quadrant::NorthEast);
        assert_eq!(store.image_path(id), Path::new("/srv/img/32.png"));
    }

    #[test]
    fn reads_bytes_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("root.png"), b"root-bytes").unwrap();
        fs::write(dir.path().join("4.png"), b"se-bytes").unwrap();

        let store = FsTileStore::new(dir.path());
        assert_eq!(store.tile_bytes(TileId::ROOT).unwrap(), b"root-bytes");
        let se = TileId::ROOT.child(Quadrant::SouthEast);
        assert_eq!(store.tile_bytes(se).unwrap(), b"se-bytes");
    }

    #[test]
    fn missing_image_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsTileStore::new(dir.path());
        let err = store
            .tile_bytes(TileId::ROOT.child(Quadrant::NorthWest))
            .unwrap_err();
        assert!(matches!(err, Error::TileImageNotFound { id: 1, .. }));
    }
}
