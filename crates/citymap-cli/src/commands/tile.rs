//! Tile command handler: locate a tile and optionally export its image.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use citymap_lib::{FsTileStore, TileImageStore, TileNode};

use crate::commands::raster::build_index;
use crate::output::{write_json, write_tile_text, OutputFormat};

/// Arguments for the tile command.
#[derive(Debug, Clone)]
pub struct TileCommandArgs {
    /// Raw image id; 0 is the root.
    pub id: u64,
    pub tile_dir: PathBuf,
    /// Copy the tile image here.
    pub output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct TileOutput<'a> {
    #[serde(flatten)]
    tile: &'a TileNode,
    image_path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    exported_bytes: Option<usize>,
}

/// Handle the tile subcommand.
pub fn handle_tile_command<W: Write>(
    args: &TileCommandArgs,
    max_depth: u8,
    format: OutputFormat,
    out: &mut W,
) -> Result<()> {
    let index = build_index(max_depth)?;
    let tile = index
        .tile_by_id(args.id)
        .with_context(|| format!("tile {} is not part of a depth {} map", args.id, max_depth))?;

    let store = FsTileStore::new(&args.tile_dir);
    let exported_bytes = match &args.output {
        Some(target) => Some(export(&store, tile, target)?),
        None => None,
    };

    match format {
        OutputFormat::Json => write_json(
            out,
            &TileOutput {
                tile,
                image_path: store.image_path(tile.image_id),
                exported_bytes,
            },
        )?,
        OutputFormat::Text => {
            write_tile_text(out, tile)?;
            if let (Some(bytes), Some(target)) = (exported_bytes, &args.output) {
                writeln!(out, "Wrote {} bytes to {}", bytes, target.display())?;
            }
        }
    }
    Ok(())
}

fn export(store: &FsTileStore, tile: &TileNode, target: &Path) -> Result<usize> {
    let bytes = store
        .tile_bytes(tile.image_id)
        .context("failed to read tile image")?;
    fs::write(target, &bytes)
        .with_context(|| format!("failed to write tile image to {}", target.display()))?;
    Ok(bytes.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_copies_the_image_bytes() {
        let source = tempfile::tempdir().unwrap();
        fs::write(source.path().join("3.png"), b"south-west").unwrap();
        let target = source.path().join("copy.png");

        let args = TileCommandArgs {
            id: 3,
            tile_dir: source.path().to_path_buf(),
            output: Some(target.clone()),
        };
        let mut out = Vec::new();
        handle_tile_command(&args, 2, OutputFormat::Text, &mut out).unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"south-west");
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Tile 3 at depth 1, row 1, column 0"));
        assert!(text.contains("Wrote 10 bytes"));
    }

    #[test]
    fn tile_deeper_than_the_index_is_rejected() {
        let args = TileCommandArgs {
            id: 1111,
            tile_dir: PathBuf::from("."),
            output: None,
        };
        let error = handle_tile_command(&args, 3, OutputFormat::Text, &mut Vec::<u8>::new())
            .unwrap_err();
        assert!(format!("{error:#}").contains("tile 1111"));
    }
}
