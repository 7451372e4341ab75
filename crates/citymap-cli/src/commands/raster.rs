//! Raster command handler: which tiles cover a viewport.

use std::io::Write;

use anyhow::{Context, Result};

use citymap_lib::{plan_raster, GeoPoint, MapExtent, RasterRequest, TileIndex};

use crate::output::{write_json, write_raster_text, OutputFormat};

/// Arguments for the raster command.
#[derive(Debug, Clone)]
pub struct RasterCommandArgs {
    pub upper_left: GeoPoint,
    pub lower_right: GeoPoint,
    pub width: f64,
    pub height: f64,
}

impl RasterCommandArgs {
    pub fn to_request(&self) -> RasterRequest {
        RasterRequest::new(self.upper_left, self.lower_right, self.width, self.height)
    }
}

/// Build the tile index for the default map extent.
pub fn build_index(max_depth: u8) -> Result<TileIndex> {
    TileIndex::build(&MapExtent::default(), max_depth)
        .with_context(|| format!("failed to build tile index to depth {}", max_depth))
}

/// Handle the raster subcommand.
///
/// An unanswerable viewport prints an unsuccessful result and still exits 0.
pub fn handle_raster_command<W: Write>(
    args: &RasterCommandArgs,
    max_depth: u8,
    tile_size: u32,
    format: OutputFormat,
    out: &mut W,
) -> Result<()> {
    let index = build_index(max_depth)?;
    let request = args.to_request();
    if let Some(problem) = request.problem() {
        tracing::warn!(problem, "raster query cannot be answered");
    }

    let plan = plan_raster(&index, &request, tile_size);
    match format {
        OutputFormat::Json => write_json(out, &plan)?,
        OutputFormat::Text => write_raster_text(out, &plan)?,
    }
    Ok(())
}
