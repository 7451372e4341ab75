//! Output formatting for command results.

use std::io::{self, Write};

use clap::ValueEnum;
use serde::Serialize;

use citymap_lib::{GeoGraph, RasterPlan, RoutePlan, TileNode};

/// How command results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One pretty-printed JSON document.
    Json,
}

/// Write `value` as pretty JSON followed by a newline.
pub fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)
}

/// Render a planned route, one intersection per line.
pub fn write_route_text<W: Write>(out: &mut W, plan: &RoutePlan, graph: &GeoGraph) -> io::Result<()> {
    writeln!(
        out,
        "Route from node {} to node {} ({}, {} hops, cost {:.6}):",
        plan.start,
        plan.goal,
        plan.algorithm,
        plan.hop_count(),
        plan.cost
    )?;
    for &id in &plan.steps {
        match graph.position(id) {
            Some(point) => writeln!(out, "- {} ({:.6}, {:.6})", id, point.lon, point.lat)?,
            None => writeln!(out, "- {}", id)?,
        }
    }
    Ok(())
}

/// Render a raster answer as a grid of tile ids.
pub fn write_raster_text<W: Write>(out: &mut W, plan: &RasterPlan) -> io::Result<()> {
    if !plan.success {
        return writeln!(out, "Query unsuccessful (depth {})", plan.depth);
    }

    writeln!(
        out,
        "Depth {}: {} x {} tiles, {} x {} px",
        plan.depth, plan.columns, plan.rows, plan.raster_width, plan.raster_height
    )?;
    writeln!(
        out,
        "Upper-left ({}, {}), lower-right ({}, {})",
        plan.upper_left.lon, plan.upper_left.lat, plan.lower_right.lon, plan.lower_right.lat
    )?;
    for row in plan.grid() {
        let ids: Vec<String> = row.iter().map(|tile| tile.image_id.to_string()).collect();
        writeln!(out, "{}", ids.join(" "))?;
    }
    Ok(())
}

/// Render where a tile sits in the pyramid.
pub fn write_tile_text<W: Write>(out: &mut W, tile: &TileNode) -> io::Result<()> {
    let ul = tile.bbox.upper_left();
    let lr = tile.bbox.lower_right();
    writeln!(
        out,
        "Tile {} at depth {}, row {}, column {}",
        tile.image_id, tile.depth, tile.row, tile.col
    )?;
    writeln!(
        out,
        "Upper-left ({}, {}), lower-right ({}, {})",
        ul.lon, ul.lat, lr.lon, lr.lat
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use citymap_lib::{
        plan_raster, GeoPoint, MapExtent, RasterRequest, RouteAlgorithm, TileIndex, TILE_SIZE,
    };

    fn render<F: FnOnce(&mut Vec<u8>) -> io::Result<()>>(f: F) -> String {
        let mut buffer = Vec::new();
        f(&mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn route_text_lists_every_step() {
        let mut graph = GeoGraph::new();
        graph.insert_node(1, GeoPoint::new(0.0, 0.0)).unwrap();
        graph.insert_node(2, GeoPoint::new(1.0, 0.0)).unwrap();
        graph.insert_bidirectional(1, 2).unwrap();
        let plan = RoutePlan {
            algorithm: RouteAlgorithm::AStar,
            start: 1,
            goal: 2,
            steps: vec![1, 2],
            cost: 1.0,
        };

        let text = render(|out| write_route_text(out, &plan, &graph));
        assert!(text.starts_with("Route from node 1 to node 2 (a-star, 1 hops"));
        assert!(text.contains("- 2 (1.000000, 0.000000)"));
    }

    #[test]
    fn raster_text_prints_one_line_per_row() {
        let index = TileIndex::build(&MapExtent::default(), 2).unwrap();
        let root = index.bounds();
        let request = RasterRequest::new(root.upper_left(), root.lower_right(), 512.0, 512.0);
        let plan = plan_raster(&index, &request, TILE_SIZE);

        let text = render(|out| write_raster_text(out, &plan));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Depth 1: 2 x 2 tiles, 512 x 512 px");
        assert_eq!(&lines[2..], &["1 2", "3 4"]);
    }

    #[test]
    fn failed_raster_text_says_so() {
        let text = render(|out| write_raster_text(out, &RasterPlan::failure(0)));
        assert_eq!(text, "Query unsuccessful (depth 0)\n");
    }

    #[test]
    fn json_output_ends_with_newline() {
        let text = render(|out| write_json(out, &serde_json::json!({"ok": true})));
        assert!(text.ends_with("}\n"));
    }
}
