use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use citymap_cli::commands::raster::{handle_raster_command, RasterCommandArgs};
use citymap_cli::commands::route::{handle_route_command, RouteCommandArgs};
use citymap_cli::commands::tile::{handle_tile_command, TileCommandArgs};
use citymap_cli::output::OutputFormat;
use citymap_lib::{GeoPoint, RouteAlgorithm, DEFAULT_MAX_DEPTH, MAX_TILE_SIZE, TILE_SIZE};

#[derive(Parser, Debug)]
#[command(author, version, about = "City map routing and tile utilities")]
struct Cli {
    /// Road graph JSON document.
    #[arg(long, default_value = "graph.json")]
    graph: PathBuf,

    /// Deepest tile level to index.
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: u8,

    /// Tile edge length in pixels.
    #[arg(
        long,
        default_value_t = TILE_SIZE,
        value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_TILE_SIZE))
    )]
    tile_size: u32,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Shortest route between the intersections nearest two coordinates.
    Route {
        #[arg(long, allow_negative_numbers = true)]
        from_lon: f64,
        #[arg(long, allow_negative_numbers = true)]
        from_lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        to_lon: f64,
        #[arg(long, allow_negative_numbers = true)]
        to_lat: f64,
        #[arg(long, value_enum, default_value_t = AlgorithmArg::AStar)]
        algorithm: AlgorithmArg,
    },
    /// Tiles covering a viewport drawn at the given pixel size.
    Raster {
        #[arg(long, allow_negative_numbers = true)]
        ullon: f64,
        #[arg(long, allow_negative_numbers = true)]
        ullat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lrlon: f64,
        #[arg(long, allow_negative_numbers = true)]
        lrlat: f64,
        /// Output width in pixels.
        #[arg(long, allow_negative_numbers = true)]
        width: f64,
        /// Output height in pixels.
        #[arg(long, allow_negative_numbers = true)]
        height: f64,
    },
    /// Locate a tile by image id and optionally export its image.
    Tile {
        /// Image id; 0 is the root tile.
        id: u64,
        /// Directory holding `root.png` and `<id>.png`.
        #[arg(long, default_value = "img")]
        tile_dir: PathBuf,
        /// Copy the tile image to this file.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AlgorithmArg {
    Dijkstra,
    AStar,
}

impl From<AlgorithmArg> for RouteAlgorithm {
    fn from(value: AlgorithmArg) -> Self {
        match value {
            AlgorithmArg::Dijkstra => RouteAlgorithm::Dijkstra,
            AlgorithmArg::AStar => RouteAlgorithm::AStar,
        }
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let mut stdout = io::stdout().lock();

    match cli.command {
        Command::Route {
            from_lon,
            from_lat,
            to_lon,
            to_lat,
            algorithm,
        } => {
            let args = RouteCommandArgs {
                from: GeoPoint::new(from_lon, from_lat),
                to: GeoPoint::new(to_lon, to_lat),
                algorithm: algorithm.into(),
            };
            handle_route_command(&cli.graph, &args, cli.format, &mut stdout)
        }
        Command::Raster {
            ullon,
            ullat,
            lrlon,
            lrlat,
            width,
            height,
        } => {
            let args = RasterCommandArgs {
                upper_left: GeoPoint::new(ullon, ullat),
                lower_right: GeoPoint::new(lrlon, lrlat),
                width,
                height,
            };
            handle_raster_command(&args, cli.max_depth, cli.tile_size, cli.format, &mut stdout)
        }
        Command::Tile {
            id,
            tile_dir,
            output,
        } => {
            let args = TileCommandArgs {
                id,
                tile_dir,
                output,
            };
            handle_tile_command(&args, cli.max_depth, cli.format, &mut stdout)
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
