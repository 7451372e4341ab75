use citymap_lib::{
    plan_raster, plan_route, GeoGraph, GeoPoint, MapExtent, NodeId, RasterRequest, RouteAlgorithm,
    RouteRequest, TileIndex, DEFAULT_MAX_DEPTH, TILE_SIZE,
};
use criterion::{criterion_group, criterion_main, Criterion};
use once_cell::sync::Lazy;
use std::hint::black_box;

const SIDE: usize = 60;

/// Jittered street grid inside the default map extent.
fn street_grid() -> GeoGraph {
    let bounds = MapExtent::default().bounds();
    let mut seed = 0x9e37_79b9_7f4a_7c15u64;
    let mut jitter = move || {
        seed = seed
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((seed >> 11) as f64 / (1u64 << 53) as f64 - 0.5) * 0.3
    };

    let step_lon = bounds.width() / SIDE as f64;
    let step_lat = bounds.height() / SIDE as f64;
    let id = |row: usize, col: usize| (row * SIDE + col) as NodeId;

    let mut graph = GeoGraph::new();
    for row in 0..SIDE {
        for col in 0..SIDE {
            let lon = bounds.left() + (col as f64 + 0.5 + jitter()) * step_lon;
            let lat = bounds.top() - (row as f64 + 0.5 + jitter()) * step_lat;
            graph
                .insert_node(id(row, col), GeoPoint::new(lon, lat))
                .expect("unique ids");
        }
    }
    for row in 0..SIDE {
        for col in 0..SIDE {
            if col + 1 < SIDE {
                graph
                    .insert_bidirectional(id(row, col), id(row, col + 1))
                    .expect("nodes exist");
            }
            if row + 1 < SIDE {
                graph
                    .insert_bidirectional(id(row, col), id(row + 1, col))
                    .expect("nodes exist");
            }
        }
    }
    graph
}

static GRAPH: Lazy<GeoGraph> = Lazy::new(street_grid);
static INDEX: Lazy<TileIndex> = Lazy::new(|| {
    TileIndex::build(&MapExtent::default(), DEFAULT_MAX_DEPTH).expect("index builds")
});

fn corner_to_corner(algorithm: RouteAlgorithm) -> RouteRequest {
    let bounds = MapExtent::default().bounds();
    RouteRequest {
        start: bounds.upper_left(),
        goal: bounds.lower_right(),
        algorithm,
    }
}

fn benchmark_pathfinding(c: &mut Criterion) {
    let graph = &*GRAPH;

    c.bench_function("astar_corner_to_corner", |b| {
        let request = corner_to_corner(RouteAlgorithm::AStar);
        b.iter(|| {
            let plan = plan_route(graph, &request).expect("route exists");
            black_box(plan.steps.len())
        });
    });

    c.bench_function("dijkstra_corner_to_corner", |b| {
        let request = corner_to_corner(RouteAlgorithm::Dijkstra);
        b.iter(|| {
            let plan = plan_route(graph, &request).expect("route exists");
            black_box(plan.steps.len())
        });
    });
}

fn benchmark_raster(c: &mut Criterion) {
    let index = &*INDEX;
    let request = RasterRequest::new(
        GeoPoint::new(-122.2594, 37.8752),
        GeoPoint::new(-122.2395, 37.8624),
        1280.0,
        820.0,
    );

    c.bench_function("raster_downtown", |b| {
        b.iter(|| {
            let plan = plan_raster(index, &request, TILE_SIZE);
            black_box(plan.tiles.len())
        });
    });
}

criterion_group!(benches, benchmark_pathfinding, benchmark_raster);
criterion_main!(benches);
