//! Navigation benchmarks for waypoint_core.
//!
//! Run with: `cargo bench -p waypoint_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use waypoint_core::prelude::*;

fn checkered_level(tiles: usize) -> TileLevel {
    let mut level = TileLevel::new(Vec2::ZERO, tiles, tiles, 32.0, 128.0)
        .expect("benchmark level dimensions are non-zero");
    for tx in (3..tiles).step_by(7) {
        for ty in (2..tiles).step_by(5) {
            level.set_solid(tx, ty, true);
        }
    }
    level
}

fn build(level: &TileLevel, mode: ConnectionMode) -> NavGraph {
    let mut world = LevelCollider::new(level);
    let mut graph = NavGraph::new(level);
    generate_from_level(
        &mut graph,
        level,
        &mut world,
        &GenerationConfig::new(32.0, mode),
    )
    .expect("benchmark generation succeeds");
    graph
}

/// Graph generation over growing square levels.
pub fn generation_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_from_level");
    for tiles in [16, 32, 64] {
        let level = checkered_level(tiles);
        group.bench_with_input(BenchmarkId::from_parameter(tiles), &level, |b, level| {
            b.iter(|| black_box(build(level, ConnectionMode::CardinalAndDiagonal)));
        });
    }
    group.finish();
}

/// Exhaustive and greedy queries across a 64x64 tile level.
pub fn search_benchmark(c: &mut Criterion) {
    let level = checkered_level(64);
    let graph = build(&level, ConnectionMode::CardinalAndDiagonal);
    let start = Vec2::new(16.0, 16.0);
    let goal = Vec2::new(1000.0, 1000.0);

    let mut group = c.benchmark_group("search");
    for max_nodes in [3, 5, 7] {
        let config = SearchConfig {
            max_nodes,
            ..SearchConfig::default()
        };
        group.bench_with_input(
            BenchmarkId::new("exhaustive", max_nodes),
            &config,
            |b, config| b.iter(|| black_box(get_path(&graph, start, goal, config))),
        );
    }
    let config = SearchConfig {
        max_hops: 64,
        ..SearchConfig::default()
    };
    group.bench_function("greedy", |b| {
        b.iter(|| black_box(get_path_quick(&graph, start, goal, &config)));
    });
    group.bench_function("nearest", |b| {
        b.iter(|| black_box(get_nearest_node(&graph, goal, NearestQuery::default())));
    });
    group.finish();
}

criterion_group!(benches, generation_benchmark, search_benchmark);
criterion_main!(benches);
