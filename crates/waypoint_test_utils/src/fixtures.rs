//! Test fixtures and helpers.
//!
//! Pre-built levels and graphs for consistent testing. Every level uses
//! 50-unit tiles and 100-unit segments unless stated otherwise.

use waypoint_core::builder::{generate_from_level, GenerationConfig};
use waypoint_core::collision::LevelCollider;
use waypoint_core::graph::{ConnectionMode, NavGraph, NodeId};
use waypoint_core::level::{Level, TileLevel};
use waypoint_core::math::Vec2;

/// Tile side length used by the fixtures.
pub const TILE: f64 = 50.0;

/// Segment side length used by the fixtures.
pub const SEGMENT: f64 = 100.0;

/// All-open level of `tiles_wide` x `tiles_high` tiles at the origin.
///
/// # Panics
///
/// Panics if either dimension is zero.
#[must_use]
pub fn open_level(tiles_wide: usize, tiles_high: usize) -> TileLevel {
    TileLevel::new(Vec2::ZERO, tiles_wide, tiles_high, TILE, SEGMENT)
        .expect("fixture level dimensions must be non-zero")
}

/// Open level with tile row `solid_row` fully solid.
#[must_use]
pub fn level_with_solid_row(tiles_wide: usize, tiles_high: usize, solid_row: usize) -> TileLevel {
    let mut level = open_level(tiles_wide, tiles_high);
    for tx in 0..tiles_wide {
        level.set_solid(tx, solid_row, true);
    }
    level
}

/// Open level with the listed tiles solid.
#[must_use]
pub fn level_with_solid_tiles(
    tiles_wide: usize,
    tiles_high: usize,
    solid: &[(usize, usize)],
) -> TileLevel {
    let mut level = open_level(tiles_wide, tiles_high);
    for &(tx, ty) in solid {
        level.set_solid(tx, ty, true);
    }
    level
}

/// Generation settings: the given spacing and mode, 5-unit nodes.
#[must_use]
pub fn generation(spacing: f64, mode: ConnectionMode) -> GenerationConfig {
    GenerationConfig::new(spacing, mode)
}

/// Build a graph for `level` with a fresh level collider.
///
/// # Panics
///
/// Panics if generation fails.
#[must_use]
pub fn build_graph<L: Level>(level: &L, config: &GenerationConfig) -> NavGraph {
    let mut world = LevelCollider::new(level);
    let mut graph = NavGraph::new(level);
    generate_from_level(&mut graph, level, &mut world, config)
        .expect("fixture graph generation failed");
    graph
}

/// Default generation setup: spacing 50, cardinal edges.
#[must_use]
pub fn cardinal_grid(tiles_wide: usize, tiles_high: usize) -> NavGraph {
    build_graph(
        &open_level(tiles_wide, tiles_high),
        &generation(TILE, ConnectionMode::CardinalOnly),
    )
}

/// Handle of the node centered exactly at `(x, y)`.
///
/// # Panics
///
/// Panics if there is no such node.
#[must_use]
pub fn node_at(graph: &NavGraph, x: f64, y: f64) -> NodeId {
    let pos = Vec2::new(x, y);
    graph
        .nodes()
        .find(|n| n.position() == pos)
        .map(|n| n.id())
        .unwrap_or_else(|| panic!("no node at {pos}"))
}
