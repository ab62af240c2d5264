//! Grid sampling graph builder.
//!
//! Walks a regular grid over the level bounds (x outer, y inner, both
//! ascending), skips solid cells, and creates one node per open cell. Each
//! node is connected as soon as it is created, so it can only link to nodes
//! that already exist; later nodes link back to it. The fixed iteration
//! order makes two builds of the same level identical.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::collision::{CollisionFilter, CollisionWorld};
use crate::error::{NavError, Result};
use crate::graph::{ConnectionMode, NavGraph, NodeId, NodeSpec};
use crate::level::Level;
use crate::math::Rect;

/// Parameters for [`generate_from_level`].
///
/// # Example RON
///
/// ```ron
/// GenerationConfig(
///     node_spacing: 50.0,
///     node_radius: 5.0,
///     mode: CardinalAndDiagonal,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Grid step in both axes.
    #[serde(default = "default_node_spacing")]
    pub node_spacing: f64,
    /// Radius of every generated node.
    #[serde(default = "default_node_radius")]
    pub node_radius: f64,
    /// Explicit connection radius; derived from the spacing when absent.
    #[serde(default)]
    pub connection_radius_override: Option<f64>,
    /// Directional filter for edges.
    #[serde(default)]
    pub mode: ConnectionMode,
    /// Geometry the edge probes collide with.
    #[serde(default)]
    pub collision: CollisionFilter,
}

const fn default_node_spacing() -> f64 {
    50.0
}

const fn default_node_radius() -> f64 {
    5.0
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            node_spacing: default_node_spacing(),
            node_radius: default_node_radius(),
            connection_radius_override: None,
            mode: ConnectionMode::default(),
            collision: CollisionFilter::default(),
        }
    }
}

impl GenerationConfig {
    /// Config with the given spacing and mode, other fields default.
    #[must_use]
    pub fn new(node_spacing: f64, mode: ConnectionMode) -> Self {
        Self {
            node_spacing,
            mode,
            ..Self::default()
        }
    }

    /// Connection radius of generated nodes.
    ///
    /// Without an override: the spacing, or the diagonal of one cell when
    /// the mode explicitly asks for diagonal edges.
    #[must_use]
    pub fn connection_radius(&self) -> f64 {
        if let Some(radius) = self.connection_radius_override {
            return radius;
        }
        let s = self.node_spacing;
        if self.mode.includes_diagonals() {
            (s * s + s * s).sqrt()
        } else {
            s
        }
    }

    /// Check the parameters before generation.
    pub fn validate(&self) -> Result<()> {
        if !(self.node_spacing > 0.0 && self.node_spacing.is_finite()) {
            return Err(NavError::Configuration(format!(
                "node spacing must be positive, got {}",
                self.node_spacing
            )));
        }
        if !(self.node_radius >= 0.0 && self.node_radius.is_finite()) {
            return Err(NavError::Configuration(format!(
                "node radius must be non-negative, got {}",
                self.node_radius
            )));
        }
        let reach = self.connection_radius();
        if !(reach >= 0.0 && reach.is_finite()) {
            return Err(NavError::Configuration(format!(
                "connection radius must be non-negative, got {reach}"
            )));
        }
        Ok(())
    }
}

/// Counts from one generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GenerationReport {
    /// Grid cells visited.
    pub cells: usize,
    /// Cells skipped as solid.
    pub solid_cells: usize,
    /// Nodes created.
    pub nodes_created: usize,
    /// Directed edges created.
    pub edges_created: usize,
}

/// Populate `graph` with one connected node per open grid cell of `level`.
///
/// On error, every node this call created is removed again, so the graph is
/// left as it was before the call.
///
/// # Errors
///
/// Returns a configuration error for invalid parameters or a graph built for
/// a different level layout. Level and collision service errors are passed
/// through unchanged.
pub fn generate_from_level<L, W>(
    graph: &mut NavGraph,
    level: &L,
    world: &mut W,
    config: &GenerationConfig,
) -> Result<GenerationReport>
where
    L: Level + ?Sized,
    W: CollisionWorld + ?Sized,
{
    config.validate()?;
    if graph.geometry() != &level.geometry() {
        return Err(NavError::Configuration(
            "graph was created for a different level layout".into(),
        ));
    }

    let edges_before = graph.edge_count();
    let mut created = Vec::new();
    match populate(graph, level, world, config, &mut created) {
        Ok(mut report) => {
            report.edges_created = graph.edge_count() - edges_before;
            info!(
                nodes = report.nodes_created,
                edges = report.edges_created,
                spacing = config.node_spacing,
                "navigation graph generated"
            );
            Ok(report)
        }
        Err(e) => {
            for id in created.into_iter().rev() {
                if let Err(err) = graph.remove_node(id) {
                    debug!(node = %id, error = %err, "rollback skipped node");
                }
            }
            Err(e)
        }
    }
}

fn populate<L, W>(
    graph: &mut NavGraph,
    level: &L,
    world: &mut W,
    config: &GenerationConfig,
    created: &mut Vec<NodeId>,
) -> Result<GenerationReport>
where
    L: Level + ?Sized,
    W: CollisionWorld + ?Sized,
{
    let bounds = level.geometry().bounds();
    let spacing = config.node_spacing;
    let columns = (bounds.w / spacing).floor() as usize;
    let rows = (bounds.h / spacing).floor() as usize;
    let reach = config.connection_radius();

    let mut report = GenerationReport::default();
    for x in 0..columns {
        for y in 0..rows {
            report.cells += 1;
            let cell = Rect::new(
                bounds.x + x as f64 * spacing,
                bounds.y + y as f64 * spacing,
                spacing,
                spacing,
            );

            let mask = level.sample_mask(cell);
            if level.is_solid(cell, mask.as_ref())? {
                report.solid_cells += 1;
                continue;
            }

            let id = graph.add_node(NodeSpec {
                position: cell.center(),
                radius: config.node_radius,
                connection_radius: reach,
                node_type: None,
                collision: config.collision,
            })?;
            created.push(id);
            report.nodes_created += 1;

            graph.connect(id, config.mode, world)?;
        }
    }

    debug!(
        cells = report.cells,
        solid = report.solid_cells,
        "grid sampling finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::{CollisionError, LevelCollider, MoveResult, ProbeHandle};
    use crate::level::{LevelError, LevelGeometry, MaskLevel, SampleMask, TileLevel};
    use crate::math::Vec2;

    fn open_level(tiles: usize) -> TileLevel {
        TileLevel::new(Vec2::ZERO, tiles, tiles, 50.0, 100.0).unwrap()
    }

    #[test]
    fn test_derived_connection_radius() {
        let cardinal = GenerationConfig::new(50.0, ConnectionMode::CardinalOnly);
        assert_eq!(cardinal.connection_radius(), 50.0);

        let all = GenerationConfig::new(50.0, ConnectionMode::AllDirections);
        assert_eq!(all.connection_radius(), 50.0);

        let diagonal = GenerationConfig::new(50.0, ConnectionMode::CardinalAndDiagonal);
        assert_eq!(diagonal.connection_radius(), 5000f64.sqrt());

        let explicit = GenerationConfig {
            connection_radius_override: Some(120.0),
            ..diagonal
        };
        assert_eq!(explicit.connection_radius(), 120.0);
    }

    #[test]
    fn test_non_positive_spacing_is_rejected() {
        let level = open_level(4);
        let mut world = LevelCollider::new(&level);
        let mut graph = NavGraph::new(&level);

        for spacing in [0.0, -10.0, f64::NAN] {
            let config = GenerationConfig::new(spacing, ConnectionMode::CardinalOnly);
            let err = generate_from_level(&mut graph, &level, &mut world, &config).unwrap_err();
            assert!(err.is_configuration());
        }
        assert!(graph.is_empty());
    }

    #[test]
    fn test_layout_mismatch_is_rejected() {
        let level = open_level(4);
        let other = open_level(6);
        let mut world = LevelCollider::new(&level);
        let mut graph = NavGraph::new(&other);

        let err =
            generate_from_level(&mut graph, &level, &mut world, &GenerationConfig::default())
                .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_diagonal_generation_connects_eight_ways() {
        let level = open_level(3);
        let mut world = LevelCollider::new(&level);
        let mut graph = NavGraph::new(&level);
        let config = GenerationConfig::new(50.0, ConnectionMode::CardinalAndDiagonal);

        let report = generate_from_level(&mut graph, &level, &mut world, &config).unwrap();
        assert_eq!(report.nodes_created, 9);
        // Center of the 3x3 grid is the fifth node in x-then-y order.
        let center = graph.node_ids()[4];
        assert_eq!(graph.node(center).unwrap().position(), Vec2::new(75.0, 75.0));
        assert_eq!(graph.node(center).unwrap().edges().len(), 8);
        assert_eq!(report.edges_created, graph.edge_count());
        assert_eq!(world.live_probes(), 0);
    }

    #[test]
    fn test_mask_level_skips_partially_solid_cells() {
        let mut level = MaskLevel::new(Vec2::ZERO, 100, 100, 50.0).unwrap();
        // One solid pixel in the corner of the top-right cell.
        level.set_pixel(99, 0, true);
        let mut world = LevelCollider::new(&level);
        let mut graph = NavGraph::new(&level);

        let report =
            generate_from_level(&mut graph, &level, &mut world, &GenerationConfig::default())
                .unwrap();
        assert_eq!(report.cells, 4);
        assert_eq!(report.solid_cells, 1);
        assert!(graph
            .nodes()
            .all(|n| n.position() != Vec2::new(75.0, 25.0)));
    }

    struct BrokenLevel(LevelGeometry);

    impl Level for BrokenLevel {
        fn geometry(&self) -> LevelGeometry {
            self.0
        }

        fn is_solid(&self, _rect: Rect, _mask: Option<&SampleMask>) -> std::result::Result<bool, LevelError> {
            Err(LevelError::Unavailable("collision map not loaded".into()))
        }
    }

    #[test]
    fn test_level_errors_propagate_unchanged() {
        let level = BrokenLevel(LevelGeometry::new(Vec2::ZERO, 100.0, 100.0, 50.0).unwrap());
        let open = TileLevel::new(Vec2::ZERO, 2, 2, 50.0, 50.0).unwrap();
        let mut world = LevelCollider::new(&open);
        let mut graph = NavGraph::new(&level);

        let err =
            generate_from_level(&mut graph, &level, &mut world, &GenerationConfig::default())
                .unwrap_err();
        assert!(matches!(err, NavError::Level(LevelError::Unavailable(_))));
        assert_eq!(err.to_string(), "Level collision unavailable: collision map not loaded");
    }

    /// Collision world that fails after a fixed number of probes.
    struct FlakyWorld {
        remaining: usize,
    }

    impl CollisionWorld for FlakyWorld {
        fn create_probe(
            &mut self,
            _rect: Rect,
            _filter: CollisionFilter,
        ) -> std::result::Result<ProbeHandle, CollisionError> {
            if self.remaining == 0 {
                return Err(CollisionError::UnknownProbe(ProbeHandle(0)));
            }
            self.remaining -= 1;
            Ok(ProbeHandle(0))
        }

        fn move_probe(
            &mut self,
            _probe: ProbeHandle,
            _delta: Vec2,
        ) -> std::result::Result<MoveResult, CollisionError> {
            Ok(MoveResult {
                moved_x: true,
                moved_y: true,
                end: Rect::default(),
            })
        }

        fn destroy_probe(&mut self, _probe: ProbeHandle) -> std::result::Result<(), CollisionError> {
            Ok(())
        }

        fn live_probes(&self) -> usize {
            0
        }
    }

    #[test]
    fn test_failed_generation_rolls_back() {
        let level = open_level(4);
        let mut graph = NavGraph::new(&level);
        let keep = graph.add_node(NodeSpec::at(Vec2::new(10.0, 10.0))).unwrap();
        let mut world = FlakyWorld { remaining: 3 };

        let err =
            generate_from_level(&mut graph, &level, &mut world, &GenerationConfig::default())
                .unwrap_err();
        assert!(matches!(err, NavError::Collision(_)));
        assert_eq!(graph.node_ids(), &[keep]);
        assert_eq!(graph.edge_count(), 0);
    }
}
