//! The bundled demo level and config load, validate and build.

use waypoint_core::prelude::*;
use waypoint_test_utils::invariants::{asymmetric_edges, path_is_connected};
use waypoint_tools::render::render_ascii;
use waypoint_tools::report::GraphStats;
use waypoint_tools::validate::validate_level;

const LEVEL: &str = include_str!("../assets/demo_level.ron");
const CONFIG: &str = include_str!("../assets/demo_nav.ron");

fn demo() -> (TileLevel, NavConfig, NavGraph) {
    let data = LevelData::from_ron_str(LEVEL).unwrap();
    let config = NavConfig::from_ron_str(CONFIG).unwrap();
    assert!(validate_level(&data, &config).warnings.is_empty());

    let level = TileLevel::from_data(&data).unwrap();
    let mut world = LevelCollider::with_step(&level, config.collision_step);
    let mut graph = NavGraph::new(&level);
    generate_from_level(&mut graph, &level, &mut world, &config.generation).unwrap();
    (level, config, graph)
}

#[test]
fn test_demo_builds_one_node_per_open_tile() {
    let (_, _, graph) = demo();
    let stats = GraphStats::from_graph(&graph);
    assert_eq!(stats.nodes, 16 * 8 - 19);
    assert_eq!(stats.isolated, 0);
    assert!(asymmetric_edges(&graph).is_empty());
}

#[test]
fn test_demo_wall_only_opens_at_the_door() {
    let (level, _, graph) = demo();
    let text = render_ascii(&graph, &level, 32.0, &[]).unwrap();
    let rows: Vec<&str> = text.lines().collect();
    assert_eq!(rows.len(), 8);
    assert_eq!(rows[3], "#######oo#######");

    // Every edge across the wall row passes through a door tile.
    for (a, b) in graph.edge_segments() {
        let crosses = (a.y < 96.0 && b.y > 128.0) || (b.y < 96.0 && a.y > 128.0);
        assert!(!crosses, "edge {a} -> {b} jumps the wall");
    }
}

#[test]
fn test_demo_path_queries() {
    let (_, config, graph) = demo();
    let from = Vec2::new(240.0, 48.0);
    let to = Vec2::new(240.0, 176.0);

    let path = get_path(&graph, from, to, &config.search).unwrap();
    assert!(!path.is_empty() && path.len() <= config.search.max_nodes);
    assert!(path_is_connected(&graph, &path));

    let hops = get_path_quick(&graph, from, to, &config.search);
    assert!(hops.len() <= config.search.max_hops);
}
