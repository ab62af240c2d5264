//! Property-based tests for graph structure and path search.

use proptest::prelude::*;
use waypoint_core::prelude::*;
use waypoint_test_utils::determinism::strategies::{
    arb_connection_mode, arb_max_hops, arb_max_nodes, arb_solid_tiles,
};
use waypoint_test_utils::fixtures::{build_graph, generation, level_with_solid_tiles};
use waypoint_test_utils::invariants::{
    asymmetric_edges, dangling_edges, path_has_no_repeats, path_is_connected, self_loops,
};

const TILES: usize = 6;

fn random_graph(solid: &[(usize, usize)], mode: ConnectionMode) -> NavGraph {
    build_graph(
        &level_with_solid_tiles(TILES, TILES, solid),
        &generation(50.0, mode),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Edges always come in equal-length pairs and never loop back.
    #[test]
    fn prop_generated_edges_are_symmetric(
        solid in arb_solid_tiles(TILES, TILES),
        mode in arb_connection_mode(),
    ) {
        let graph = random_graph(&solid, mode);
        prop_assert!(asymmetric_edges(&graph).is_empty());
        prop_assert!(self_loops(&graph).is_empty());
    }

    /// The exhaustive search never exceeds its node budget.
    #[test]
    fn prop_exhaustive_path_respects_bound(
        solid in arb_solid_tiles(TILES, TILES),
        mode in arb_connection_mode(),
        max_nodes in arb_max_nodes(),
        pick in (any::<prop::sample::Index>(), any::<prop::sample::Index>()),
    ) {
        let graph = random_graph(&solid, mode);
        prop_assume!(!graph.is_empty());
        let ids = graph.node_ids();
        let (start, goal) = (*pick.0.get(ids), *pick.1.get(ids));

        let path = bounded_exhaustive_search(&graph, start, goal, max_nodes);
        prop_assert!(path.len() <= max_nodes);
        if max_nodes > 0 {
            prop_assert_eq!(path.first(), Some(&start));
        }
        prop_assert!(path_is_connected(&graph, &path));
        prop_assert!(path_has_no_repeats(&path));
    }

    /// The greedy walk never revisits a node and never returns to the start.
    #[test]
    fn prop_greedy_walk_never_revisits(
        solid in arb_solid_tiles(TILES, TILES),
        mode in arb_connection_mode(),
        max_hops in arb_max_hops(),
        pick in (any::<prop::sample::Index>(), any::<prop::sample::Index>()),
    ) {
        let graph = random_graph(&solid, mode);
        prop_assume!(!graph.is_empty());
        let ids = graph.node_ids();
        let (start, goal) = (*pick.0.get(ids), *pick.1.get(ids));

        let path = greedy_walk(&graph, start, goal, max_hops);
        prop_assert!(path.len() <= max_hops);
        prop_assert!(!path.contains(&start));
        prop_assert!(path_has_no_repeats(&path));

        let mut walked = vec![start];
        walked.extend(&path);
        prop_assert!(path_is_connected(&graph, &walked));
    }

    /// Deleting any node leaves no edge pointing at it.
    #[test]
    fn prop_deletion_leaves_no_dangling_edges(
        solid in arb_solid_tiles(TILES, TILES),
        mode in arb_connection_mode(),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut graph = random_graph(&solid, mode);
        prop_assume!(!graph.is_empty());
        let victim = *pick.get(graph.node_ids());
        let segment = graph.node(victim).map(Node::segment).unwrap();

        graph.remove_node(victim).unwrap();
        prop_assert!(dangling_edges(&graph).is_empty());
        prop_assert!(!graph.segment_nodes(segment).contains(&victim));
        prop_assert!(graph.nodes().all(|n| !n.has_edge_to(victim)));
    }

    /// A position on top of a node resolves to that node.
    #[test]
    fn prop_nearest_at_center_is_exact(
        solid in arb_solid_tiles(TILES, TILES),
        pick in any::<prop::sample::Index>(),
    ) {
        let graph = random_graph(&solid, ConnectionMode::CardinalOnly);
        prop_assume!(!graph.is_empty());
        let target = *pick.get(graph.node_ids());
        let pos = graph.node(target).unwrap().position();

        prop_assert_eq!(get_nearest_node(&graph, pos, NearestQuery::default()), Some(target));
    }
}
