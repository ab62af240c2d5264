//! Structural checks over a built graph.
//!
//! Each check returns the offending items instead of panicking, so tests can
//! both assert on them and print them.

use waypoint_core::graph::{NavGraph, NodeId};

/// Edges `a -> b` whose reverse `b -> a` is missing or has a different
/// distance.
#[must_use]
pub fn asymmetric_edges(graph: &NavGraph) -> Vec<(NodeId, NodeId)> {
    let mut out = Vec::new();
    for node in graph.nodes() {
        for edge in node.edges() {
            let reverse = graph
                .node(edge.to)
                .and_then(|t| t.edges().iter().find(|r| r.to == edge.from));
            match reverse {
                Some(r) if r.distance == edge.distance => {}
                _ => out.push((edge.from, edge.to)),
            }
        }
    }
    out
}

/// Nodes holding an edge to themselves.
#[must_use]
pub fn self_loops(graph: &NavGraph) -> Vec<NodeId> {
    graph
        .nodes()
        .filter(|n| n.edges().iter().any(|e| e.to == n.id()))
        .map(|n| n.id())
        .collect()
}

/// Edges whose source field does not match the node holding them, or whose
/// target is not a live node.
#[must_use]
pub fn dangling_edges(graph: &NavGraph) -> Vec<(NodeId, NodeId)> {
    graph
        .nodes()
        .flat_map(|n| {
            n.edges()
                .iter()
                .filter(move |e| e.from != n.id() || !graph.contains(e.to))
                .map(|e| (e.from, e.to))
        })
        .collect()
}

/// Live nodes that are missing from their segment, or listed in some other
/// segment as well.
#[must_use]
pub fn misfiled_nodes(graph: &NavGraph) -> Vec<NodeId> {
    let geo = graph.geometry();
    let mut out = Vec::new();
    for node in graph.nodes() {
        let mut homes = 0;
        let mut in_own = false;
        for sx in 0..geo.columns {
            for sy in 0..geo.rows {
                let segment = waypoint_core::level::SegmentCoord::new(sx, sy);
                let count = graph
                    .segment_nodes(segment)
                    .iter()
                    .filter(|&&id| id == node.id())
                    .count();
                homes += count;
                if segment == node.segment() && count == 1 {
                    in_own = true;
                }
            }
        }
        if homes != 1 || !in_own {
            out.push(node.id());
        }
    }
    out
}

/// Returns true if consecutive path nodes are joined by an edge.
#[must_use]
pub fn path_is_connected(graph: &NavGraph, path: &[NodeId]) -> bool {
    path.windows(2).all(|w| {
        graph
            .node(w[0])
            .is_some_and(|n| n.has_edge_to(w[1]))
    })
}

/// Returns true if no node appears twice in the path.
#[must_use]
pub fn path_has_no_repeats(path: &[NodeId]) -> bool {
    let mut seen: Vec<NodeId> = path.to_vec();
    seen.sort_unstable();
    seen.windows(2).all(|w| w[0] != w[1])
}
