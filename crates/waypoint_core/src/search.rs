//! Path queries over a [`NavGraph`].
//!
//! Two algorithms with different trade-offs:
//! - [`bounded_exhaustive_search`] - depth-bounded backtracking over every
//!   non-revisiting branch; picks the branch ending closest to the goal.
//!   Exponential in the bound, so keep the bound small.
//! - [`greedy_walk`] - repeatedly hops to the unvisited neighbour closest to
//!   the goal. Fast, but may stall or miss the goal.
//!
//! Neither is a shortest-path algorithm. Both are deterministic: neighbours
//! are visited in edge order and ties keep the earlier candidate.
//!
//! The two top-level queries differ in how they say "no path": [`get_path`]
//! returns `None`, [`get_path_quick`] returns an empty `Vec`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::graph::{NavGraph, NodeId};
use crate::math::Vec2;
use crate::nearest::{get_nearest_node, NearestQuery};

/// Hard ceiling on the exhaustive search bound, whatever the caller asks for.
pub const MAX_SEARCH_DEPTH: usize = 64;

/// Start or goal of a path query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Endpoint {
    /// A concrete node.
    Node(NodeId),
    /// A world position, resolved to its nearest node.
    Position(Vec2),
}

impl From<NodeId> for Endpoint {
    fn from(id: NodeId) -> Self {
        Self::Node(id)
    }
}

impl From<Vec2> for Endpoint {
    fn from(pos: Vec2) -> Self {
        Self::Position(pos)
    }
}

impl Endpoint {
    /// Resolve to a live node, if possible.
    #[must_use]
    pub fn resolve(self, graph: &NavGraph, nearest: NearestQuery) -> Option<NodeId> {
        match self {
            Self::Node(id) => graph.contains(id).then_some(id),
            Self::Position(pos) => get_nearest_node(graph, pos, nearest),
        }
    }
}

/// Bounds and lookup parameters for path queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Node budget of the exhaustive search (path length, start included).
    #[serde(default = "default_max_nodes")]
    pub max_nodes: usize,
    /// Hop budget of the greedy walk.
    #[serde(default = "default_max_hops")]
    pub max_hops: usize,
    /// Nearest-node lookup used to resolve positions.
    #[serde(default)]
    pub nearest: NearestQuery,
}

const fn default_max_nodes() -> usize {
    5
}

const fn default_max_hops() -> usize {
    10
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_nodes: default_max_nodes(),
            max_hops: default_max_hops(),
            nearest: NearestQuery::default(),
        }
    }
}

/// Exhaustive path query between nodes or positions.
///
/// Returns `None` if either endpoint cannot be resolved to a node. The path
/// starts at the start node and holds at most `config.max_nodes` nodes.
#[must_use]
pub fn get_path(
    graph: &NavGraph,
    start: impl Into<Endpoint>,
    goal: impl Into<Endpoint>,
    config: &SearchConfig,
) -> Option<Vec<NodeId>> {
    let (start, goal) = (start.into(), goal.into());
    let Some(start_node) = start.resolve(graph, config.nearest) else {
        debug!(?start, "path start unresolved");
        return None;
    };
    let Some(goal_node) = goal.resolve(graph, config.nearest) else {
        debug!(?goal, "path goal unresolved");
        return None;
    };

    Some(bounded_exhaustive_search(
        graph,
        start_node,
        goal_node,
        config.max_nodes,
    ))
}

/// Greedy path query between nodes or positions.
///
/// Returns an empty path if either endpoint cannot be resolved. Otherwise
/// the path lists the hops taken from the start node (excluding it).
#[must_use]
pub fn get_path_quick(
    graph: &NavGraph,
    start: impl Into<Endpoint>,
    goal: impl Into<Endpoint>,
    config: &SearchConfig,
) -> Vec<NodeId> {
    let (start, goal) = (start.into(), goal.into());
    let (Some(start_node), Some(goal_node)) = (
        start.resolve(graph, config.nearest),
        goal.resolve(graph, config.nearest),
    ) else {
        debug!(?start, ?goal, "quick path endpoints unresolved");
        return Vec::new();
    };

    greedy_walk(graph, start_node, goal_node, config.max_hops)
}

/// Depth-bounded backtracking search.
///
/// Every branch extends the current path with an outgoing neighbour not
/// already on it, until the path holds `max_nodes` nodes, reaches the goal,
/// or dead-ends. Of the finished branches, the one whose last node is
/// closest to the goal wins; an exact distance tie goes to the shorter path,
/// then to the earlier branch.
///
/// `start == goal` yields `[start]`; `max_nodes == 0` or a dead handle yields
/// an empty path. The bound is capped at [`MAX_SEARCH_DEPTH`].
#[must_use]
pub fn bounded_exhaustive_search(
    graph: &NavGraph,
    start: NodeId,
    goal: NodeId,
    max_nodes: usize,
) -> Vec<NodeId> {
    let max_nodes = max_nodes.min(MAX_SEARCH_DEPTH);
    let Some(goal_pos) = graph.node(goal).map(|n| n.position()) else {
        return Vec::new();
    };
    if max_nodes == 0 || !graph.contains(start) {
        return Vec::new();
    }

    let search = Backtrack {
        graph,
        goal,
        goal_pos,
        max_nodes,
    };
    let mut path = vec![start];
    search.explore(start, &mut path)
}

struct Backtrack<'a> {
    graph: &'a NavGraph,
    goal: NodeId,
    goal_pos: Vec2,
    max_nodes: usize,
}

impl Backtrack<'_> {
    fn distance_to_goal(&self, path: &[NodeId]) -> f64 {
        path.last()
            .and_then(|&id| self.graph.node(id))
            .map_or(f64::INFINITY, |n| n.position().distance(self.goal_pos))
    }

    /// Best completion of `path`, whose last node is `current`.
    ///
    /// `path` is shared by all branches; each branch pushes its node before
    /// recursing and pops it afterwards, so siblings never see each other.
    fn explore(&self, current: NodeId, path: &mut Vec<NodeId>) -> Vec<NodeId> {
        if path.len() >= self.max_nodes || current == self.goal {
            return path.clone();
        }
        let Some(node) = self.graph.node(current) else {
            return path.clone();
        };

        let mut best: Option<(Vec<NodeId>, f64)> = None;
        for next in node.neighbors() {
            if path.contains(&next) {
                continue;
            }

            path.push(next);
            let candidate = self.explore(next, path);
            path.pop();

            let dist = self.distance_to_goal(&candidate);
            let better = match &best {
                None => true,
                Some((kept, kept_dist)) => {
                    dist < *kept_dist || (dist == *kept_dist && candidate.len() < kept.len())
                }
            };
            if better {
                best = Some((candidate, dist));
            }
        }

        best.map_or_else(|| path.clone(), |(kept, _)| kept)
    }
}

/// Greedy best-first walk.
///
/// From the current node, hop to the outgoing neighbour closest to the goal
/// that is neither the start nor already on the path. The goal itself is
/// taken as soon as it is seen. Stops on reaching the goal, on a dead end,
/// or after `max_hops` hops.
///
/// The returned path excludes the start node: `start == goal` yields `[]`.
#[must_use]
pub fn greedy_walk(graph: &NavGraph, start: NodeId, goal: NodeId, max_hops: usize) -> Vec<NodeId> {
    let Some(goal_pos) = graph.node(goal).map(|n| n.position()) else {
        return Vec::new();
    };
    if start == goal || !graph.contains(start) {
        return Vec::new();
    }

    let mut path: Vec<NodeId> = Vec::new();
    let mut current = start;
    for _ in 0..max_hops {
        let Some(node) = graph.node(current) else {
            break;
        };

        let mut best: Option<(NodeId, f64)> = None;
        for next in node.neighbors() {
            if next == start || path.contains(&next) {
                continue;
            }
            if next == goal {
                best = Some((next, 0.0));
                break;
            }
            let Some(candidate) = graph.node(next) else {
                continue;
            };
            let dist = candidate.position().distance(goal_pos);
            if best.map_or(true, |(_, d)| dist < d) {
                best = Some((next, dist));
            }
        }

        let Some((next, _)) = best else {
            break;
        };
        path.push(next);
        current = next;
        if next == goal {
            break;
        }
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeSpec;
    use crate::level::TileLevel;

    fn empty_graph() -> NavGraph {
        let level = TileLevel::new(Vec2::ZERO, 8, 8, 50.0, 100.0).unwrap();
        NavGraph::new(&level)
    }

    fn node(graph: &mut NavGraph, x: f64, y: f64) -> NodeId {
        graph.add_node(NodeSpec::at(Vec2::new(x, y))).unwrap()
    }

    /// a - b - c - d along y = 25.
    fn line() -> (NavGraph, [NodeId; 4]) {
        let mut graph = empty_graph();
        let ids = [
            node(&mut graph, 25.0, 25.0),
            node(&mut graph, 75.0, 25.0),
            node(&mut graph, 125.0, 25.0),
            node(&mut graph, 175.0, 25.0),
        ];
        for pair in ids.windows(2) {
            graph.connect_pair(pair[0], pair[1]).unwrap();
        }
        (graph, ids)
    }

    #[test]
    fn test_trivial_paths() {
        let (graph, [a, ..]) = line();
        assert_eq!(bounded_exhaustive_search(&graph, a, a, 5), vec![a]);
        assert!(greedy_walk(&graph, a, a, 10).is_empty());
    }

    #[test]
    fn test_exhaustive_reaches_goal_within_bound() {
        let (graph, [a, b, c, d]) = line();
        assert_eq!(bounded_exhaustive_search(&graph, a, d, 5), vec![a, b, c, d]);
        assert_eq!(bounded_exhaustive_search(&graph, a, d, 2), vec![a, b]);
        assert_eq!(bounded_exhaustive_search(&graph, a, d, 1), vec![a]);
        assert!(bounded_exhaustive_search(&graph, a, d, 0).is_empty());
    }

    #[test]
    fn test_exhaustive_prefers_shorter_on_exact_tie() {
        let mut graph = empty_graph();
        let a = node(&mut graph, 25.0, 25.0);
        let b = node(&mut graph, 25.0, 75.0);
        let goal = node(&mut graph, 75.0, 25.0);
        // The detour branch is explored first.
        graph.add_edge(a, b).unwrap();
        graph.add_edge(a, goal).unwrap();
        graph.add_edge(b, goal).unwrap();

        assert_eq!(bounded_exhaustive_search(&graph, a, goal, 5), vec![a, goal]);
    }

    #[test]
    fn test_exhaustive_dead_end_is_a_candidate() {
        let mut graph = empty_graph();
        let a = node(&mut graph, 25.0, 25.0);
        let b = node(&mut graph, 75.0, 25.0);
        let unreachable = node(&mut graph, 375.0, 25.0);
        graph.connect_pair(a, b).unwrap();

        assert_eq!(bounded_exhaustive_search(&graph, a, unreachable, 5), vec![a, b]);

        let lonely = node(&mut graph, 25.0, 375.0);
        assert_eq!(
            bounded_exhaustive_search(&graph, lonely, unreachable, 5),
            vec![lonely]
        );
    }

    #[test]
    fn test_exhaustive_finds_detour_greedy_misses() {
        // start -> trap is closer to the goal but dead-ends; the other
        // branch goes around.
        let mut graph = empty_graph();
        let start = node(&mut graph, 25.0, 125.0);
        let trap = node(&mut graph, 125.0, 125.0);
        let up = node(&mut graph, 25.0, 25.0);
        let across = node(&mut graph, 225.0, 25.0);
        let goal = node(&mut graph, 225.0, 125.0);
        graph.connect_pair(start, trap).unwrap();
        graph.connect_pair(start, up).unwrap();
        graph.connect_pair(up, across).unwrap();
        graph.connect_pair(across, goal).unwrap();

        assert_eq!(
            bounded_exhaustive_search(&graph, start, goal, 5),
            vec![start, up, across, goal]
        );
        assert_eq!(greedy_walk(&graph, start, goal, 10), vec![trap]);
    }

    #[test]
    fn test_greedy_walks_line() {
        let (graph, [a, b, c, d]) = line();
        assert_eq!(greedy_walk(&graph, a, d, 10), vec![b, c, d]);
        assert_eq!(greedy_walk(&graph, a, d, 2), vec![b, c]);
        assert!(greedy_walk(&graph, a, d, 0).is_empty());
    }

    #[test]
    fn test_greedy_takes_goal_immediately() {
        let mut graph = empty_graph();
        let start = node(&mut graph, 125.0, 125.0);
        let goal = node(&mut graph, 175.0, 125.0);
        // `side` is listed first, but the goal short-circuits.
        let side = node(&mut graph, 175.0, 175.0);
        graph.add_edge(start, side).unwrap();
        graph.add_edge(start, goal).unwrap();

        assert_eq!(greedy_walk(&graph, start, goal, 10), vec![goal]);
    }

    #[test]
    fn test_greedy_never_reenters_start() {
        let mut graph = empty_graph();
        let start = node(&mut graph, 25.0, 25.0);
        let b = node(&mut graph, 75.0, 25.0);
        let goal = node(&mut graph, 375.0, 375.0);
        graph.connect_pair(start, b).unwrap();

        assert_eq!(greedy_walk(&graph, start, goal, 10), vec![b]);
    }

    #[test]
    fn test_queries_resolve_positions() {
        let (graph, [a, b, c, d]) = line();
        let config = SearchConfig::default();

        let path = get_path(&graph, Vec2::new(20.0, 30.0), Vec2::new(180.0, 20.0), &config);
        assert_eq!(path, Some(vec![a, b, c, d]));

        let quick = get_path_quick(&graph, a, Vec2::new(180.0, 20.0), &config);
        assert_eq!(quick, vec![b, c, d]);
    }

    #[test]
    fn test_unresolved_endpoints() {
        let (graph, [a, ..]) = line();
        let config = SearchConfig::default();
        // Bottom row: the clamped window around it holds no nodes.
        let nowhere = Vec2::new(380.0, 380.0);
        let nearest = NearestQuery {
            wrap: crate::nearest::SegmentWrap::Clamp,
            ..NearestQuery::default()
        };
        let config = SearchConfig { nearest, ..config };

        assert_eq!(get_path(&graph, a, nowhere, &config), None);
        assert!(get_path_quick(&graph, nowhere, a, &config).is_empty());
        assert_eq!(get_path(&graph, NodeId(77), a, &config), None);
        assert!(get_path_quick(&graph, a, NodeId(77), &config).is_empty());
    }
}
