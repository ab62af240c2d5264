//! Summary statistics for graphs and paths.

use std::fmt;

use serde::Serialize;
use waypoint_core::graph::{NavGraph, NodeId};

/// Shape of a generated graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphStats {
    /// Live nodes.
    pub nodes: usize,
    /// Directed edges.
    pub edges: usize,
    /// Nodes without outgoing edges.
    pub isolated: usize,
    /// Largest outgoing edge count.
    pub max_degree: usize,
    /// Mean outgoing edge count.
    pub mean_degree: f64,
    /// Segments holding at least one node.
    pub occupied_segments: usize,
    /// Segments in the level grid.
    pub segments: usize,
}

impl GraphStats {
    /// Collect statistics for `graph`.
    #[must_use]
    pub fn from_graph(graph: &NavGraph) -> Self {
        let degrees: Vec<usize> = graph.nodes().map(|n| n.edges().len()).collect();
        let edges: usize = degrees.iter().sum();
        let mut segments: Vec<_> = graph.nodes().map(|n| n.segment()).collect();
        segments.sort_unstable();
        segments.dedup();

        Self {
            nodes: degrees.len(),
            edges,
            isolated: degrees.iter().filter(|&&d| d == 0).count(),
            max_degree: degrees.iter().copied().max().unwrap_or(0),
            mean_degree: if degrees.is_empty() {
                0.0
            } else {
                edges as f64 / degrees.len() as f64
            },
            occupied_segments: segments.len(),
            segments: graph.geometry().segment_count(),
        }
    }
}

impl fmt::Display for GraphStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "nodes:     {}", self.nodes)?;
        writeln!(f, "edges:     {}", self.edges)?;
        writeln!(f, "isolated:  {}", self.isolated)?;
        writeln!(
            f,
            "degree:    max {}, mean {:.2}",
            self.max_degree, self.mean_degree
        )?;
        write!(
            f,
            "segments:  {} of {} occupied",
            self.occupied_segments, self.segments
        )
    }
}

/// Total travel distance along `path`, following node centers.
#[must_use]
pub fn path_length(graph: &NavGraph, path: &[NodeId]) -> f64 {
    graph
        .path_positions(path)
        .windows(2)
        .map(|w| w[0].distance(w[1]))
        .sum()
}
