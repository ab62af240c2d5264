//! Determinism testing utilities.
//!
//! Graph generation and path queries must give identical results for
//! identical inputs. Sources of non-determinism to watch for:
//!
//! - **Iteration order**: generation walks cells x-major and candidates in
//!   segment insertion order; nothing may iterate a `HashMap`.
//! - **Float formatting**: fingerprints hash raw `f64` bits, so two graphs
//!   only match when every position and distance is bit-identical.
//! - **Shared state**: levels and collision worlds are passed in, never
//!   global.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use waypoint_core::graph::{NavGraph, NodeId};

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Fingerprint from each run.
    pub hashes: Vec<u64>,
    /// Number of runs performed.
    pub runs: usize,
}

impl DeterminismResult {
    fn from_hashes(hashes: Vec<u64>) -> Self {
        Self {
            is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
            runs: hashes.len(),
            hashes,
        }
    }

    /// Get all unique hashes (should be 1 for a deterministic build).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run matched, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different fingerprints.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Graph build is non-deterministic!\n\
                 Runs: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.runs,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run `setup` repeatedly and compare the fingerprint of each result.
///
/// # Example
///
/// ```ignore
/// use waypoint_test_utils::determinism::{graph_fingerprint, verify_determinism};
/// use waypoint_test_utils::fixtures::cardinal_grid;
///
/// let result = verify_determinism(5, || cardinal_grid(4, 4), graph_fingerprint);
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, HashFn>(
    runs: usize,
    setup: Setup,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    HashFn: Fn(&S) -> u64,
{
    let hashes = (0..runs).map(|_| hash(&setup())).collect();
    DeterminismResult::from_hashes(hashes)
}

/// Build `runs` graphs on separate threads and compare their fingerprints.
///
/// # Panics
///
/// Panics if a build thread panics.
pub fn run_parallel_builds<F>(setup: F, runs: usize) -> DeterminismResult
where
    F: Fn() -> NavGraph + Sync,
{
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..runs)
            .map(|_| s.spawn(|| graph_fingerprint(&setup())))
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("graph build thread panicked"))
            .collect()
    });

    let result = DeterminismResult::from_hashes(hashes);
    if !result.is_deterministic {
        tracing::warn!(runs, unique = result.unique_hashes().len(), "parallel builds diverged");
    }
    result
}

/// Compare two graphs node by node, in handle order.
///
/// # Returns
///
/// `None` if the graphs are identical, otherwise the first handle whose
/// node (or absence) differs.
#[must_use]
pub fn find_first_difference(a: &NavGraph, b: &NavGraph) -> Option<NodeId> {
    let mut ids: Vec<NodeId> = a.node_ids().iter().chain(b.node_ids()).copied().collect();
    ids.sort_unstable();
    ids.dedup();
    ids.into_iter()
        .find(|&id| node_fingerprint(a, id) != node_fingerprint(b, id))
}

/// Hash of everything observable about a graph.
///
/// Covers node handles in creation order, exact position and radius bits,
/// segment placement, and every edge with its distance and angle bits.
#[must_use]
pub fn graph_fingerprint(graph: &NavGraph) -> u64 {
    let mut hasher = DefaultHasher::new();
    graph.node_count().hash(&mut hasher);
    for &id in graph.node_ids() {
        node_fingerprint(graph, id).hash(&mut hasher);
    }
    hasher.finish()
}

fn node_fingerprint(graph: &NavGraph, id: NodeId) -> Option<u64> {
    let node = graph.node(id)?;
    let mut hasher = DefaultHasher::new();
    node.id().hash(&mut hasher);
    node.position().x.to_bits().hash(&mut hasher);
    node.position().y.to_bits().hash(&mut hasher);
    node.radius().to_bits().hash(&mut hasher);
    node.connection_radius().to_bits().hash(&mut hasher);
    node.segment().hash(&mut hasher);
    for edge in node.edges() {
        edge.to.hash(&mut hasher);
        edge.distance.to_bits().hash(&mut hasher);
        edge.angle.to_bits().hash(&mut hasher);
    }
    Some(hasher.finish())
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for level and query inputs.
pub mod strategies {
    use proptest::prelude::*;
    use waypoint_core::graph::ConnectionMode;

    /// Any connection mode.
    pub fn arb_connection_mode() -> impl Strategy<Value = ConnectionMode> {
        prop_oneof![
            Just(ConnectionMode::AllDirections),
            Just(ConnectionMode::CardinalOnly),
            Just(ConnectionMode::DiagonalOnly),
            Just(ConnectionMode::CardinalAndDiagonal),
        ]
    }

    /// Solid tile coordinates inside a `tiles_wide` x `tiles_high` level.
    ///
    /// At most a third of the tiles are solid.
    pub fn arb_solid_tiles(
        tiles_wide: usize,
        tiles_high: usize,
    ) -> impl Strategy<Value = Vec<(usize, usize)>> {
        let max = (tiles_wide * tiles_high / 3).max(1);
        prop::collection::vec((0..tiles_wide, 0..tiles_high), 0..max)
    }

    /// Exhaustive search node budget.
    ///
    /// Range: 0 to 6, small enough to keep the search cheap.
    pub fn arb_max_nodes() -> impl Strategy<Value = usize> {
        0usize..=6
    }

    /// Greedy walk hop budget.
    pub fn arb_max_hops() -> impl Strategy<Value = usize> {
        0usize..=40
    }
}
