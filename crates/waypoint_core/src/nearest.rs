//! Nearest-node lookup over a window of spatial segments.
//!
//! The window spans `2 * max_segment_offset` segments per axis, starting
//! `max_segment_offset` segments before the position's own segment. For the
//! default offset of 2 that is the segments `[s - 2, s + 1]` on each axis.

use serde::{Deserialize, Serialize};

use crate::graph::{NavGraph, NodeId};
use crate::math::Vec2;

/// How window segments beyond the grid edge are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SegmentWrap {
    /// Indices wrap around the grid (toroidal levels).
    #[default]
    Toroidal,
    /// Segments outside the grid are skipped.
    Clamp,
}

/// Parameters for [`get_nearest_node`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NearestQuery {
    /// Window half-extent in segments.
    pub max_segment_offset: usize,
    /// Edge handling for the window.
    pub wrap: SegmentWrap,
}

impl Default for NearestQuery {
    fn default() -> Self {
        Self {
            max_segment_offset: 2,
            wrap: SegmentWrap::Toroidal,
        }
    }
}

/// Find the node whose center is closest to `pos` within the segment window.
///
/// Ties go to the first node encountered: window columns ascending, then
/// rows ascending, then segment insertion order. Returns `None` if the
/// window holds no nodes.
#[must_use]
pub fn get_nearest_node(graph: &NavGraph, pos: Vec2, query: NearestQuery) -> Option<NodeId> {
    let geo = graph.geometry();
    if !pos.is_finite() || geo.columns == 0 || geo.rows == 0 {
        return None;
    }

    let offset = query.max_segment_offset as i64;
    let (base_x, base_y) = geo.segment_index(pos);
    let first_x = base_x - offset;
    let first_y = base_y - offset;

    let resolve = |index: i64, count: usize| -> Option<i64> {
        match query.wrap {
            SegmentWrap::Toroidal => Some(index.rem_euclid(count as i64)),
            SegmentWrap::Clamp => (index >= 0 && index < count as i64).then_some(index),
        }
    };

    let mut best: Option<(NodeId, f64)> = None;
    for ax in 0..offset * 2 {
        let Some(sx) = resolve(first_x + ax, geo.columns) else {
            continue;
        };
        for ay in 0..offset * 2 {
            let Some(sy) = resolve(first_y + ay, geo.rows) else {
                continue;
            };
            let Some(segment) = geo.checked_segment(sx, sy) else {
                continue;
            };

            for &id in graph.segment_nodes(segment) {
                let Some(node) = graph.node(id) else {
                    continue;
                };
                let dist = pos.distance(node.position());
                if best.map_or(true, |(_, d)| dist < d) {
                    best = Some((id, dist));
                }
            }
        }
    }

    best.map(|(id, _)| id)
}
