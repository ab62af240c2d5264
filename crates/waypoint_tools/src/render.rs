//! Terminal rendering of a graph and an optional path.
//!
//! The level is drawn as a character grid, one character per `cell` world
//! units, top row first.

use waypoint_core::error::NavError;
use waypoint_core::graph::{NavGraph, NodeId};
use waypoint_core::level::Level;
use waypoint_core::math::Rect;

use crate::Result;

/// Open cell.
pub const OPEN: char = '.';
/// Solid cell.
pub const SOLID: char = '#';
/// Node with at least one edge.
pub const NODE: char = 'o';
/// Node without edges.
pub const ISOLATED: char = 'x';
/// Interior path node.
pub const PATH: char = '*';
/// First path node.
pub const START: char = 'S';
/// Last path node.
pub const GOAL: char = 'G';

/// Render `graph` over `level`, marking the nodes of `path`.
///
/// A cell shows the highest-priority glyph among the nodes whose centers
/// fall inside it: path ends, then path interior, then plain nodes. Cells
/// without nodes show whether the level is solid there.
///
/// # Errors
///
/// Returns a configuration error if `cell` is not positive, and passes
/// through level service failures.
pub fn render_ascii<L>(graph: &NavGraph, level: &L, cell: f64, path: &[NodeId]) -> Result<String>
where
    L: Level + ?Sized,
{
    if !(cell > 0.0 && cell.is_finite()) {
        return Err(
            NavError::Configuration(format!("cell size must be positive, got {cell}")).into(),
        );
    }

    let bounds = graph.geometry().bounds();
    let columns = (bounds.w / cell).ceil() as usize;
    let rows = (bounds.h / cell).ceil() as usize;

    let mut glyphs: Vec<Option<char>> = vec![None; columns * rows];
    for node in graph.nodes() {
        let pos = node.position();
        let cx = ((pos.x - bounds.x) / cell).floor();
        let cy = ((pos.y - bounds.y) / cell).floor();
        if cx < 0.0 || cy < 0.0 || cx as usize >= columns || cy as usize >= rows {
            continue;
        }
        let slot = &mut glyphs[cy as usize * columns + cx as usize];
        let glyph = glyph_for(node.id(), node.edges().is_empty(), path);
        if slot.map_or(true, |held| priority(glyph) > priority(held)) {
            *slot = Some(glyph);
        }
    }

    let mut out = String::with_capacity((columns + 1) * rows);
    for cy in 0..rows {
        for cx in 0..columns {
            let glyph = match glyphs[cy * columns + cx] {
                Some(glyph) => glyph,
                None => {
                    let rect = Rect::new(
                        bounds.x + cx as f64 * cell,
                        bounds.y + cy as f64 * cell,
                        cell,
                        cell,
                    );
                    let mask = level.sample_mask(rect);
                    if level.is_solid(rect, mask.as_ref()).map_err(NavError::from)? {
                        SOLID
                    } else {
                        OPEN
                    }
                }
            };
            out.push(glyph);
        }
        out.push('\n');
    }
    Ok(out)
}

fn glyph_for(id: NodeId, isolated: bool, path: &[NodeId]) -> char {
    if path.first() == Some(&id) {
        START
    } else if path.last() == Some(&id) {
        GOAL
    } else if path.contains(&id) {
        PATH
    } else if isolated {
        ISOLATED
    } else {
        NODE
    }
}

const fn priority(glyph: char) -> u8 {
    match glyph {
        START | GOAL => 3,
        PATH => 2,
        NODE | ISOLATED => 1,
        _ => 0,
    }
}
