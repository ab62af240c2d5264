//! Collision probe service used to validate candidate edges.
//!
//! A probe is a temporary collider: it is created at a rectangle, commanded
//! to move by a displacement, and destroyed. The move reports per axis
//! whether motion along that axis was ever obstructed.
//!
//! [`LevelCollider`] is the in-crate implementation backed by a [`Level`].
//! It sweeps the probe in small axis-separated steps (x, then y), so thin
//! walls are not tunnelled through.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::level::{Level, LevelError};
use crate::math::{Rect, Vec2};

/// Default sweep step of [`LevelCollider`] in world units.
pub const DEFAULT_SWEEP_STEP: f64 = 1.0;

/// Errors reported by collision services.
#[derive(Debug, Error)]
pub enum CollisionError {
    /// The handle does not name a live probe.
    #[error("Unknown collision probe: {0:?}")]
    UnknownProbe(ProbeHandle),

    /// Level geometry failed while resolving a move.
    #[error(transparent)]
    Level(#[from] LevelError),
}

/// Which geometry a probe collides with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollisionFilter {
    /// Collide with solid level geometry.
    #[serde(default = "default_true")]
    pub levels: bool,
    /// Treat leaving the level bounds as a collision.
    #[serde(default = "default_true")]
    pub border: bool,
}

const fn default_true() -> bool {
    true
}

impl Default for CollisionFilter {
    fn default() -> Self {
        Self {
            levels: true,
            border: true,
        }
    }
}

/// Handle to a live probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProbeHandle(pub u32);

/// Outcome of a probe move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveResult {
    /// Motion along x was never obstructed.
    pub moved_x: bool,
    /// Motion along y was never obstructed.
    pub moved_y: bool,
    /// Where the probe ended up.
    pub end: Rect,
}

impl MoveResult {
    /// Both axes moved freely: the probe travelled the straight line.
    #[must_use]
    pub const fn unobstructed(&self) -> bool {
        self.moved_x && self.moved_y
    }
}

/// Collision service that can host temporary probes.
pub trait CollisionWorld {
    /// Register a probe occupying `rect`.
    fn create_probe(&mut self, rect: Rect, filter: CollisionFilter)
        -> Result<ProbeHandle, CollisionError>;

    /// Move a probe by `delta`, resolving collisions along the way.
    fn move_probe(&mut self, probe: ProbeHandle, delta: Vec2) -> Result<MoveResult, CollisionError>;

    /// Unregister a probe.
    fn destroy_probe(&mut self, probe: ProbeHandle) -> Result<(), CollisionError>;

    /// Number of probes currently registered.
    fn live_probes(&self) -> usize;
}

/// Create a probe at `rect`, move it by `delta`, and destroy it.
///
/// The probe is destroyed even when the move fails; the move's error wins.
pub fn probe_straight_line<W>(
    world: &mut W,
    rect: Rect,
    delta: Vec2,
    filter: CollisionFilter,
) -> Result<MoveResult, CollisionError>
where
    W: CollisionWorld + ?Sized,
{
    let probe = world.create_probe(rect, filter)?;
    let moved = world.move_probe(probe, delta);
    let destroyed = world.destroy_probe(probe);
    let result = moved?;
    destroyed?;
    Ok(result)
}

#[derive(Debug, Clone, Copy)]
struct Probe {
    rect: Rect,
    filter: CollisionFilter,
}

/// Collision world that resolves probe moves against a level's geometry.
#[derive(Debug)]
pub struct LevelCollider<'a, L: Level> {
    level: &'a L,
    bounds: Rect,
    step: f64,
    probes: Vec<Option<Probe>>,
    free: Vec<u32>,
}

impl<'a, L: Level> LevelCollider<'a, L> {
    /// Collider with the default sweep step.
    pub fn new(level: &'a L) -> Self {
        Self::with_step(level, DEFAULT_SWEEP_STEP)
    }

    /// Collider sweeping at most `step` world units per sub-move.
    ///
    /// Non-positive or non-finite steps fall back to [`DEFAULT_SWEEP_STEP`].
    pub fn with_step(level: &'a L, step: f64) -> Self {
        let step = if step > 0.0 && step.is_finite() {
            step
        } else {
            DEFAULT_SWEEP_STEP
        };
        Self {
            level,
            bounds: level.geometry().bounds(),
            step,
            probes: Vec::new(),
            free: Vec::new(),
        }
    }

    fn collides(&self, rect: Rect, filter: CollisionFilter) -> Result<bool, CollisionError> {
        if filter.border && !self.bounds.contains_rect(&rect) {
            return Ok(true);
        }
        if filter.levels && self.level.is_solid(rect, None)? {
            return Ok(true);
        }
        Ok(false)
    }

    fn probe(&self, handle: ProbeHandle) -> Result<Probe, CollisionError> {
        self.probes
            .get(handle.0 as usize)
            .copied()
            .flatten()
            .ok_or(CollisionError::UnknownProbe(handle))
    }
}

impl<L: Level> CollisionWorld for LevelCollider<'_, L> {
    fn create_probe(
        &mut self,
        rect: Rect,
        filter: CollisionFilter,
    ) -> Result<ProbeHandle, CollisionError> {
        let probe = Some(Probe { rect, filter });
        if let Some(slot) = self.free.pop() {
            self.probes[slot as usize] = probe;
            Ok(ProbeHandle(slot))
        } else {
            self.probes.push(probe);
            Ok(ProbeHandle(self.probes.len() as u32 - 1))
        }
    }

    fn move_probe(&mut self, handle: ProbeHandle, delta: Vec2) -> Result<MoveResult, CollisionError> {
        let Probe { mut rect, filter } = self.probe(handle)?;

        let longest = delta.x.abs().max(delta.y.abs());
        let steps = (longest / self.step).ceil().max(1.0) as u32;
        let step_x = delta.x / f64::from(steps);
        let step_y = delta.y / f64::from(steps);

        let mut moved_x = true;
        let mut moved_y = true;
        for _ in 0..steps {
            if moved_x && step_x != 0.0 {
                let next = rect.translate(Vec2::new(step_x, 0.0));
                if self.collides(next, filter)? {
                    moved_x = false;
                } else {
                    rect = next;
                }
            }
            if moved_y && step_y != 0.0 {
                let next = rect.translate(Vec2::new(0.0, step_y));
                if self.collides(next, filter)? {
                    moved_y = false;
                } else {
                    rect = next;
                }
            }
            if !moved_x && !moved_y {
                break;
            }
        }

        self.probes[handle.0 as usize] = Some(Probe { rect, filter });
        Ok(MoveResult {
            moved_x,
            moved_y,
            end: rect,
        })
    }

    fn destroy_probe(&mut self, handle: ProbeHandle) -> Result<(), CollisionError> {
        self.probe(handle)?;
        self.probes[handle.0 as usize] = None;
        self.free.push(handle.0);
        Ok(())
    }

    fn live_probes(&self) -> usize {
        self.probes.iter().filter(|p| p.is_some()).count()
    }
}
