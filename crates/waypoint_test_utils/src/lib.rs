//! # Waypoint Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Level fixtures and graph builders
//! - Determinism harness (graph fingerprints, repeated builds)
//! - Graph invariant checks
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod determinism;
pub mod fixtures;
pub mod invariants;

/// Re-export proptest for convenience.
pub use proptest;
