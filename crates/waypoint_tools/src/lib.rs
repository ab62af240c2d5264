//! # Waypoint Development Tools
//!
//! Command-line tools for development:
//! - Level and config validation
//! - Graph statistics
//! - ASCII rendering of graphs and paths

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

use thiserror::Error;
use waypoint_core::error::NavError;
use waypoint_core::math::Vec2;

pub mod render;
pub mod report;
pub mod validate;

/// Errors raised by the tools on top of navigation errors.
#[derive(Debug, Error)]
pub enum ToolError {
    /// A command-line point was not of the form `x,y`.
    #[error("Invalid point '{0}': expected x,y")]
    InvalidPoint(String),

    /// Validation found problems.
    #[error("Validation failed with {0} problem(s)")]
    Invalid(usize),

    /// Failed to serialize output.
    #[error("Failed to serialize: {0}")]
    Serialize(String),

    /// Navigation library failure.
    #[error(transparent)]
    Nav(#[from] NavError),
}

/// Result type alias using [`ToolError`].
pub type Result<T> = std::result::Result<T, ToolError>;

/// Parse a point given as `x,y`.
///
/// # Errors
///
/// Returns [`ToolError::InvalidPoint`] if either coordinate is missing or not
/// a finite number.
pub fn parse_point(text: &str) -> Result<Vec2> {
    let invalid = || ToolError::InvalidPoint(text.to_string());
    let (x, y) = text.split_once(',').ok_or_else(invalid)?;
    let x: f64 = x.trim().parse().map_err(|_| invalid())?;
    let y: f64 = y.trim().parse().map_err(|_| invalid())?;
    let point = Vec2::new(x, y);
    if point.is_finite() {
        Ok(point)
    } else {
        Err(invalid())
    }
}
