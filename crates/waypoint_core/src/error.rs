//! Error types for graph construction and path queries.

use thiserror::Error;

use crate::collision::CollisionError;
use crate::graph::NodeId;
use crate::level::LevelError;

/// Result type alias using [`NavError`].
pub type Result<T> = std::result::Result<T, NavError>;

/// Top-level error type for navigation graph operations.
///
/// Path queries never return this for an unresolvable start or goal; they
/// report "no path" through `Option`/empty results instead.
#[derive(Debug, Error)]
pub enum NavError {
    /// Invalid construction parameters.
    #[error("Invalid navigation configuration: {0}")]
    Configuration(String),

    /// A node position maps outside the level's segment grid.
    #[error("Segment ({sx}, {sy}) is outside the {columns}x{rows} segment grid")]
    SegmentOutOfBounds {
        /// Segment column computed from the position.
        sx: i64,
        /// Segment row computed from the position.
        sy: i64,
        /// Segment columns in the level.
        columns: usize,
        /// Segment rows in the level.
        rows: usize,
    },

    /// The handle does not name a live node in this graph.
    #[error("Node not found: {0}")]
    UnknownNode(NodeId),

    /// Level geometry service failure, passed through unchanged.
    #[error(transparent)]
    Level(#[from] LevelError),

    /// Collision service failure, passed through unchanged.
    #[error(transparent)]
    Collision(#[from] CollisionError),

    /// Failed to read or parse a RON file.
    #[error("Failed to load '{path}': {message}")]
    ConfigLoad {
        /// Path to the file that failed to load.
        path: String,
        /// Error message.
        message: String,
    },
}

impl NavError {
    /// Returns true for errors caused by invalid construction parameters.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_) | Self::SegmentOutOfBounds { .. }
        )
    }
}
