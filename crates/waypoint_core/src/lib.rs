//! # Waypoint Core
//!
//! Navigation graph builder and path search for 2D levels.
//!
//! This crate contains **only** navigation logic:
//! - No rendering
//! - No global state (levels and collision services are passed in)
//! - No threads or async
//!
//! Level walkable space is sampled on a regular grid into nodes. Nodes are
//! joined by edges only when a probe the size of the node can travel the
//! straight line between them without being deflected. Paths are answered
//! by a bounded exhaustive search or a greedy walk.
//!
//! ## Crate Structure
//!
//! - [`math`] - Vectors and rectangles
//! - [`level`] - Level geometry services and the segment grid
//! - [`collision`] - Collision probe service
//! - [`graph`] - Node/edge arena
//! - [`builder`] - Grid sampling graph generation
//! - [`nearest`] - Nearest-node lookup
//! - [`search`] - Path queries
//! - [`config`] - RON-loadable configuration

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod builder;
pub mod collision;
pub mod config;
pub mod error;
pub mod graph;
pub mod level;
pub mod math;
pub mod nearest;
pub mod search;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::builder::{generate_from_level, GenerationConfig, GenerationReport};
    pub use crate::collision::{CollisionFilter, CollisionWorld, LevelCollider, MoveResult};
    pub use crate::config::NavConfig;
    pub use crate::error::{NavError, Result};
    pub use crate::graph::{ConnectionMode, Edge, NavGraph, Node, NodeId, NodeSpec, Zone};
    pub use crate::level::{Level, LevelData, LevelGeometry, MaskLevel, SegmentCoord, TileLevel};
    pub use crate::math::{Rect, Vec2};
    pub use crate::nearest::{get_nearest_node, NearestQuery, SegmentWrap};
    pub use crate::search::{
        bounded_exhaustive_search, get_path, get_path_quick, greedy_walk, Endpoint, SearchConfig,
    };
}
