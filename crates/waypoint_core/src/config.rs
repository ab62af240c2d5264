//! Top-level navigation configuration, loadable from RON.
//!
//! Every field has a default, so a partial file only overrides what it
//! names.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::builder::GenerationConfig;
use crate::collision::DEFAULT_SWEEP_STEP;
use crate::error::{NavError, Result};
use crate::search::SearchConfig;

/// Graph generation, collision and path query settings.
///
/// # Example RON
///
/// ```ron
/// NavConfig(
///     generation: (
///         node_spacing: 50.0,
///         mode: CardinalOnly,
///         collision: (levels: true, border: true),
///     ),
///     search: (
///         max_nodes: 5,
///         max_hops: 10,
///         nearest: (max_segment_offset: 2, wrap: Toroidal),
///     ),
///     collision_step: 1.0,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavConfig {
    /// Grid generation parameters.
    #[serde(default)]
    pub generation: GenerationConfig,
    /// Path query parameters.
    #[serde(default)]
    pub search: SearchConfig,
    /// Sweep step of the level collider in world units.
    #[serde(default = "default_collision_step")]
    pub collision_step: f64,
}

const fn default_collision_step() -> f64 {
    DEFAULT_SWEEP_STEP
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            generation: GenerationConfig::default(),
            search: SearchConfig::default(),
            collision_step: default_collision_step(),
        }
    }
}

impl NavConfig {
    /// Parse a configuration from RON text and validate it.
    pub fn from_ron_str(source: &str) -> Result<Self> {
        let config: Self = ron::from_str(source).map_err(|e| NavError::ConfigLoad {
            path: "<string>".into(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| NavError::ConfigLoad {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config: Self = ron::from_str(&contents).map_err(|e| NavError::ConfigLoad {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check every section.
    pub fn validate(&self) -> Result<()> {
        self.generation.validate()?;
        if !(self.collision_step > 0.0 && self.collision_step.is_finite()) {
            return Err(NavError::Configuration(format!(
                "collision step must be positive, got {}",
                self.collision_step
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ConnectionMode;
    use crate::nearest::SegmentWrap;

    #[test]
    fn test_defaults() {
        let config = NavConfig::default();
        assert_eq!(config.generation.node_spacing, 50.0);
        assert_eq!(config.generation.mode, ConnectionMode::CardinalOnly);
        assert_eq!(config.search.max_nodes, 5);
        assert_eq!(config.search.max_hops, 10);
        assert_eq!(config.search.nearest.max_segment_offset, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let config = NavConfig::from_ron_str(
            "(generation: (node_spacing: 32.0, mode: AllDirections), search: (nearest: (max_segment_offset: 3, wrap: Clamp)))",
        )
        .unwrap();
        assert_eq!(config.generation.node_spacing, 32.0);
        assert_eq!(config.generation.node_radius, 5.0);
        assert_eq!(config.generation.mode, ConnectionMode::AllDirections);
        assert_eq!(config.search.max_nodes, 5);
        assert_eq!(config.search.nearest.wrap, SegmentWrap::Clamp);
        assert_eq!(config.collision_step, 1.0);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = NavConfig::from_ron_str("(generation: (node_spacing: 0.0))").unwrap_err();
        assert!(err.is_configuration());

        let err = NavConfig::from_ron_str("(collision_step: -1.0)").unwrap_err();
        assert!(err.is_configuration());

        let err = NavConfig::from_ron_str("(generation: [").unwrap_err();
        assert!(matches!(err, NavError::ConfigLoad { .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let err = NavConfig::load(Path::new("/nonexistent/nav.ron")).unwrap_err();
        assert!(matches!(err, NavError::ConfigLoad { .. }));
    }
}
