//! Loading and validation of level and configuration files.

use std::path::Path;

use tracing::{error, info, warn};
use waypoint_core::config::NavConfig;
use waypoint_core::error::NavError;
use waypoint_core::graph::ConnectionMode;
use waypoint_core::level::{LevelData, TileLevel};

use crate::{Result, ToolError};

/// Characters a level row may contain.
const KNOWN_TILES: [char; 2] = ['.', '#'];

/// Findings of a validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validation {
    /// Issues that make the inputs unusable.
    pub problems: Vec<String>,
    /// Issues that produce a usable but probably unintended graph.
    pub warnings: Vec<String>,
}

impl Validation {
    /// Returns true if there are no problems. Warnings are allowed.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.problems.is_empty()
    }
}

/// Load a level description and build its tile level.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or describes an
/// empty level.
pub fn load_level(path: &Path) -> Result<TileLevel> {
    let data = LevelData::load(path)?;
    let level = TileLevel::from_data(&data).map_err(NavError::from)?;
    Ok(level)
}

/// Load a configuration file, or the defaults when no path is given.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed or validated.
pub fn load_config(path: Option<&Path>) -> Result<NavConfig> {
    match path {
        Some(path) => Ok(NavConfig::load(path)?),
        None => Ok(NavConfig::default()),
    }
}

/// Check a parsed level description against a configuration.
#[must_use]
pub fn validate_level(data: &LevelData, config: &NavConfig) -> Validation {
    let mut report = Validation::default();

    if data.rows.is_empty() {
        report.problems.push("level has no rows".into());
        return report;
    }
    let widths: Vec<usize> = data.rows.iter().map(|r| r.chars().count()).collect();
    let width = widths.iter().copied().max().unwrap_or(0);
    if width == 0 {
        report.problems.push("level rows are empty".into());
        return report;
    }
    for (ty, row) in data.rows.iter().enumerate() {
        if widths[ty] != width {
            report.warnings.push(format!(
                "row {ty} has {} tiles, padding to {width} with open tiles",
                widths[ty]
            ));
        }
        if let Some(c) = row.chars().find(|c| !KNOWN_TILES.contains(c)) {
            report
                .warnings
                .push(format!("row {ty} has unknown tile '{c}', treated as open"));
        }
    }
    if let Err(e) = TileLevel::from_data(data) {
        report.problems.push(e.to_string());
        return report;
    }

    let generation = &config.generation;
    let level_w = width as f64 * data.tile_size;
    let level_h = data.rows.len() as f64 * data.tile_size;
    if generation.node_spacing > level_w || generation.node_spacing > level_h {
        report.problems.push(format!(
            "node spacing {} exceeds the {level_w}x{level_h} level; no grid cell fits",
            generation.node_spacing
        ));
    }
    if generation.node_radius * 2.0 > generation.node_spacing {
        report.warnings.push(format!(
            "node diameter {} exceeds node spacing {}",
            generation.node_radius * 2.0,
            generation.node_spacing
        ));
    }

    let reach = generation.connection_radius();
    let s = generation.node_spacing;
    let nearest = match generation.mode {
        ConnectionMode::DiagonalOnly => (s * s + s * s).sqrt(),
        _ => s,
    };
    if reach < nearest {
        report.warnings.push(format!(
            "connection radius {reach} cannot reach the nearest {:?} neighbour at {nearest}",
            generation.mode
        ));
    }

    report
}

/// Load and validate a level file with an optional configuration file.
///
/// Findings are logged as they are reported.
///
/// # Errors
///
/// Returns an error if either file cannot be loaded, or
/// [`ToolError::Invalid`] if validation finds problems.
pub fn validate_files(level: &Path, config: Option<&Path>) -> Result<Validation> {
    let data = LevelData::load(level)?;
    let config = load_config(config)?;
    let report = validate_level(&data, &config);

    for warning in &report.warnings {
        warn!("{warning}");
    }
    for problem in &report.problems {
        error!(problem = %problem, "invalid input");
    }
    if !report.is_ok() {
        return Err(ToolError::Invalid(report.problems.len()));
    }
    info!(rows = data.rows.len(), "level and config are valid");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(rows: &[&str]) -> LevelData {
        LevelData {
            origin: waypoint_core::math::Vec2::ZERO,
            tile_size: 50.0,
            segment_size: 100.0,
            rows: rows.iter().map(|r| (*r).to_string()).collect(),
        }
    }

    #[test]
    fn test_clean_level() {
        let report = validate_level(&level(&["....", ".##.", "...."]), &NavConfig::default());
        assert!(report.is_ok());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_ragged_rows_and_unknown_tiles_warn() {
        let report = validate_level(&level(&["....", "..", "..?."]), &NavConfig::default());
        assert!(report.is_ok());
        assert_eq!(report.warnings.len(), 2);
    }

    #[test]
    fn test_empty_level_is_a_problem() {
        assert!(!validate_level(&level(&[]), &NavConfig::default()).is_ok());
        assert!(!validate_level(&level(&["", ""]), &NavConfig::default()).is_ok());
    }

    #[test]
    fn test_spacing_larger_than_level() {
        let mut config = NavConfig::default();
        config.generation.node_spacing = 500.0;
        let report = validate_level(&level(&["...."]), &config);
        assert!(!report.is_ok());
    }

    #[test]
    fn test_short_reach_warns() {
        let mut config = NavConfig::default();
        config.generation.connection_radius_override = Some(10.0);
        let report = validate_level(&level(&["....", "...."]), &config);
        assert!(report.is_ok());
        assert!(report.warnings.iter().any(|w| w.contains("connection radius")));
    }

    #[test]
    fn test_missing_file() {
        let err = validate_files(Path::new("/nonexistent/level.ron"), None).unwrap_err();
        assert!(matches!(err, ToolError::Nav(_)));
    }
}
