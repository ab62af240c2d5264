//! Level geometry services consumed by the graph builder.
//!
//! The builder never branches on the concrete level type. Each level variant
//! answers two questions through the [`Level`] trait: which sample mask (if
//! any) a grid cell should be tested with, and whether a rectangle (optionally
//! masked) overlaps solid geometry.
//!
//! Two variants ship with the crate:
//! - [`TileLevel`] - a grid of solid/open tiles
//! - [`MaskLevel`] - a per-pixel collision bitmap

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{NavError, Result};
use crate::math::{Rect, Vec2};

/// Errors reported by level geometry services.
#[derive(Debug, Error)]
pub enum LevelError {
    /// The level cannot answer collision queries.
    #[error("Level collision unavailable: {0}")]
    Unavailable(String),

    /// Level construction data is inconsistent.
    #[error("Invalid level data: {0}")]
    InvalidData(String),
}

/// Column/row of a spatial segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SegmentCoord {
    /// Segment column.
    pub sx: usize,
    /// Segment row.
    pub sy: usize,
}

impl SegmentCoord {
    /// Create a segment coordinate.
    #[must_use]
    pub const fn new(sx: usize, sy: usize) -> Self {
        Self { sx, sy }
    }
}

/// Static layout facts about a level: bounds and segment grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelGeometry {
    /// Minimum corner of the level in world units.
    pub origin: Vec2,
    /// Level width in world units.
    pub width: f64,
    /// Level height in world units.
    pub height: f64,
    /// Side length of one spatial segment.
    pub segment_size: f64,
    /// Number of segment columns.
    pub columns: usize,
    /// Number of segment rows.
    pub rows: usize,
}

impl LevelGeometry {
    /// Build the geometry for a level, covering it with square segments.
    ///
    /// # Errors
    ///
    /// Returns [`LevelError::InvalidData`] if the size or segment size is not
    /// positive and finite.
    pub fn new(
        origin: Vec2,
        width: f64,
        height: f64,
        segment_size: f64,
    ) -> std::result::Result<Self, LevelError> {
        if !(width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite()) {
            return Err(LevelError::InvalidData(format!(
                "level size must be positive, got {width}x{height}"
            )));
        }
        if !(segment_size > 0.0 && segment_size.is_finite()) {
            return Err(LevelError::InvalidData(format!(
                "segment size must be positive, got {segment_size}"
            )));
        }
        if !origin.is_finite() {
            return Err(LevelError::InvalidData("level origin must be finite".into()));
        }

        Ok(Self {
            origin,
            width,
            height,
            segment_size,
            columns: (width / segment_size).ceil() as usize,
            rows: (height / segment_size).ceil() as usize,
        })
    }

    /// Bounding rectangle of the level.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::new(self.origin.x, self.origin.y, self.width, self.height)
    }

    /// Total number of segments.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.columns * self.rows
    }

    /// Unbounded segment indices of a position: `floor((pos - origin) / size)`.
    #[must_use]
    pub fn segment_index(&self, pos: Vec2) -> (i64, i64) {
        (
            ((pos.x - self.origin.x) / self.segment_size).floor() as i64,
            ((pos.y - self.origin.y) / self.segment_size).floor() as i64,
        )
    }

    /// Segment containing a position, or `None` outside the segment grid.
    #[must_use]
    pub fn segment_of(&self, pos: Vec2) -> Option<SegmentCoord> {
        let (sx, sy) = self.segment_index(pos);
        self.checked_segment(sx, sy)
    }

    /// Convert signed indices to a segment if they lie inside the grid.
    #[must_use]
    pub fn checked_segment(&self, sx: i64, sy: i64) -> Option<SegmentCoord> {
        let in_x = sx >= 0 && (sx as u64) < self.columns as u64;
        let in_y = sy >= 0 && (sy as u64) < self.rows as u64;
        (in_x && in_y).then(|| SegmentCoord::new(sx as usize, sy as usize))
    }

    /// Flat storage index of a segment (column-major: x outer, y inner).
    #[must_use]
    pub fn flat_index(&self, segment: SegmentCoord) -> usize {
        segment.sx * self.rows + segment.sy
    }

    /// Segments overlapping `rect`, x outer then y inner, ascending.
    ///
    /// Parts of the rectangle outside the grid are ignored.
    pub fn segments_overlapping(&self, rect: Rect) -> impl Iterator<Item = SegmentCoord> {
        let (x0, y0) = self.segment_index(Vec2::new(rect.x, rect.y));
        let (x1, y1) = self.segment_index(Vec2::new(rect.right(), rect.bottom()));

        let clamp = |lo: i64, hi: i64, count: usize| {
            let last = count as i64 - 1;
            if hi < 0 || lo > last {
                (1, 0)
            } else {
                (lo.max(0), hi.min(last))
            }
        };
        let (x0, x1) = clamp(x0, x1, self.columns);
        let (y0, y1) = clamp(y0, y1, self.rows);

        (x0..=x1).flat_map(move |sx| {
            (y0..=y1).map(move |sy| SegmentCoord::new(sx as usize, sy as usize))
        })
    }
}

/// Occupancy mask sampled over a rectangle, one bit per world unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleMask {
    width: usize,
    height: usize,
    bits: Vec<bool>,
}

impl SampleMask {
    /// A mask with every bit set.
    #[must_use]
    pub fn filled(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            bits: vec![true; width * height],
        }
    }

    /// Mask width in samples.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Mask height in samples.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Bit at `(x, y)`; out-of-range samples are unset.
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.bits[y * self.width + x]
    }

    /// Set the bit at `(x, y)`. Returns `false` if out of range.
    pub fn set(&mut self, x: usize, y: usize, value: bool) -> bool {
        if x < self.width && y < self.height {
            self.bits[y * self.width + x] = value;
            true
        } else {
            false
        }
    }

    /// Positions of all set bits, row by row.
    pub fn set_bits(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.height)
            .flat_map(move |y| (0..self.width).map(move |x| (x, y)))
            .filter(|&(x, y)| self.get(x, y))
    }
}

/// Level geometry service.
pub trait Level {
    /// Bounds and segment grid of the level.
    fn geometry(&self) -> LevelGeometry;

    /// Mask a grid cell should be tested with, if this level variant uses
    /// mask-based collision.
    fn sample_mask(&self, _cell: Rect) -> Option<SampleMask> {
        None
    }

    /// Returns true if `rect` (restricted to the set bits of `mask`, when
    /// given) overlaps solid geometry.
    fn is_solid(&self, rect: Rect, mask: Option<&SampleMask>) -> std::result::Result<bool, LevelError>;
}

/// Serializable tile level description.
///
/// # Example RON
///
/// ```ron
/// LevelData(
///     tile_size: 50.0,
///     segment_size: 100.0,
///     rows: [
///         "....",
///         "####",
///         "....",
///     ],
/// )
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelData {
    /// Minimum corner of the level.
    #[serde(default)]
    pub origin: Vec2,
    /// Side length of one tile.
    pub tile_size: f64,
    /// Side length of one spatial segment.
    pub segment_size: f64,
    /// Tile rows, top to bottom; `#` marks a solid tile.
    pub rows: Vec<String>,
}

impl LevelData {
    /// Parse a level description from RON text.
    pub fn from_ron_str(source: &str) -> Result<Self> {
        ron::from_str(source).map_err(|e| NavError::ConfigLoad {
            path: "<string>".into(),
            message: e.to_string(),
        })
    }

    /// Load a level description from a RON file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| NavError::ConfigLoad {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        ron::from_str(&contents).map_err(|e| NavError::ConfigLoad {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}

/// Tile-grid level: each tile is fully solid or fully open.
#[derive(Debug, Clone)]
pub struct TileLevel {
    geometry: LevelGeometry,
    tile_size: f64,
    tiles_wide: usize,
    tiles_high: usize,
    /// Tile solidity in row-major order.
    solid: Vec<bool>,
}

impl TileLevel {
    /// Create an all-open level of `tiles_wide` x `tiles_high` tiles.
    pub fn new(
        origin: Vec2,
        tiles_wide: usize,
        tiles_high: usize,
        tile_size: f64,
        segment_size: f64,
    ) -> std::result::Result<Self, LevelError> {
        if tiles_wide == 0 || tiles_high == 0 {
            return Err(LevelError::InvalidData("tile grid must not be empty".into()));
        }
        if !(tile_size > 0.0 && tile_size.is_finite()) {
            return Err(LevelError::InvalidData(format!(
                "tile size must be positive, got {tile_size}"
            )));
        }
        let geometry = LevelGeometry::new(
            origin,
            tiles_wide as f64 * tile_size,
            tiles_high as f64 * tile_size,
            segment_size,
        )?;

        Ok(Self {
            geometry,
            tile_size,
            tiles_wide,
            tiles_high,
            solid: vec![false; tiles_wide * tiles_high],
        })
    }

    /// Build a level from a parsed description.
    pub fn from_data(data: &LevelData) -> std::result::Result<Self, LevelError> {
        let tiles_high = data.rows.len();
        let tiles_wide = data.rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        let mut level = Self::new(
            data.origin,
            tiles_wide,
            tiles_high,
            data.tile_size,
            data.segment_size,
        )?;

        for (ty, row) in data.rows.iter().enumerate() {
            for (tx, c) in row.chars().enumerate() {
                if c == '#' {
                    level.set_solid(tx, ty, true);
                }
            }
        }
        Ok(level)
    }

    /// Tile side length.
    #[must_use]
    pub const fn tile_size(&self) -> f64 {
        self.tile_size
    }

    /// Grid size in tiles.
    #[must_use]
    pub const fn tiles(&self) -> (usize, usize) {
        (self.tiles_wide, self.tiles_high)
    }

    /// Mark a tile solid or open. Returns `false` if out of bounds.
    pub fn set_solid(&mut self, tx: usize, ty: usize, solid: bool) -> bool {
        if tx < self.tiles_wide && ty < self.tiles_high {
            self.solid[ty * self.tiles_wide + tx] = solid;
            true
        } else {
            false
        }
    }

    /// Solidity of a tile; out-of-bounds tiles are open.
    #[must_use]
    pub fn tile_is_solid(&self, tx: usize, ty: usize) -> bool {
        tx < self.tiles_wide && ty < self.tiles_high && self.solid[ty * self.tiles_wide + tx]
    }

    fn tile_rect(&self, tx: usize, ty: usize) -> Rect {
        Rect::new(
            self.geometry.origin.x + tx as f64 * self.tile_size,
            self.geometry.origin.y + ty as f64 * self.tile_size,
            self.tile_size,
            self.tile_size,
        )
    }

    fn rect_hits_tiles(&self, rect: Rect) -> bool {
        let o = self.geometry.origin;
        let tx0 = ((rect.x - o.x) / self.tile_size).floor().max(0.0) as usize;
        let ty0 = ((rect.y - o.y) / self.tile_size).floor().max(0.0) as usize;
        let tx1 = ((rect.right() - o.x) / self.tile_size).floor();
        let ty1 = ((rect.bottom() - o.y) / self.tile_size).floor();
        if tx1 < 0.0 || ty1 < 0.0 {
            return false;
        }
        let tx1 = (tx1 as usize).min(self.tiles_wide.saturating_sub(1));
        let ty1 = (ty1 as usize).min(self.tiles_high.saturating_sub(1));

        (tx0..=tx1).any(|tx| {
            (ty0..=ty1).any(|ty| self.tile_is_solid(tx, ty) && self.tile_rect(tx, ty).intersects(&rect))
        })
    }
}

impl Level for TileLevel {
    fn geometry(&self) -> LevelGeometry {
        self.geometry
    }

    fn is_solid(&self, rect: Rect, mask: Option<&SampleMask>) -> std::result::Result<bool, LevelError> {
        let Some(mask) = mask else {
            return Ok(self.rect_hits_tiles(rect));
        };
        if mask.width() == 0 || mask.height() == 0 {
            return Ok(false);
        }

        let pw = rect.w / mask.width() as f64;
        let ph = rect.h / mask.height() as f64;
        Ok(mask.set_bits().any(|(mx, my)| {
            self.rect_hits_tiles(Rect::new(rect.x + mx as f64 * pw, rect.y + my as f64 * ph, pw, ph))
        }))
    }
}

/// Bitmap level: one collision bit per world unit.
#[derive(Debug, Clone)]
pub struct MaskLevel {
    geometry: LevelGeometry,
    width_px: usize,
    height_px: usize,
    /// Pixel solidity in row-major order.
    pixels: Vec<bool>,
}

impl MaskLevel {
    /// Create an all-open bitmap level of `width_px` x `height_px` units.
    pub fn new(
        origin: Vec2,
        width_px: usize,
        height_px: usize,
        segment_size: f64,
    ) -> std::result::Result<Self, LevelError> {
        let geometry = LevelGeometry::new(origin, width_px as f64, height_px as f64, segment_size)?;
        Ok(Self {
            geometry,
            width_px,
            height_px,
            pixels: vec![false; width_px * height_px],
        })
    }

    /// Mark a single pixel solid or open. Returns `false` if out of bounds.
    pub fn set_pixel(&mut self, px: usize, py: usize, solid: bool) -> bool {
        if px < self.width_px && py < self.height_px {
            self.pixels[py * self.width_px + px] = solid;
            true
        } else {
            false
        }
    }

    /// Mark every pixel covered by `rect` (level coordinates) solid.
    pub fn fill_rect(&mut self, rect: Rect) {
        let o = self.geometry.origin;
        let x0 = (rect.x - o.x).floor().max(0.0) as usize;
        let y0 = (rect.y - o.y).floor().max(0.0) as usize;
        let x1 = ((rect.right() - o.x).ceil().max(0.0) as usize).min(self.width_px);
        let y1 = ((rect.bottom() - o.y).ceil().max(0.0) as usize).min(self.height_px);
        for py in y0..y1 {
            for px in x0..x1 {
                self.pixels[py * self.width_px + px] = true;
            }
        }
    }

    /// Solidity of a pixel; out-of-bounds pixels are open.
    #[must_use]
    pub fn pixel_is_solid(&self, px: i64, py: i64) -> bool {
        px >= 0
            && py >= 0
            && (px as usize) < self.width_px
            && (py as usize) < self.height_px
            && self.pixels[py as usize * self.width_px + px as usize]
    }

    fn rect_hits_pixels(&self, rect: Rect) -> bool {
        let o = self.geometry.origin;
        let x0 = (rect.x - o.x).floor() as i64;
        let y0 = (rect.y - o.y).floor() as i64;
        let x1 = (rect.right() - o.x).ceil() as i64;
        let y1 = (rect.bottom() - o.y).ceil() as i64;

        (x0..x1).any(|px| {
            (y0..y1).any(|py| {
                self.pixel_is_solid(px, py)
                    && Rect::new(o.x + px as f64, o.y + py as f64, 1.0, 1.0).intersects(&rect)
            })
        })
    }
}

impl Level for MaskLevel {
    fn geometry(&self) -> LevelGeometry {
        self.geometry
    }

    fn sample_mask(&self, cell: Rect) -> Option<SampleMask> {
        Some(SampleMask::filled(
            cell.w.ceil().max(1.0) as usize,
            cell.h.ceil().max(1.0) as usize,
        ))
    }

    fn is_solid(&self, rect: Rect, mask: Option<&SampleMask>) -> std::result::Result<bool, LevelError> {
        let Some(mask) = mask else {
            return Ok(self.rect_hits_pixels(rect));
        };

        let o = self.geometry.origin;
        let base_x = (rect.x - o.x).floor() as i64;
        let base_y = (rect.y - o.y).floor() as i64;
        Ok(mask
            .set_bits()
            .any(|(mx, my)| self.pixel_is_solid(base_x + mx as i64, base_y + my as i64)))
    }
}
