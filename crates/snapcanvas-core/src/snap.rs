//! Magnetic pull toward alignment guides, plus grid and angle snapping.

use crate::config::SnapConfig;
use crate::guides::{GuideMatch, GuideSet};
use kurbo::{Point, Size};

/// Result of a snap operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapResult {
    /// The adjusted top-left point.
    pub point: Point,
    /// Whether the X coordinate was adjusted.
    pub snapped_x: bool,
    /// Whether the Y coordinate was adjusted.
    pub snapped_y: bool,
}

impl SnapResult {
    /// Create a result with no snapping.
    pub fn none(point: Point) -> Self {
        Self {
            point,
            snapped_x: false,
            snapped_y: false,
        }
    }

    /// Check if any snapping occurred.
    pub fn is_snapped(&self) -> bool {
        self.snapped_x || self.snapped_y
    }
}

/// Pull one coordinate toward the position that puts its anchor on the guide.
///
/// Returns `None` when the jump would exceed the configured limit.
fn pull_axis(raw: f64, extent: f64, matched: &GuideMatch, config: &SnapConfig) -> Option<f64> {
    let target = matched.guide.position - matched.anchor.offset(extent);
    let snap_distance = (target - raw).abs();
    if snap_distance > config.distance_limit {
        return None;
    }
    let threshold = config.threshold.max(f64::EPSILON);
    let pull = ((1.0 - matched.distance / threshold) * config.strength).clamp(0.0, 1.0);
    Some(raw + (target - raw) * pull)
}

/// Blend a raw top-left position toward the matched guides.
///
/// Each axis is handled independently. The pull weakens linearly as the
/// guide distance approaches the threshold, so the item keeps following the
/// pointer instead of locking onto the line.
pub fn resolve_magnetic_snap(raw: Point, size: Size, guides: &GuideSet, config: &SnapConfig) -> SnapResult {
    let mut result = SnapResult::none(raw);

    if let Some(adjusted) = guides.vertical.as_ref().and_then(|m| pull_axis(raw.x, size.width, m, config)) {
        result.point.x = adjusted;
        result.snapped_x = true;
    }
    if let Some(adjusted) = guides.horizontal.as_ref().and_then(|m| pull_axis(raw.y, size.height, m, config)) {
        result.point.y = adjusted;
        result.snapped_y = true;
    }

    result
}

/// Snap a single coordinate to the nearest grid line.
pub fn snap_value_to_grid(value: f64, grid_size: f64) -> f64 {
    (value / grid_size).round() * grid_size
}

/// Snap a point to the nearest grid intersection.
pub fn snap_to_grid(point: Point, grid_size: f64) -> SnapResult {
    SnapResult {
        point: Point::new(
            snap_value_to_grid(point.x, grid_size),
            snap_value_to_grid(point.y, grid_size),
        ),
        snapped_x: true,
        snapped_y: true,
    }
}

/// Magnetic guides first, then the grid for any axis no guide claimed.
pub fn snap_position(
    raw: Point,
    size: Size,
    guides: &GuideSet,
    config: &SnapConfig,
    grid_size: Option<f64>,
) -> SnapResult {
    let mut result = if config.enabled {
        resolve_magnetic_snap(raw, size, guides, config)
    } else {
        SnapResult::none(raw)
    };

    if let Some(grid) = grid_size {
        if !result.snapped_x {
            result.point.x = snap_value_to_grid(raw.x, grid);
            result.snapped_x = true;
        }
        if !result.snapped_y {
            result.point.y = snap_value_to_grid(raw.y, grid);
            result.snapped_y = true;
        }
    }

    result
}

/// Snap an angle to the nearest increment.
/// Returns the snapped angle in degrees (0-360).
pub fn snap_angle(angle_degrees: f64, increment: f64) -> f64 {
    if increment <= 0.0 {
        return normalize_degrees(angle_degrees);
    }
    normalize_degrees((angle_degrees / increment).round() * increment)
}

/// Wrap an angle into [0, 360).
pub fn normalize_degrees(angle_degrees: f64) -> f64 {
    let wrapped = angle_degrees.rem_euclid(360.0);
    // rem_euclid can return exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}
