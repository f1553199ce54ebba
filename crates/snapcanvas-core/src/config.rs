//! Canvas and engine configuration.

use crate::error::{CanvasError, CanvasResult};
use crate::item::ItemConstraints;
use kurbo::Rect;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default distance under which an edge or center counts as aligned.
pub const DEFAULT_SNAP_THRESHOLD: f64 = 3.0;
/// Default fraction of the remaining distance the magnetic pull covers.
pub const DEFAULT_SNAP_STRENGTH: f64 = 0.5;
/// Default maximum jump the magnetic pull may cause.
pub const DEFAULT_SNAP_DISTANCE_LIMIT: f64 = 15.0;
/// Default pointer travel that turns a press into a drag.
pub const DEFAULT_DRAG_THRESHOLD: f64 = 5.0;
/// Default press duration that turns a press into a drag.
pub const DEFAULT_HOLD_DELAY_MS: u64 = 250;
/// Default window during which clicks are swallowed after a drag.
pub const DEFAULT_CLICK_SUPPRESSION_MS: u64 = 450;
/// Rotation increment used while the snap modifier is held.
pub const DEFAULT_ROTATION_SNAP_DEGREES: f64 = 15.0;
/// Maximum number of history snapshots kept.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Four-sided inset from the canvas edges.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Padding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Padding {
    /// Same inset on all four sides.
    pub fn uniform(value: f64) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }
}

/// Extent and grid settings of the design canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasConfig {
    pub width: f64,
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_size: Option<f64>,
    #[serde(default)]
    pub snap_to_grid: bool,
    #[serde(default)]
    pub show_grid: bool,
    /// Advisory unless `constrain_to_bounds` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding: Option<Padding>,
    /// Keep dragged and resized items inside the padded canvas.
    #[serde(default)]
    pub constrain_to_bounds: bool,
    /// Cosmetic; never read by the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

impl CanvasConfig {
    /// A canvas of the given extent with no grid and no padding.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            grid_size: None,
            snap_to_grid: false,
            show_grid: false,
            padding: None,
            constrain_to_bounds: false,
            background_color: None,
        }
    }

    /// Check that the extent and grid are usable.
    pub fn validate(&self) -> CanvasResult<()> {
        if !self.width.is_finite() || self.width <= 0.0 || !self.height.is_finite() || self.height <= 0.0 {
            return Err(CanvasError::InvalidConfig(format!(
                "canvas extent must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if let Some(grid) = self.grid_size {
            if !grid.is_finite() || grid <= 0.0 {
                return Err(CanvasError::InvalidConfig(format!(
                    "grid size must be positive, got {}",
                    grid
                )));
            }
        }
        Ok(())
    }

    /// Full canvas rectangle.
    pub fn rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    /// Canvas rectangle minus padding.
    pub fn content_rect(&self) -> Rect {
        let p = self.padding.unwrap_or_default();
        let x0 = p.left.min(self.width);
        let y0 = p.top.min(self.height);
        let x1 = (self.width - p.right).max(x0);
        let y1 = (self.height - p.bottom).max(y0);
        Rect::new(x0, y0, x1, y1)
    }

    /// Hard bound for engine-driven movement, if the host opted in.
    pub fn movement_bounds(&self) -> Option<Rect> {
        self.constrain_to_bounds.then(|| self.content_rect())
    }

    /// Grid size to snap to, if grid snapping is active.
    pub fn active_grid(&self) -> Option<f64> {
        if self.snap_to_grid {
            self.grid_size.filter(|g| *g > 0.0)
        } else {
            None
        }
    }
}

/// Magnetic alignment tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SnapConfig {
    pub enabled: bool,
    /// Distance under which a guide is considered.
    pub threshold: f64,
    /// Scale applied to the pull, 0.0 (none) to 1.0 (hard snap at distance 0).
    pub strength: f64,
    /// Axes whose pull would exceed this distance are left alone.
    pub distance_limit: f64,
    /// Whether the canvas center lines act as guides.
    pub canvas_center: bool,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: DEFAULT_SNAP_THRESHOLD,
            strength: DEFAULT_SNAP_STRENGTH,
            distance_limit: DEFAULT_SNAP_DISTANCE_LIMIT,
            canvas_center: true,
        }
    }
}

impl SnapConfig {
    /// Thresholds expressed in screen pixels converted to canvas units.
    pub fn scaled_for_zoom(&self, zoom: f64) -> Self {
        if !zoom.is_finite() || zoom <= 0.0 {
            return *self;
        }
        Self {
            threshold: self.threshold / zoom,
            distance_limit: self.distance_limit / zoom,
            ..*self
        }
    }
}

/// Pointer gesture timing and distances.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GestureConfig {
    /// Pointer travel (canvas units) that starts a drag.
    pub drag_threshold: f64,
    /// Press duration that starts a drag without movement.
    #[serde(with = "duration_ms")]
    pub hold_delay: Duration,
    /// How long clicks on a just-dragged item are swallowed.
    #[serde(with = "duration_ms")]
    pub click_suppression: Duration,
    pub rotation_snap_degrees: f64,
    pub nudge_step: f64,
    pub nudge_step_large: f64,
    /// Offset applied to duplicated items on both axes.
    pub duplicate_offset: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            drag_threshold: DEFAULT_DRAG_THRESHOLD,
            hold_delay: Duration::from_millis(DEFAULT_HOLD_DELAY_MS),
            click_suppression: Duration::from_millis(DEFAULT_CLICK_SUPPRESSION_MS),
            rotation_snap_degrees: DEFAULT_ROTATION_SNAP_DEGREES,
            nudge_step: 1.0,
            nudge_step_large: 10.0,
            duplicate_offset: 20.0,
        }
    }
}

/// Durations travel as whole milliseconds.
mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

/// How the host presents the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EditorMode {
    /// Fixed template layout; the interactive engine is off.
    Template,
    /// Template slots that can still be repositioned.
    #[default]
    Hybrid,
    /// Unconstrained free-form layout.
    Free,
}

impl EditorMode {
    /// Whether pointer gestures and layout operations are processed.
    pub fn is_interactive(self) -> bool {
        !matches!(self, EditorMode::Template)
    }
}

/// Everything the orchestrator needs besides the canvas itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub mode: EditorMode,
    /// Constraints for items that carry none of their own.
    pub default_constraints: ItemConstraints,
    pub snap: SnapConfig,
    pub gesture: GestureConfig,
    /// Divide snap distances by the viewport zoom.
    pub scale_snap_with_zoom: bool,
    pub history_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::for_mode(EditorMode::default())
    }
}

impl EngineConfig {
    /// Preset for a given editor mode.
    pub fn for_mode(mode: EditorMode) -> Self {
        let default_constraints = match mode {
            EditorMode::Free => ItemConstraints::new(20.0, 20.0, false),
            EditorMode::Template | EditorMode::Hybrid => ItemConstraints::default(),
        };
        Self {
            mode,
            default_constraints,
            snap: SnapConfig::default(),
            gesture: GestureConfig::default(),
            scale_snap_with_zoom: false,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        assert!(CanvasConfig::new(800.0, 600.0).validate().is_ok());
        assert!(CanvasConfig::new(0.0, 600.0).validate().is_err());
        assert!(CanvasConfig::new(800.0, f64::NAN).validate().is_err());

        let mut config = CanvasConfig::new(800.0, 600.0);
        config.grid_size = Some(-4.0);
        assert!(matches!(config.validate(), Err(CanvasError::InvalidConfig(_))));
    }

    #[test]
    fn test_content_rect() {
        let mut config = CanvasConfig::new(800.0, 600.0);
        assert_eq!(config.content_rect(), Rect::new(0.0, 0.0, 800.0, 600.0));
        config.padding = Some(Padding { top: 10.0, right: 20.0, bottom: 30.0, left: 40.0 });
        assert_eq!(config.content_rect(), Rect::new(40.0, 10.0, 780.0, 570.0));
        assert!(config.movement_bounds().is_none());
        config.constrain_to_bounds = true;
        assert_eq!(config.movement_bounds(), Some(Rect::new(40.0, 10.0, 780.0, 570.0)));
    }

    #[test]
    fn test_active_grid() {
        let mut config = CanvasConfig::new(800.0, 600.0);
        config.grid_size = Some(20.0);
        assert_eq!(config.active_grid(), None);
        config.snap_to_grid = true;
        assert_eq!(config.active_grid(), Some(20.0));
    }

    #[test]
    fn test_snap_scaled_for_zoom() {
        let snap = SnapConfig::default().scaled_for_zoom(2.0);
        assert!((snap.threshold - 1.5).abs() < f64::EPSILON);
        assert!((snap.distance_limit - 7.5).abs() < f64::EPSILON);
        assert!((snap.strength - DEFAULT_SNAP_STRENGTH).abs() < f64::EPSILON);
    }

    #[test]
    fn test_mode_presets() {
        assert!(!EditorMode::Template.is_interactive());
        assert!(EditorMode::Free.is_interactive());
        let free = EngineConfig::for_mode(EditorMode::Free);
        assert_eq!(free.default_constraints.min_width, 20.0);
        let hybrid = EngineConfig::for_mode(EditorMode::Hybrid);
        assert_eq!(hybrid.default_constraints.min_height, 30.0);
    }

    #[test]
    fn test_config_from_json() {
        let config: CanvasConfig = serde_json::from_str(
            r#"{ "width": 960, "height": 540, "gridSize": 10, "snapToGrid": true, "padding": { "top": 5, "right": 5, "bottom": 5, "left": 5 } }"#,
        )
        .unwrap();
        assert_eq!(config.active_grid(), Some(10.0));
        assert_eq!(config.padding, Some(Padding::uniform(5.0)));

        let engine: EngineConfig =
            serde_json::from_str(r#"{ "mode": "free", "snap": { "strength": 1.0 }, "gesture": { "holdDelay": 300 } }"#).unwrap();
        assert_eq!(engine.gesture.hold_delay, Duration::from_millis(300));
        assert_eq!(engine.mode, EditorMode::Free);
        assert!((engine.snap.strength - 1.0).abs() < f64::EPSILON);
        assert!((engine.snap.threshold - DEFAULT_SNAP_THRESHOLD).abs() < f64::EPSILON);
    }
}
