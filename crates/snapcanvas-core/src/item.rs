//! Positionable item definitions.

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for items.
pub type ItemId = Uuid;

/// Default minimum width applied when an item carries no constraints.
pub const DEFAULT_MIN_WIDTH: f64 = 50.0;
/// Default minimum height applied when an item carries no constraints.
pub const DEFAULT_MIN_HEIGHT: f64 = 30.0;

/// Kind of content an item holds. Rendering is up to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemKind {
    #[default]
    Text,
    Image,
    BulletList,
    Shape,
    Container,
}

/// Placement of an item in canvas-local coordinates (top-left origin).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPosition {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Rotation in degrees, clockwise.
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub z_index: i32,
}

impl ItemPosition {
    /// Create an unrotated position at z-index 0.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            rotation: 0.0,
            z_index: 0,
        }
    }

    /// Top-left corner.
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Move the top-left corner.
    pub fn set_origin(&mut self, origin: Point) {
        self.x = origin.x;
        self.y = origin.y;
    }

    /// Center point.
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Unrotated layout rectangle.
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    /// Width over height, or 1.0 for degenerate heights.
    pub fn aspect_ratio(&self) -> f64 {
        if self.height > f64::EPSILON {
            self.width / self.height
        } else {
            1.0
        }
    }
}

/// Size limits applied to engine-driven mutations of an item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemConstraints {
    #[serde(default = "default_min_width")]
    pub min_width: f64,
    #[serde(default = "default_min_height")]
    pub min_height: f64,
    #[serde(default)]
    pub maintain_aspect_ratio: bool,
}

fn default_min_width() -> f64 {
    DEFAULT_MIN_WIDTH
}

fn default_min_height() -> f64 {
    DEFAULT_MIN_HEIGHT
}

fn default_visible() -> bool {
    true
}

impl Default for ItemConstraints {
    fn default() -> Self {
        Self {
            min_width: DEFAULT_MIN_WIDTH,
            min_height: DEFAULT_MIN_HEIGHT,
            maintain_aspect_ratio: false,
        }
    }
}

impl ItemConstraints {
    pub fn new(min_width: f64, min_height: f64, maintain_aspect_ratio: bool) -> Self {
        Self {
            min_width,
            min_height,
            maintain_aspect_ratio,
        }
    }
}

/// An element on the canvas that can be moved, resized and rotated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionableItem {
    pub id: ItemId,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub position: ItemPosition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<ItemConstraints>,
    #[serde(default)]
    pub locked: bool,
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Opaque payload owned by the host application.
    #[serde(default)]
    pub content: serde_json::Value,
}

impl PositionableItem {
    /// Create a visible, unlocked item with a fresh id.
    pub fn new(kind: ItemKind, position: ItemPosition) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            position,
            constraints: None,
            locked: false,
            visible: true,
            content: serde_json::Value::Null,
        }
    }

    /// Builder-style constraint setter.
    pub fn with_constraints(mut self, constraints: ItemConstraints) -> Self {
        self.constraints = Some(constraints);
        self
    }

    /// Builder-style content setter.
    pub fn with_content(mut self, content: serde_json::Value) -> Self {
        self.content = content;
        self
    }

    /// Builder-style lock setter.
    pub fn locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    /// Whether pointer gestures may start on this item.
    pub fn is_interactive(&self) -> bool {
        self.visible && !self.locked
    }

    /// Whether other items may align against this one.
    pub fn is_alignment_target(&self) -> bool {
        self.visible && !self.locked
    }

    /// The item's own constraints, falling back to `defaults`.
    pub fn effective_constraints(&self, defaults: &ItemConstraints) -> ItemConstraints {
        self.constraints.unwrap_or(*defaults)
    }

    /// Repair malformed geometry in place.
    ///
    /// Non-finite or too-small sizes are clamped up to the minimums, and
    /// non-finite coordinates reset to zero. Returns true if anything changed.
    pub fn normalize(&mut self, defaults: &ItemConstraints) -> bool {
        let constraints = self.effective_constraints(defaults);
        let before = self.position;
        let pos = &mut self.position;

        if !pos.x.is_finite() {
            pos.x = 0.0;
        }
        if !pos.y.is_finite() {
            pos.y = 0.0;
        }
        if !pos.rotation.is_finite() {
            pos.rotation = 0.0;
        }
        if !pos.width.is_finite() || pos.width < constraints.min_width {
            pos.width = constraints.min_width;
        }
        if !pos.height.is_finite() || pos.height < constraints.min_height {
            pos.height = constraints.min_height;
        }

        before != self.position
    }

    /// A copy with a fresh id, shifted by `offset` on both axes.
    pub fn duplicate(&self, offset: f64) -> Self {
        let mut copy = self.clone();
        copy.id = Uuid::new_v4();
        copy.position.x += offset;
        copy.position.y += offset;
        copy
    }
}

/// Serialize an item list to JSON.
pub fn items_to_json(items: &[PositionableItem]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(items)
}

/// Deserialize an item list from JSON.
pub fn items_from_json(json: &str) -> Result<Vec<PositionableItem>, serde_json::Error> {
    serde_json::from_str(json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_negative_size() {
        let mut item = PositionableItem::new(ItemKind::Shape, ItemPosition::new(0.0, 0.0, -10.0, 5.0));
        assert!(item.normalize(&ItemConstraints::default()));
        assert_eq!(item.position.width, DEFAULT_MIN_WIDTH);
        assert_eq!(item.position.height, DEFAULT_MIN_HEIGHT);
    }

    #[test]
    fn test_normalize_uses_item_constraints() {
        let mut item = PositionableItem::new(ItemKind::Image, ItemPosition::new(0.0, 0.0, f64::NAN, 100.0))
            .with_constraints(ItemConstraints::new(80.0, 10.0, true));
        assert!(item.normalize(&ItemConstraints::default()));
        assert_eq!(item.position.width, 80.0);
        assert_eq!(item.position.height, 100.0);
    }

    #[test]
    fn test_normalize_well_formed_is_untouched() {
        let mut item = PositionableItem::new(ItemKind::Text, ItemPosition::new(10.0, 10.0, 200.0, 40.0));
        assert!(!item.normalize(&ItemConstraints::default()));
    }

    #[test]
    fn test_duplicate() {
        let item = PositionableItem::new(ItemKind::Text, ItemPosition::new(10.0, 10.0, 200.0, 40.0));
        let copy = item.duplicate(20.0);
        assert_ne!(copy.id, item.id);
        assert_eq!(copy.position.x, 30.0);
        assert_eq!(copy.position.y, 30.0);
        assert_eq!(copy.kind, item.kind);
    }

    #[test]
    fn test_json_wire_format() {
        let json = r#"[{
            "id": "6f9619ff-8b86-d011-b42d-00cf4fc964ff",
            "type": "bullet-list",
            "position": { "x": 1, "y": 2, "width": 100, "height": 60, "zIndex": 3 },
            "constraints": { "minWidth": 40, "maintainAspectRatio": true },
            "content": { "items": ["a", "b"] }
        }]"#;
        let items = items_from_json(json).unwrap();
        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.kind, ItemKind::BulletList);
        assert_eq!(item.position.z_index, 3);
        assert_eq!(item.position.rotation, 0.0);
        assert!(item.visible);
        assert!(!item.locked);
        let constraints = item.constraints.unwrap();
        assert_eq!(constraints.min_width, 40.0);
        assert_eq!(constraints.min_height, DEFAULT_MIN_HEIGHT);
        assert!(constraints.maintain_aspect_ratio);

        let text = items_to_json(&items).unwrap();
        assert!(text.contains("\"type\": \"bullet-list\""));
        assert!(text.contains("\"zIndex\": 3"));
    }
}
