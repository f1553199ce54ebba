//! Geometry helpers for bounding boxes and coordinate conversion.

use crate::item::{ItemPosition, PositionableItem};
use kurbo::{Affine, Point, Rect};
use serde::{Deserialize, Serialize};

/// Maps pointer (screen) coordinates onto the canvas.
///
/// Captured once at gesture start: the canvas can scroll between gestures,
/// but it is treated as fixed for the lifetime of one gesture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// On-screen position of the canvas origin.
    pub origin: Point,
    /// Display scale of the canvas (1.0 = one canvas unit per pixel).
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            origin: Point::ZERO,
            zoom: 1.0,
        }
    }
}

impl Viewport {
    /// Create a viewport at the given origin with no zoom.
    pub fn new(origin: Point) -> Self {
        Self { origin, zoom: 1.0 }
    }

    /// Create a viewport with an explicit zoom level.
    pub fn with_zoom(origin: Point, zoom: f64) -> Self {
        Self { origin, zoom }
    }

    /// Transform from pointer space to canvas-local space.
    pub fn inverse_transform(&self) -> Affine {
        let zoom = if self.zoom > 0.0 { self.zoom } else { 1.0 };
        Affine::scale(1.0 / zoom) * Affine::translate(-self.origin.to_vec2())
    }

    /// Convert a pointer point to canvas-local coordinates.
    pub fn to_canvas_local(&self, pointer: Point) -> Point {
        self.inverse_transform() * pointer
    }
}

/// Subtract the canvas origin from a pointer-space point.
pub fn to_canvas_local(pointer: Point, canvas_origin: Point) -> Point {
    Point::new(pointer.x - canvas_origin.x, pointer.y - canvas_origin.y)
}

/// Edges and centers of an item's axis-aligned box.
///
/// Rotation is ignored: guides compare the unrotated layout box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
    pub center_x: f64,
    pub center_y: f64,
}

impl BoundingBox {
    /// Build a box from a top-left corner and a size.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            left: x,
            right: x + width,
            top: y,
            bottom: y + height,
            center_x: x + width / 2.0,
            center_y: y + height / 2.0,
        }
    }

    /// Build a box from an item position.
    pub fn from_position(position: &ItemPosition) -> Self {
        Self::new(position.x, position.y, position.width, position.height)
    }

    /// Build a box from a kurbo rectangle.
    pub fn from_rect(rect: Rect) -> Self {
        Self::new(rect.x0, rect.y0, rect.width(), rect.height())
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Convert to a kurbo rectangle.
    pub fn to_rect(&self) -> Rect {
        Rect::new(self.left, self.top, self.right, self.bottom)
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox::from_rect(self.to_rect().union(other.to_rect()))
    }
}

/// Bounding box of an item.
pub fn bounding_box(item: &PositionableItem) -> BoundingBox {
    BoundingBox::from_position(&item.position)
}

/// Union of the bounding boxes of several items, if any.
pub fn union_bounds<'a>(items: impl IntoIterator<Item = &'a PositionableItem>) -> Option<BoundingBox> {
    let mut result: Option<Rect> = None;
    for item in items {
        let rect = bounding_box(item).to_rect();
        result = Some(match result {
            Some(r) => r.union(rect),
            None => rect,
        });
    }
    result.map(BoundingBox::from_rect)
}

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    (b - a).hypot()
}

/// Clamp a top-left position so a box of the given size stays inside `bounds`.
///
/// A box larger than `bounds` is pinned to the bounds' top-left corner.
pub fn clamp_into(position: Point, width: f64, height: f64, bounds: Rect) -> Point {
    let max_x = (bounds.x1 - width).max(bounds.x0);
    let max_y = (bounds.y1 - height).max(bounds.y0);
    Point::new(
        position.x.clamp(bounds.x0, max_x),
        position.y.clamp(bounds.y0, max_y),
    )
}
