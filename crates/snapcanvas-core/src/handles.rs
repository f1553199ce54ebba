//! Resize handles and the resize geometry they drive.

use crate::geometry::clamp_into;
use crate::item::{ItemConstraints, ItemPosition};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Corner positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Edge positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

/// A grip the user drags to resize an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResizeHandle {
    Corner(Corner),
    Edge(Edge),
}

impl ResizeHandle {
    pub fn moves_left(self) -> bool {
        matches!(
            self,
            ResizeHandle::Corner(Corner::TopLeft | Corner::BottomLeft) | ResizeHandle::Edge(Edge::Left)
        )
    }

    pub fn moves_right(self) -> bool {
        matches!(
            self,
            ResizeHandle::Corner(Corner::TopRight | Corner::BottomRight) | ResizeHandle::Edge(Edge::Right)
        )
    }

    pub fn moves_top(self) -> bool {
        matches!(
            self,
            ResizeHandle::Corner(Corner::TopLeft | Corner::TopRight) | ResizeHandle::Edge(Edge::Top)
        )
    }

    pub fn moves_bottom(self) -> bool {
        matches!(
            self,
            ResizeHandle::Corner(Corner::BottomLeft | Corner::BottomRight) | ResizeHandle::Edge(Edge::Bottom)
        )
    }

    /// Where this handle sits on an item's unrotated box.
    pub fn position_on(self, position: &ItemPosition) -> Point {
        let rect = position.rect();
        let center = rect.center();
        match self {
            ResizeHandle::Corner(Corner::TopLeft) => Point::new(rect.x0, rect.y0),
            ResizeHandle::Corner(Corner::TopRight) => Point::new(rect.x1, rect.y0),
            ResizeHandle::Corner(Corner::BottomLeft) => Point::new(rect.x0, rect.y1),
            ResizeHandle::Corner(Corner::BottomRight) => Point::new(rect.x1, rect.y1),
            ResizeHandle::Edge(Edge::Top) => Point::new(center.x, rect.y0),
            ResizeHandle::Edge(Edge::Right) => Point::new(rect.x1, center.y),
            ResizeHandle::Edge(Edge::Bottom) => Point::new(center.x, rect.y1),
            ResizeHandle::Edge(Edge::Left) => Point::new(rect.x0, center.y),
        }
    }
}

/// All eight resize handles of an item.
pub fn resize_handles(position: &ItemPosition) -> Vec<(ResizeHandle, Point)> {
    [
        ResizeHandle::Corner(Corner::TopLeft),
        ResizeHandle::Corner(Corner::TopRight),
        ResizeHandle::Corner(Corner::BottomLeft),
        ResizeHandle::Corner(Corner::BottomRight),
        ResizeHandle::Edge(Edge::Top),
        ResizeHandle::Edge(Edge::Right),
        ResizeHandle::Edge(Edge::Bottom),
        ResizeHandle::Edge(Edge::Left),
    ]
    .into_iter()
    .map(|handle| (handle, handle.position_on(position)))
    .collect()
}

/// Find the handle within `tolerance` of `point`, if any.
pub fn hit_test_handles(position: &ItemPosition, point: Point, tolerance: f64) -> Option<ResizeHandle> {
    resize_handles(position)
        .into_iter()
        .find(|(_, at)| (*at - point).hypot() <= tolerance)
        .map(|(handle, _)| handle)
}

/// Compute the box after dragging `handle` by `delta` from `start`.
///
/// `aspect_ratio` is the width/height ratio captured when the gesture began;
/// when set, the dependent dimension is derived from the dominant one. The
/// edge opposite the handle stays fixed. Sizes never drop below the
/// constraint minimums, and the whole box stays inside `bounds` when given.
/// If the minimums cannot fit next to the fixed edge, the box is shifted
/// back inside instead.
pub fn apply_resize(
    start: &ItemPosition,
    handle: ResizeHandle,
    delta: Vec2,
    constraints: &ItemConstraints,
    aspect_ratio: Option<f64>,
    bounds: Option<Rect>,
) -> ItemPosition {
    let (left0, top0) = (start.x, start.y);
    let (right0, bottom0) = (start.x + start.width, start.y + start.height);

    let mut left = left0;
    let mut right = right0;
    let mut top = top0;
    let mut bottom = bottom0;
    if handle.moves_left() {
        left += delta.x;
    }
    if handle.moves_right() {
        right += delta.x;
    }
    if handle.moves_top() {
        top += delta.y;
    }
    if handle.moves_bottom() {
        bottom += delta.y;
    }

    if let Some(b) = bounds {
        if handle.moves_left() {
            left = left.max(b.x0);
        }
        if handle.moves_right() {
            right = right.min(b.x1);
        }
        if handle.moves_top() {
            top = top.max(b.y0);
        }
        if handle.moves_bottom() {
            bottom = bottom.min(b.y1);
        }
    }

    let mut width = right - left;
    let mut height = bottom - top;

    let ratio = aspect_ratio.filter(|r| r.is_finite() && *r > 0.0);
    if let Some(ratio) = ratio {
        match handle {
            ResizeHandle::Edge(Edge::Left | Edge::Right) => height = width / ratio,
            ResizeHandle::Edge(Edge::Top | Edge::Bottom) => width = height * ratio,
            ResizeHandle::Corner(_) => {
                let scale_x = width / start.width.max(f64::EPSILON);
                let scale_y = height / start.height.max(f64::EPSILON);
                if (scale_x - 1.0).abs() >= (scale_y - 1.0).abs() {
                    height = width / ratio;
                } else {
                    width = height * ratio;
                }
            }
        }
    }
    (width, height) = enforce_minimums(width, height, ratio, constraints);

    if let Some(b) = bounds {
        // Room left on each axis with the fixed edge (or center) held in place.
        let center_x = (left0 + right0) / 2.0;
        let center_y = (top0 + bottom0) / 2.0;
        let room_x = if handle.moves_left() {
            right0 - b.x0
        } else if handle.moves_right() {
            b.x1 - left0
        } else {
            2.0 * (center_x - b.x0).min(b.x1 - center_x)
        };
        let room_y = if handle.moves_top() {
            bottom0 - b.y0
        } else if handle.moves_bottom() {
            b.y1 - top0
        } else {
            2.0 * (center_y - b.y0).min(b.y1 - center_y)
        };
        let (room_x, room_y) = (room_x.max(0.0), room_y.max(0.0));

        if width > room_x || height > room_y {
            match ratio {
                Some(_) => {
                    let scale = (room_x / width).min(room_y / height);
                    width *= scale;
                    height *= scale;
                }
                None => {
                    width = width.min(room_x);
                    height = height.min(room_y);
                }
            }
            (width, height) = enforce_minimums(width, height, ratio, constraints);
        }
    }

    let x = if handle.moves_left() {
        right0 - width
    } else if handle.moves_right() {
        left0
    } else {
        (left0 + right0) / 2.0 - width / 2.0
    };
    let y = if handle.moves_top() {
        bottom0 - height
    } else if handle.moves_bottom() {
        top0
    } else {
        (top0 + bottom0) / 2.0 - height / 2.0
    };
    let origin = match bounds {
        Some(b) => clamp_into(Point::new(x, y), width, height, b),
        None => Point::new(x, y),
    };

    ItemPosition {
        x: origin.x,
        y: origin.y,
        width,
        height,
        ..*start
    }
}

/// Grow a size to the constraint minimums, keeping `ratio` when set.
fn enforce_minimums(
    mut width: f64,
    mut height: f64,
    ratio: Option<f64>,
    constraints: &ItemConstraints,
) -> (f64, f64) {
    match ratio {
        Some(ratio) => {
            if width < constraints.min_width {
                width = constraints.min_width;
                height = width / ratio;
            }
            if height < constraints.min_height {
                height = constraints.min_height;
                width = height * ratio;
            }
        }
        None => {
            width = width.max(constraints.min_width);
            height = height.max(constraints.min_height);
        }
    }
    (width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unconstrained() -> ItemConstraints {
        ItemConstraints::new(1.0, 1.0, false)
    }

    fn inside(bounds: Rect, position: &ItemPosition) -> bool {
        let r = position.rect();
        r.x0 >= bounds.x0 - 1e-9 && r.y0 >= bounds.y0 - 1e-9 && r.x1 <= bounds.x1 + 1e-9 && r.y1 <= bounds.y1 + 1e-9
    }

    #[test]
    fn test_bottom_right_resize() {
        let start = ItemPosition::new(0.0, 0.0, 100.0, 100.0);
        let result = apply_resize(
            &start,
            ResizeHandle::Corner(Corner::BottomRight),
            Vec2::new(50.0, 50.0),
            &unconstrained(),
            None,
            None,
        );
        assert!((result.width - 150.0).abs() < f64::EPSILON);
        assert!((result.height - 150.0).abs() < f64::EPSILON);
        assert_eq!(result.x, 0.0);
        assert_eq!(result.y, 0.0);
    }

    #[test]
    fn test_top_left_keeps_opposite_corner() {
        let start = ItemPosition::new(100.0, 100.0, 100.0, 50.0);
        let result = apply_resize(
            &start,
            ResizeHandle::Corner(Corner::TopLeft),
            Vec2::new(20.0, -10.0),
            &unconstrained(),
            None,
            None,
        );
        assert_eq!(result.x, 120.0);
        assert_eq!(result.y, 90.0);
        assert_eq!(result.x + result.width, 200.0);
        assert_eq!(result.y + result.height, 150.0);
    }

    #[test]
    fn test_clamps_to_minimum() {
        let start = ItemPosition::new(0.0, 0.0, 100.0, 100.0);
        let constraints = ItemConstraints::new(50.0, 30.0, false);
        let result = apply_resize(
            &start,
            ResizeHandle::Corner(Corner::TopLeft),
            Vec2::new(500.0, 500.0),
            &constraints,
            None,
            None,
        );
        assert_eq!(result.width, 50.0);
        assert_eq!(result.height, 30.0);
        // Opposite corner stays at (100, 100).
        assert_eq!(result.x, 50.0);
        assert_eq!(result.y, 70.0);
    }

    #[test]
    fn test_aspect_ratio_corner() {
        let start = ItemPosition::new(0.0, 0.0, 100.0, 50.0);
        let result = apply_resize(
            &start,
            ResizeHandle::Corner(Corner::BottomRight),
            Vec2::new(100.0, 10.0),
            &unconstrained(),
            Some(2.0),
            None,
        );
        assert!((result.width / result.height - 2.0).abs() < 1e-9);
        assert!((result.width - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_aspect_ratio_edge_centers_other_axis() {
        let start = ItemPosition::new(0.0, 0.0, 100.0, 50.0);
        let result = apply_resize(
            &start,
            ResizeHandle::Edge(Edge::Right),
            Vec2::new(100.0, 0.0),
            &unconstrained(),
            Some(2.0),
            None,
        );
        assert!((result.height - 100.0).abs() < 1e-9);
        assert!((result.y - -25.0).abs() < 1e-9);
    }

    #[test]
    fn test_aspect_ratio_respects_minimums() {
        let start = ItemPosition::new(0.0, 0.0, 200.0, 50.0);
        let constraints = ItemConstraints::new(50.0, 30.0, true);
        let result = apply_resize(
            &start,
            ResizeHandle::Corner(Corner::BottomRight),
            Vec2::new(-190.0, -45.0),
            &constraints,
            Some(4.0),
            None,
        );
        assert!(result.width >= 50.0);
        assert!(result.height >= 30.0);
        assert!((result.width / result.height - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_bounds_stop_moving_edge() {
        let start = ItemPosition::new(10.0, 10.0, 50.0, 50.0);
        let result = apply_resize(
            &start,
            ResizeHandle::Edge(Edge::Right),
            Vec2::new(500.0, 0.0),
            &unconstrained(),
            None,
            Some(Rect::new(0.0, 0.0, 100.0, 100.0)),
        );
        assert_eq!(result.x + result.width, 100.0);
    }

    #[test]
    fn test_ratio_edge_resize_stays_in_bounds() {
        let start = ItemPosition::new(0.0, 10.0, 100.0, 50.0);
        let bounds = Rect::new(0.0, 0.0, 200.0, 200.0);
        let result = apply_resize(
            &start,
            ResizeHandle::Edge(Edge::Right),
            Vec2::new(200.0, 0.0),
            &unconstrained(),
            Some(2.0),
            Some(bounds),
        );
        // Height is limited to twice the room above the center line (35).
        assert!((result.width - 140.0).abs() < 1e-9);
        assert!((result.height - 70.0).abs() < 1e-9);
        assert!((result.x).abs() < 1e-9);
        assert!((result.y).abs() < 1e-9);
        assert!(inside(bounds, &result));
    }

    #[test]
    fn test_ratio_corner_resize_stays_in_bounds() {
        let start = ItemPosition::new(100.0, 100.0, 50.0, 50.0);
        let bounds = Rect::new(0.0, 0.0, 300.0, 180.0);
        let result = apply_resize(
            &start,
            ResizeHandle::Corner(Corner::BottomRight),
            Vec2::new(300.0, 10.0),
            &unconstrained(),
            Some(1.0),
            Some(bounds),
        );
        assert!((result.width - 80.0).abs() < 1e-9);
        assert!((result.height - 80.0).abs() < 1e-9);
        assert_eq!((result.x, result.y), (100.0, 100.0));
    }

    #[test]
    fn test_minimum_that_cannot_fit_is_shifted_inside() {
        // Starts partly outside; the left handle cannot grow it in place.
        let start = ItemPosition::new(-30.0, 10.0, 40.0, 40.0);
        let bounds = Rect::new(0.0, 0.0, 200.0, 200.0);
        let constraints = ItemConstraints::new(50.0, 30.0, false);
        let result = apply_resize(
            &start,
            ResizeHandle::Edge(Edge::Left),
            Vec2::new(25.0, 0.0),
            &constraints,
            None,
            Some(bounds),
        );
        assert_eq!(result.width, 50.0);
        assert_eq!(result.x, 0.0);
        assert!(inside(bounds, &result));
    }

    #[test]
    fn test_hit_test_handles() {
        let position = ItemPosition::new(0.0, 0.0, 100.0, 50.0);
        assert_eq!(
            hit_test_handles(&position, Point::new(99.0, 49.0), 4.0),
            Some(ResizeHandle::Corner(Corner::BottomRight))
        );
        assert_eq!(
            hit_test_handles(&position, Point::new(50.0, 1.0), 4.0),
            Some(ResizeHandle::Edge(Edge::Top))
        );
        assert_eq!(hit_test_handles(&position, Point::new(50.0, 25.0), 4.0), None);
    }
}
