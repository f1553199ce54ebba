//! Alignment guide detection against other items and the canvas center.

use crate::config::SnapConfig;
use crate::geometry::{BoundingBox, bounding_box};
use crate::item::{ItemId, PositionableItem};
use kurbo::Size;
use serde::{Deserialize, Serialize};

/// Orientation of a guide line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuideAxis {
    /// A vertical line at some x; aligns left/center/right edges.
    Vertical,
    /// A horizontal line at some y; aligns top/middle/bottom edges.
    Horizontal,
}

/// Which part of the active item touched the guide.
///
/// Start is left (vertical) or top (horizontal); End is right or bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    Start,
    Center,
    End,
}

impl Anchor {
    /// Offset of this anchor from the item's leading edge.
    pub fn offset(self, extent: f64) -> f64 {
        match self {
            Anchor::Start => 0.0,
            Anchor::Center => extent / 2.0,
            Anchor::End => extent,
        }
    }
}

/// A line the dragged item currently lines up with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignmentGuide {
    pub axis: GuideAxis,
    /// x for vertical guides, y for horizontal guides.
    pub position: f64,
    /// Item the guide came from; `None` for canvas-center guides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_item_id: Option<ItemId>,
}

/// The winning guide on one axis and how it matched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuideMatch {
    pub guide: AlignmentGuide,
    pub anchor: Anchor,
    /// Absolute distance between the anchor and the guide.
    pub distance: f64,
}

/// At most one guide per axis.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GuideSet {
    pub vertical: Option<GuideMatch>,
    pub horizontal: Option<GuideMatch>,
}

impl GuideSet {
    /// No guides matched.
    pub fn is_empty(&self) -> bool {
        self.vertical.is_none() && self.horizontal.is_none()
    }

    /// The matched guide lines, vertical first.
    pub fn guides(&self) -> Vec<AlignmentGuide> {
        self.vertical
            .iter()
            .chain(self.horizontal.iter())
            .map(|m| m.guide)
            .collect()
    }
}

/// Keeps the closest candidate per axis.
struct AxisBest {
    threshold: f64,
    best: Option<GuideMatch>,
}

impl AxisBest {
    fn new(threshold: f64) -> Self {
        Self { threshold, best: None }
    }

    fn offer(&mut self, axis: GuideAxis, anchor: Anchor, value: f64, line: f64, source: Option<ItemId>) {
        let distance = (value - line).abs();
        if !(distance < self.threshold) {
            return;
        }
        // Ties keep the earlier candidate so guides don't flicker between equals.
        if self.best.is_some_and(|b| b.distance <= distance) {
            return;
        }
        self.best = Some(GuideMatch {
            guide: AlignmentGuide {
                axis,
                position: line,
                source_item_id: source,
            },
            anchor,
            distance,
        });
    }
}

/// Find the closest vertical and horizontal guide for a prospective box.
///
/// `excluded` lists items that must never act as targets, typically the
/// active item and anything moving with it. Locked and invisible items are
/// skipped as targets as well.
pub fn detect_guides<'a>(
    prospective: &BoundingBox,
    items: impl IntoIterator<Item = &'a PositionableItem>,
    excluded: &[ItemId],
    canvas: Size,
    config: &SnapConfig,
) -> GuideSet {
    let mut vertical = AxisBest::new(config.threshold);
    let mut horizontal = AxisBest::new(config.threshold);

    if config.canvas_center {
        vertical.offer(GuideAxis::Vertical, Anchor::Center, prospective.center_x, canvas.width / 2.0, None);
        horizontal.offer(GuideAxis::Horizontal, Anchor::Center, prospective.center_y, canvas.height / 2.0, None);
    }

    for item in items {
        if excluded.contains(&item.id) || !item.is_alignment_target() {
            continue;
        }
        let other = bounding_box(item);
        let source = Some(item.id);

        vertical.offer(GuideAxis::Vertical, Anchor::Start, prospective.left, other.left, source);
        vertical.offer(GuideAxis::Vertical, Anchor::Center, prospective.center_x, other.center_x, source);
        vertical.offer(GuideAxis::Vertical, Anchor::End, prospective.right, other.right, source);

        horizontal.offer(GuideAxis::Horizontal, Anchor::Start, prospective.top, other.top, source);
        horizontal.offer(GuideAxis::Horizontal, Anchor::Center, prospective.center_y, other.center_y, source);
        horizontal.offer(GuideAxis::Horizontal, Anchor::End, prospective.bottom, other.bottom, source);
    }

    let set = GuideSet {
        vertical: vertical.best,
        horizontal: horizontal.best,
    };
    if !set.is_empty() {
        log::trace!("guides matched: {:?}", set.guides());
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{ItemKind, ItemPosition};

    fn item(x: f64, y: f64, w: f64, h: f64) -> PositionableItem {
        PositionableItem::new(ItemKind::Shape, ItemPosition::new(x, y, w, h))
    }

    fn no_center() -> SnapConfig {
        SnapConfig {
            canvas_center: false,
            ..SnapConfig::default()
        }
    }

    const CANVAS: Size = Size::new(1000.0, 800.0);

    #[test]
    fn test_top_edge_guide() {
        let a = item(100.0, 102.0, 50.0, 50.0);
        let b = item(160.0, 100.0, 50.0, 50.0);
        let items = [a.clone(), b.clone()];
        let set = detect_guides(&bounding_box(&a), &items, &[a.id], CANVAS, &SnapConfig::default());

        let m = set.horizontal.expect("horizontal guide");
        assert_eq!(m.guide.axis, GuideAxis::Horizontal);
        assert_eq!(m.guide.position, 100.0);
        assert_eq!(m.guide.source_item_id, Some(b.id));
        assert_eq!(m.anchor, Anchor::Start);
        assert!((m.distance - 2.0).abs() < 1e-9);
        assert!(set.vertical.is_none());
    }

    #[test]
    fn test_never_aligns_with_itself() {
        let a = item(100.0, 100.0, 50.0, 50.0);
        let items = [a.clone()];
        let set = detect_guides(&bounding_box(&a), &items, &[a.id], CANVAS, &no_center());
        assert!(set.is_empty());
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let a = item(0.0, 0.0, 50.0, 50.0);
        let b = item(203.0, 300.0, 50.0, 50.0);
        let items = [b.clone()];
        let moving = BoundingBox::new(200.0, 0.0, 50.0, 50.0);
        let set = detect_guides(&moving, &items, &[a.id], CANVAS, &no_center());
        assert!(set.vertical.is_none());

        let moving = BoundingBox::new(200.5, 0.0, 50.0, 50.0);
        let set = detect_guides(&moving, &items, &[a.id], CANVAS, &no_center());
        assert!(set.vertical.is_some());
    }

    #[test]
    fn test_locked_and_hidden_items_are_not_targets() {
        let a = item(0.0, 0.0, 50.0, 50.0);
        let locked = item(1.0, 300.0, 50.0, 50.0).locked(true);
        let mut hidden = item(1.0, 500.0, 50.0, 50.0);
        hidden.visible = false;
        let items = [a.clone(), locked, hidden];
        let set = detect_guides(&bounding_box(&a), &items, &[a.id], CANVAS, &no_center());
        assert!(set.is_empty());
    }

    #[test]
    fn test_closest_candidate_wins() {
        let a = item(100.0, 0.0, 50.0, 50.0);
        let far = item(102.5, 300.0, 80.0, 50.0); // left edges 2.5 apart
        let near = item(99.0, 500.0, 51.0, 50.0); // right edges 0 apart
        let items = [far, near.clone()];
        let set = detect_guides(&bounding_box(&a), &items, &[a.id], CANVAS, &no_center());
        let m = set.vertical.unwrap();
        assert_eq!(m.guide.source_item_id, Some(near.id));
        assert_eq!(m.anchor, Anchor::End);
        assert_eq!(m.guide.position, 150.0);
    }

    #[test]
    fn test_canvas_center() {
        // Center x at 499, canvas center at 500.
        let moving = BoundingBox::new(474.0, 10.0, 50.0, 50.0);
        let set = detect_guides(&moving, std::iter::empty(), &[], CANVAS, &SnapConfig::default());
        let m = set.vertical.unwrap();
        assert_eq!(m.guide.position, 500.0);
        assert_eq!(m.guide.source_item_id, None);
        assert_eq!(m.anchor, Anchor::Center);
        assert!(set.horizontal.is_none());
    }

    #[test]
    fn test_guides_list() {
        let set = GuideSet {
            vertical: None,
            horizontal: Some(GuideMatch {
                guide: AlignmentGuide {
                    axis: GuideAxis::Horizontal,
                    position: 10.0,
                    source_item_id: None,
                },
                anchor: Anchor::Start,
                distance: 1.0,
            }),
        };
        assert_eq!(set.guides().len(), 1);
        assert_eq!(Anchor::End.offset(40.0), 40.0);
        assert_eq!(Anchor::Center.offset(40.0), 20.0);
    }
}
