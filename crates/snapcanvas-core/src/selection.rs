//! Selection set and multi-item layout operations.

use crate::geometry::{BoundingBox, union_bounds};
use crate::item::{ItemId, PositionableItem};
use serde::{Deserialize, Serialize};

/// Minimum selection size for [`align`].
pub const MIN_ALIGN_COUNT: usize = 2;
/// Minimum selection size for [`distribute`].
pub const MIN_DISTRIBUTE_COUNT: usize = 3;

/// Edge or center line used by [`align`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignEdge {
    Left,
    Center,
    Right,
    Top,
    Middle,
    Bottom,
}

/// Direction used by [`distribute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistributeAxis {
    Horizontal,
    Vertical,
}

/// Ordered set of selected item ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<ItemId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selection with `id`, or toggle `id` when `multi` is set.
    pub fn select(&mut self, id: ItemId, multi: bool) {
        if multi {
            if let Some(index) = self.ids.iter().position(|&s| s == id) {
                self.ids.remove(index);
            } else {
                self.ids.push(id);
            }
        } else {
            self.ids.clear();
            self.ids.push(id);
        }
    }

    /// Add `id` if it isn't already selected.
    pub fn add(&mut self, id: ItemId) {
        if !self.ids.contains(&id) {
            self.ids.push(id);
        }
    }

    /// Replace the whole selection.
    pub fn set(&mut self, ids: impl IntoIterator<Item = ItemId>) {
        self.ids.clear();
        for id in ids {
            self.add(id);
        }
    }

    /// Drop ids for which `keep` returns false. Returns true if any were dropped.
    pub fn retain(&mut self, mut keep: impl FnMut(ItemId) -> bool) -> bool {
        let before = self.ids.len();
        self.ids.retain(|&id| keep(id));
        before != self.ids.len()
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.ids.contains(&id)
    }

    pub fn ids(&self) -> &[ItemId] {
        &self.ids
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Indices of selected items that layout operations may move.
fn movable_indices(items: &[PositionableItem], ids: &[ItemId]) -> Vec<usize> {
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| ids.contains(&item.id) && !item.locked)
        .map(|(i, _)| i)
        .collect()
}

/// Line every selected item up with one side (or center) of their union box.
///
/// Locked items neither move nor count. Returns false, leaving everything
/// untouched, when fewer than two items take part.
pub fn align(items: &mut [PositionableItem], ids: &[ItemId], edge: AlignEdge) -> bool {
    let indices = movable_indices(items, ids);
    if indices.len() < MIN_ALIGN_COUNT {
        return false;
    }
    let Some(bounds) = union_bounds(indices.iter().map(|&i| &items[i])) else {
        return false;
    };

    for &i in &indices {
        let pos = &mut items[i].position;
        match edge {
            AlignEdge::Left => pos.x = bounds.left,
            AlignEdge::Center => pos.x = bounds.center_x - pos.width / 2.0,
            AlignEdge::Right => pos.x = bounds.right - pos.width,
            AlignEdge::Top => pos.y = bounds.top,
            AlignEdge::Middle => pos.y = bounds.center_y - pos.height / 2.0,
            AlignEdge::Bottom => pos.y = bounds.bottom - pos.height,
        }
    }

    log::info!("aligned {} items to {:?}", indices.len(), edge);
    true
}

/// Space selected items with equal gaps between the outermost two.
///
/// Items are ordered by their leading edge. When the items are wider than the
/// span they are packed edge to edge instead of overlapping. Returns false
/// when fewer than three items take part.
pub fn distribute(items: &mut [PositionableItem], ids: &[ItemId], axis: DistributeAxis) -> bool {
    let mut indices = movable_indices(items, ids);
    if indices.len() < MIN_DISTRIBUTE_COUNT {
        return false;
    }

    let lead = |item: &PositionableItem| match axis {
        DistributeAxis::Horizontal => item.position.x,
        DistributeAxis::Vertical => item.position.y,
    };
    let extent = |item: &PositionableItem| match axis {
        DistributeAxis::Horizontal => item.position.width,
        DistributeAxis::Vertical => item.position.height,
    };

    indices.sort_by(|&a, &b| lead(&items[a]).total_cmp(&lead(&items[b])));

    let first = &items[indices[0]];
    let last = &items[indices[indices.len() - 1]];
    let start = lead(first);
    let span = lead(last) + extent(last) - start;
    let total_extent: f64 = indices.iter().map(|&i| extent(&items[i])).sum();
    let gap = ((span - total_extent) / (indices.len() - 1) as f64).max(0.0);

    let mut cursor = start;
    for &i in &indices {
        let size = extent(&items[i]);
        let pos = &mut items[i].position;
        match axis {
            DistributeAxis::Horizontal => pos.x = cursor,
            DistributeAxis::Vertical => pos.y = cursor,
        }
        cursor += size + gap;
    }

    log::info!("distributed {} items {:?} with gap {:.2}", indices.len(), axis, gap);
    true
}

/// Union box of the selected items, if any are present.
pub fn selection_bounds(items: &[PositionableItem], ids: &[ItemId]) -> Option<BoundingBox> {
    union_bounds(items.iter().filter(|item| ids.contains(&item.id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{ItemKind, ItemPosition};

    fn item(x: f64, y: f64, w: f64, h: f64) -> PositionableItem {
        PositionableItem::new(ItemKind::Shape, ItemPosition::new(x, y, w, h))
    }

    fn ids(items: &[PositionableItem]) -> Vec<ItemId> {
        items.iter().map(|i| i.id).collect()
    }

    #[test]
    fn test_select_replace_and_toggle() {
        let a = ItemId::new_v4();
        let b = ItemId::new_v4();
        let mut selection = Selection::new();
        selection.select(a, false);
        selection.select(b, false);
        assert_eq!(selection.ids(), &[b]);
        selection.select(a, true);
        assert_eq!(selection.ids(), &[b, a]);
        selection.select(b, true);
        assert_eq!(selection.ids(), &[a]);
        selection.select(a, true);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_align_left() {
        let mut items = vec![item(30.0, 0.0, 10.0, 10.0), item(10.0, 50.0, 40.0, 10.0), item(70.0, 90.0, 5.0, 10.0)];
        let selected = ids(&items);
        assert!(align(&mut items, &selected, AlignEdge::Left));
        assert!(items.iter().all(|i| i.position.x == 10.0));
        // Other axis untouched.
        assert_eq!(items[2].position.y, 90.0);
    }

    #[test]
    fn test_align_right_center_bottom_middle() {
        let mut items = vec![item(0.0, 0.0, 10.0, 10.0), item(90.0, 40.0, 10.0, 60.0)];
        let selected = ids(&items);

        align(&mut items, &selected, AlignEdge::Right);
        assert!(items.iter().all(|i| i.position.x + i.position.width == 100.0));

        align(&mut items, &selected, AlignEdge::Center);
        assert!(items.iter().all(|i| (i.position.x + i.position.width / 2.0 - 95.0).abs() < 1e-9));

        align(&mut items, &selected, AlignEdge::Bottom);
        assert!(items.iter().all(|i| i.position.y + i.position.height == 100.0));

        align(&mut items, &selected, AlignEdge::Middle);
        assert!(items.iter().all(|i| (i.position.y + i.position.height / 2.0 - 70.0).abs() < 1e-9));

        align(&mut items, &selected, AlignEdge::Top);
        assert!(items.iter().all(|i| i.position.y == 40.0));
    }

    #[test]
    fn test_align_needs_two_items() {
        let mut items = vec![item(30.0, 0.0, 10.0, 10.0), item(10.0, 50.0, 40.0, 10.0)];
        let only_first = vec![items[0].id];
        assert!(!align(&mut items, &only_first, AlignEdge::Left));
        assert_eq!(items[0].position.x, 30.0);
    }

    #[test]
    fn test_align_skips_locked() {
        let mut items = vec![item(30.0, 0.0, 10.0, 10.0), item(10.0, 50.0, 40.0, 10.0).locked(true), item(20.0, 0.0, 5.0, 5.0)];
        let selected = ids(&items);
        assert!(align(&mut items, &selected, AlignEdge::Left));
        assert_eq!(items[0].position.x, 20.0);
        assert_eq!(items[1].position.x, 10.0);
    }

    #[test]
    fn test_distribute_horizontal_equal_gaps() {
        let mut items = vec![item(200.0, 0.0, 20.0, 20.0), item(0.0, 0.0, 20.0, 20.0), item(50.0, 0.0, 20.0, 20.0)];
        let selected = ids(&items);
        assert!(distribute(&mut items, &selected, DistributeAxis::Horizontal));

        let mut xs: Vec<(f64, f64)> = items.iter().map(|i| (i.position.x, i.position.width)).collect();
        xs.sort_by(|a, b| a.0.total_cmp(&b.0));
        let gap1 = xs[1].0 - (xs[0].0 + xs[0].1);
        let gap2 = xs[2].0 - (xs[1].0 + xs[1].1);
        assert!((gap1 - gap2).abs() < 1e-9);
        assert!((gap1 - 80.0).abs() < 1e-9);
        // Outer items stay put.
        assert_eq!(xs[0].0, 0.0);
        assert_eq!(xs[2].0, 200.0);
    }

    #[test]
    fn test_distribute_vertical_packs_when_overfull() {
        let mut items = vec![item(0.0, 0.0, 10.0, 50.0), item(0.0, 10.0, 10.0, 50.0), item(0.0, 20.0, 10.0, 50.0)];
        let selected = ids(&items);
        assert!(distribute(&mut items, &selected, DistributeAxis::Vertical));
        assert_eq!(items[0].position.y, 0.0);
        assert_eq!(items[1].position.y, 50.0);
        assert_eq!(items[2].position.y, 100.0);
    }

    #[test]
    fn test_distribute_needs_three_items() {
        let mut items = vec![item(0.0, 0.0, 10.0, 10.0), item(100.0, 0.0, 10.0, 10.0)];
        let selected = ids(&items);
        assert!(!distribute(&mut items, &selected, DistributeAxis::Horizontal));
    }

    #[test]
    fn test_selection_bounds() {
        let items = vec![item(0.0, 0.0, 10.0, 10.0), item(100.0, 50.0, 10.0, 10.0)];
        let bounds = selection_bounds(&items, &ids(&items)).unwrap();
        assert_eq!(bounds.right, 110.0);
        assert_eq!(bounds.bottom, 60.0);
        assert!(selection_bounds(&items, &[]).is_none());
    }
}
