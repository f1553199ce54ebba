//! The positioning canvas: owns the items and routes every mutation.

use crate::config::{CanvasConfig, EditorMode, EngineConfig, SnapConfig};
use crate::controller::{
    GestureController, GestureKind, GestureState, IgnoreReason, MoveContext, PointerDownOutcome, PointerUpOutcome,
};
use crate::error::{CanvasError, CanvasResult};
use crate::geometry::{BoundingBox, Viewport, clamp_into};
use crate::guides::AlignmentGuide;
use crate::handles::ResizeHandle;
use crate::history::{History, HistoryAction, HistoryEntry};
use crate::input::{Instant, Modifiers};
use crate::item::{ItemId, PositionableItem};
use crate::selection::{self, AlignEdge, DistributeAxis, Selection};
use crate::suppress::{ClickSuppressionGuard, ClickTarget};
use crate::target::{HitPath, classify_target};
use kurbo::{Point, Size, Vec2};
use serde::Serialize;
use std::collections::HashSet;

/// Notifications for the host, drained with [`PositioningCanvas::poll_events`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum CanvasEvent {
    /// A change was committed. Never emitted for intermediate drag frames.
    ItemsChanged(Vec<PositionableItem>),
    SelectionChanged(Vec<ItemId>),
}

/// What the host should do with a click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClickDisposition {
    /// Stop the click before content handlers see it.
    Suppressed,
    /// Deliver the click normally.
    PassThrough,
}

/// Runtime state of one editable canvas.
#[derive(Debug, Clone)]
pub struct PositioningCanvas {
    items: Vec<PositionableItem>,
    canvas: CanvasConfig,
    engine: EngineConfig,
    viewport: Viewport,
    /// Viewport frozen at pointer-down for the running gesture.
    gesture_viewport: Option<Viewport>,
    selection: Selection,
    history: History<HistoryEntry>,
    controller: GestureController,
    suppression: ClickSuppressionGuard,
    guides: Vec<AlignmentGuide>,
    events: Vec<CanvasEvent>,
}

impl PositioningCanvas {
    /// Create an empty canvas.
    pub fn new(canvas: CanvasConfig, engine: EngineConfig) -> CanvasResult<Self> {
        Self::with_items(canvas, engine, Vec::new())
    }

    /// Create a canvas holding `items`. Malformed geometry is repaired.
    pub fn with_items(
        canvas: CanvasConfig,
        engine: EngineConfig,
        items: Vec<PositionableItem>,
    ) -> CanvasResult<Self> {
        canvas.validate()?;
        let items = prepare_items(items, &engine)?;
        let history = History::new(
            HistoryEntry {
                action: HistoryAction::Initial,
                items: items.clone(),
            },
            engine.history_limit,
        );
        Ok(Self {
            items,
            controller: GestureController::new(engine.gesture),
            canvas,
            engine,
            viewport: Viewport::default(),
            gesture_viewport: None,
            selection: Selection::new(),
            history,
            suppression: ClickSuppressionGuard::new(),
            guides: Vec::new(),
            events: Vec::new(),
        })
    }

    // --- Queries ---

    pub fn items(&self) -> &[PositionableItem] {
        &self.items
    }

    pub fn item(&self, id: ItemId) -> Option<&PositionableItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Items back to front. Equal z-indexes keep insertion order.
    pub fn items_by_z(&self) -> Vec<&PositionableItem> {
        let mut ordered: Vec<&PositionableItem> = self.items.iter().collect();
        ordered.sort_by_key(|item| item.position.z_index);
        ordered
    }

    pub fn canvas_config(&self) -> &CanvasConfig {
        &self.canvas
    }

    pub fn engine_config(&self) -> &EngineConfig {
        &self.engine
    }

    pub fn mode(&self) -> EditorMode {
        self.engine.mode
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn selected_ids(&self) -> &[ItemId] {
        self.selection.ids()
    }

    pub fn is_selected(&self, id: ItemId) -> bool {
        self.selection.contains(id)
    }

    /// Union box of the current selection.
    pub fn selection_bounds(&self) -> Option<BoundingBox> {
        selection::selection_bounds(&self.items, self.selection.ids())
    }

    /// Guides matched by the latest drag frame. Empty between gestures.
    pub fn active_guides(&self) -> &[AlignmentGuide] {
        &self.guides
    }

    pub fn gesture_state(&self) -> &GestureState {
        self.controller.state()
    }

    /// When the host should call [`tick`](Self::tick) next, if a hold is pending.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.controller.hold_deadline()
    }

    /// Drain queued events.
    pub fn poll_events(&mut self) -> Vec<CanvasEvent> {
        std::mem::take(&mut self.events)
    }

    // --- Configuration ---

    /// Replace the canvas configuration.
    pub fn set_canvas_config(&mut self, canvas: CanvasConfig) -> CanvasResult<()> {
        canvas.validate()?;
        self.canvas = canvas;
        Ok(())
    }

    /// Switch editor mode, adopting that mode's default constraints.
    ///
    /// Any running gesture is abandoned. Items below the new minimums are
    /// grown and the repair is committed. Entering template mode clears the
    /// selection.
    pub fn set_mode(&mut self, mode: EditorMode) {
        if mode == self.engine.mode {
            return;
        }
        self.cancel_gesture();
        if !mode.is_interactive() {
            self.replace_selection(Selection::new());
        }
        self.engine.mode = mode;
        self.engine.default_constraints = EngineConfig::for_mode(mode).default_constraints;
        log::info!("editor mode set to {:?}", mode);

        for item in &mut self.items {
            normalize_logged(item, &self.engine);
        }
        self.commit(HistoryAction::Repair);
    }

    /// Update scroll offset and zoom. A running gesture keeps the old viewport.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    fn snap_config(&self, viewport: Viewport) -> SnapConfig {
        if self.engine.scale_snap_with_zoom {
            self.engine.snap.scaled_for_zoom(viewport.zoom)
        } else {
            self.engine.snap
        }
    }

    fn index_of(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    // --- Pointer input ---

    /// Pointer pressed on item `id`. `pointer` is in screen space.
    ///
    /// Selection follows the press: a plain press on an unselected item
    /// selects only it, a press with a selection modifier adds it, and a
    /// press on an already selected item keeps the group for a group drag.
    pub fn pointer_down(
        &mut self,
        id: ItemId,
        pointer: Point,
        path: &HitPath,
        modifiers: Modifiers,
        now: Instant,
    ) -> PointerDownOutcome {
        if !self.engine.mode.is_interactive() {
            return PointerDownOutcome::Ignored(IgnoreReason::Disabled);
        }
        let Some(index) = self.index_of(id) else {
            return PointerDownOutcome::Ignored(IgnoreReason::UnknownItem);
        };
        self.suppression.expire(now);

        let target = classify_target(path, id);
        let mut next_selection = self.selection.clone();
        if modifiers.extends_selection() {
            next_selection.add(id);
        } else if !next_selection.contains(id) {
            next_selection.select(id, false);
        }

        let viewport = self.viewport;
        let local = viewport.to_canvas_local(pointer);
        let companions = self.items.iter().filter(|item| next_selection.contains(item.id));
        let outcome = self
            .controller
            .begin_drag(&self.items[index], companions, local, target, now);

        if outcome.is_started() {
            self.gesture_viewport = Some(viewport);
            self.replace_selection(next_selection);
        }
        outcome
    }

    /// Pointer pressed on one of `id`'s resize handles.
    pub fn resize_start(&mut self, id: ItemId, handle: ResizeHandle, pointer: Point) -> PointerDownOutcome {
        if !self.engine.mode.is_interactive() {
            return PointerDownOutcome::Ignored(IgnoreReason::Disabled);
        }
        let Some(index) = self.index_of(id) else {
            return PointerDownOutcome::Ignored(IgnoreReason::UnknownItem);
        };
        let viewport = self.viewport;
        let item = &self.items[index];
        let constraints = item.effective_constraints(&self.engine.default_constraints);
        let outcome = self
            .controller
            .begin_resize(item, handle, viewport.to_canvas_local(pointer), constraints);
        if outcome.is_started() {
            self.gesture_viewport = Some(viewport);
        }
        outcome
    }

    /// Pointer pressed on `id`'s rotation handle.
    pub fn rotate_start(&mut self, id: ItemId, pointer: Point) -> PointerDownOutcome {
        if !self.engine.mode.is_interactive() {
            return PointerDownOutcome::Ignored(IgnoreReason::Disabled);
        }
        let Some(index) = self.index_of(id) else {
            return PointerDownOutcome::Ignored(IgnoreReason::UnknownItem);
        };
        let viewport = self.viewport;
        let outcome = self
            .controller
            .begin_rotate(&self.items[index], viewport.to_canvas_local(pointer));
        if outcome.is_started() {
            self.gesture_viewport = Some(viewport);
        }
        outcome
    }

    /// Pointer moved. Returns true if any item moved this frame.
    pub fn pointer_move(&mut self, pointer: Point, modifiers: Modifiers, now: Instant) -> bool {
        if self.controller.is_idle() {
            return false;
        }
        let viewport = self.gesture_viewport.unwrap_or(self.viewport);
        let snap = self.snap_config(viewport);
        let ctx = MoveContext {
            items: &self.items,
            canvas: Size::new(self.canvas.width, self.canvas.height),
            snap: &snap,
            grid: self.canvas.active_grid(),
            bounds: self.canvas.movement_bounds(),
        };
        let Some(proposal) = self
            .controller
            .pointer_move(viewport.to_canvas_local(pointer), modifiers, now, &ctx)
        else {
            return false;
        };

        let mut moved = false;
        for (id, position) in proposal.positions {
            if let Some(item) = self.items.iter_mut().find(|item| item.id == id) {
                if item.position != position {
                    item.position = position;
                    moved = true;
                }
            }
        }
        self.guides = proposal.guides;
        moved
    }

    /// Pointer released.
    ///
    /// A finished gesture is committed as one history entry and clicks on the
    /// item are suppressed for a short window. A release before the drag
    /// began is reported as a click for the host to handle.
    pub fn pointer_up(&mut self, now: Instant) -> PointerUpOutcome {
        let outcome = self.controller.pointer_up(now);
        self.gesture_viewport = None;
        self.guides.clear();

        if let PointerUpOutcome::Committed { item_id, kind } = outcome {
            self.suppression
                .engage(item_id, now, self.engine.gesture.click_suppression);
            let action = match kind {
                GestureKind::Drag => HistoryAction::Drag,
                GestureKind::Resize(_) => HistoryAction::Resize,
                GestureKind::Rotate => HistoryAction::Rotate,
            };
            self.commit(action);
        }
        outcome
    }

    /// Advance timers. Returns true if a pending press just became a drag.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.suppression.expire(now);
        self.controller.tick(now)
    }

    /// Decide whether a click described by `path` must be swallowed.
    ///
    /// A click on anything nested inside a just-dragged item counts as a
    /// click on that item. Controls are judged against the innermost item.
    pub fn click(&mut self, path: &HitPath, now: Instant) -> ClickDisposition {
        let target = match path.innermost_item() {
            Some(inner) => {
                let id = path
                    .item_ids()
                    .find(|id| self.suppression.is_flagged(*id, now))
                    .unwrap_or(inner);
                ClickTarget::Item(id, classify_target(path, inner))
            }
            None => ClickTarget::Canvas,
        };
        self.click_target(target, now)
    }

    /// Like [`click`](Self::click) with a pre-classified target.
    pub fn click_target(&mut self, target: ClickTarget, now: Instant) -> ClickDisposition {
        if self.suppression.should_suppress(target, now) {
            log::debug!("suppressed click on {:?}", target);
            ClickDisposition::Suppressed
        } else {
            ClickDisposition::PassThrough
        }
    }

    /// Abandon the running gesture and put moved items back.
    pub fn cancel_gesture(&mut self) -> bool {
        if self.controller.is_idle() {
            return false;
        }
        for (id, position) in self.controller.cancel() {
            if let Some(item) = self.items.iter_mut().find(|item| item.id == id) {
                item.position = position;
            }
        }
        self.gesture_viewport = None;
        self.guides.clear();
        true
    }

    // --- Selection ---

    /// Select `id`, replacing the selection or toggling it when `multi`.
    /// Selection is frozen in template mode.
    pub fn select(&mut self, id: ItemId, multi: bool) -> CanvasResult<()> {
        if self.index_of(id).is_none() {
            return Err(CanvasError::ItemNotFound(id));
        }
        if !self.engine.mode.is_interactive() {
            return Ok(());
        }
        let mut next = self.selection.clone();
        next.select(id, multi);
        self.replace_selection(next);
        Ok(())
    }

    pub fn deselect_all(&mut self) {
        if self.engine.mode.is_interactive() {
            self.replace_selection(Selection::new());
        }
    }

    /// Select every visible item.
    pub fn select_all(&mut self) {
        if !self.engine.mode.is_interactive() {
            return;
        }
        let mut next = Selection::new();
        next.set(self.items.iter().filter(|item| item.visible).map(|item| item.id));
        self.replace_selection(next);
    }

    fn replace_selection(&mut self, next: Selection) {
        if next != self.selection {
            self.selection = next;
            self.events
                .push(CanvasEvent::SelectionChanged(self.selection.ids().to_vec()));
        }
    }

    fn prune_selection(&mut self) {
        let live: HashSet<ItemId> = self.items.iter().map(|item| item.id).collect();
        if self.selection.retain(|id| live.contains(&id)) {
            self.events
                .push(CanvasEvent::SelectionChanged(self.selection.ids().to_vec()));
        }
    }

    // --- Layout operations ---

    /// Align the selection. No-op with fewer than two movable items.
    pub fn align(&mut self, edge: AlignEdge) -> bool {
        if !self.layout_allowed() {
            return false;
        }
        let ids = self.selection.ids().to_vec();
        selection::align(&mut self.items, &ids, edge) && self.commit(HistoryAction::Align)
    }

    /// Distribute the selection. No-op with fewer than three movable items.
    pub fn distribute(&mut self, axis: DistributeAxis) -> bool {
        if !self.layout_allowed() {
            return false;
        }
        let ids = self.selection.ids().to_vec();
        selection::distribute(&mut self.items, &ids, axis) && self.commit(HistoryAction::Distribute)
    }

    /// Move the selection by whole nudge steps.
    pub fn nudge_selection(&mut self, dx_steps: i32, dy_steps: i32, large: bool) -> bool {
        if !self.layout_allowed() || (dx_steps == 0 && dy_steps == 0) {
            return false;
        }
        let step = if large {
            self.engine.gesture.nudge_step_large
        } else {
            self.engine.gesture.nudge_step
        };
        let offset = Vec2::new(f64::from(dx_steps) * step, f64::from(dy_steps) * step);
        let bounds = self.canvas.movement_bounds();

        for item in &mut self.items {
            if !self.selection.contains(item.id) || item.locked {
                continue;
            }
            let mut origin = item.position.origin() + offset;
            if let Some(bounds) = bounds {
                origin = clamp_into(origin, item.position.width, item.position.height, bounds);
            }
            item.position.set_origin(origin);
        }
        self.commit(HistoryAction::Nudge)
    }

    fn layout_allowed(&self) -> bool {
        self.engine.mode.is_interactive() && self.controller.is_idle()
    }

    // --- Z-order ---

    /// Ids back to front.
    fn z_order(&self) -> Vec<ItemId> {
        self.items_by_z().into_iter().map(|item| item.id).collect()
    }

    /// Renumber z-indexes to match `order` and commit if anything changed.
    fn apply_z_order(&mut self, order: &[ItemId]) -> bool {
        for (z, id) in order.iter().enumerate() {
            if let Some(item) = self.items.iter_mut().find(|item| item.id == *id) {
                item.position.z_index = z as i32;
            }
        }
        self.commit(HistoryAction::Reorder)
    }

    fn reorder(&mut self, id: ItemId, change: impl FnOnce(&mut Vec<ItemId>, usize)) -> CanvasResult<bool> {
        let mut order = self.z_order();
        let Some(pos) = order.iter().position(|&other| other == id) else {
            return Err(CanvasError::ItemNotFound(id));
        };
        let before = order.clone();
        change(&mut order, pos);
        if order == before {
            return Ok(false);
        }
        Ok(self.apply_z_order(&order))
    }

    /// Bring an item to the front (topmost).
    pub fn bring_to_front(&mut self, id: ItemId) -> CanvasResult<bool> {
        self.reorder(id, |order, pos| {
            let id = order.remove(pos);
            order.push(id);
        })
    }

    /// Send an item to the back (bottommost).
    pub fn send_to_back(&mut self, id: ItemId) -> CanvasResult<bool> {
        self.reorder(id, |order, pos| {
            let id = order.remove(pos);
            order.insert(0, id);
        })
    }

    /// Move an item one layer forward.
    pub fn bring_forward(&mut self, id: ItemId) -> CanvasResult<bool> {
        self.reorder(id, |order, pos| {
            if pos + 1 < order.len() {
                order.swap(pos, pos + 1);
            }
        })
    }

    /// Move an item one layer backward.
    pub fn send_backward(&mut self, id: ItemId) -> CanvasResult<bool> {
        self.reorder(id, |order, pos| {
            if pos > 0 {
                order.swap(pos, pos - 1);
            }
        })
    }

    // --- Item lifecycle ---

    /// Add an item, repairing malformed geometry.
    pub fn add_item(&mut self, mut item: PositionableItem) -> CanvasResult<ItemId> {
        if self.index_of(item.id).is_some() {
            return Err(CanvasError::DuplicateItem(item.id));
        }
        normalize_logged(&mut item, &self.engine);
        let id = item.id;
        self.items.push(item);
        self.commit(HistoryAction::Add);
        Ok(id)
    }

    /// Remove an item and drop it from the selection.
    pub fn remove_item(&mut self, id: ItemId) -> CanvasResult<PositionableItem> {
        let index = self.index_of(id).ok_or(CanvasError::ItemNotFound(id))?;
        if self.controller.active_item() == Some(id) {
            self.cancel_gesture();
        }
        let removed = self.items.remove(index);
        self.prune_selection();
        self.commit(HistoryAction::Delete);
        Ok(removed)
    }

    /// Remove every selected item. Returns how many were removed.
    pub fn delete_selected(&mut self) -> usize {
        if self.selection.is_empty() {
            return 0;
        }
        self.cancel_gesture();
        let before = self.items.len();
        let selected = &self.selection;
        self.items.retain(|item| !selected.contains(item.id));
        let removed = before - self.items.len();
        self.prune_selection();
        self.commit(HistoryAction::Delete);
        removed
    }

    /// Copy an item with a fresh id, offset and stacked on top. The copy
    /// becomes the selection.
    pub fn duplicate_item(&mut self, id: ItemId) -> CanvasResult<ItemId> {
        let copies = self.duplicate_ids(&[id])?;
        Ok(copies[0])
    }

    /// Copy every selected item. The copies become the selection.
    pub fn duplicate_selected(&mut self) -> Vec<ItemId> {
        let ids = self.selection.ids().to_vec();
        self.duplicate_ids(&ids).unwrap_or_default()
    }

    fn duplicate_ids(&mut self, ids: &[ItemId]) -> CanvasResult<Vec<ItemId>> {
        if let Some(missing) = ids.iter().find(|id| self.index_of(**id).is_none()) {
            return Err(CanvasError::ItemNotFound(*missing));
        }
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let offset = self.engine.gesture.duplicate_offset;
        let mut top = self.items.iter().map(|item| item.position.z_index).max().unwrap_or(0);
        let mut copies = Vec::with_capacity(ids.len());
        for id in ids {
            let Some(source) = self.item(*id) else { continue };
            let mut copy = source.duplicate(offset);
            top += 1;
            copy.position.z_index = top;
            copies.push(copy);
        }
        let new_ids: Vec<ItemId> = copies.iter().map(|item| item.id).collect();
        self.items.extend(copies);
        self.commit(HistoryAction::Duplicate);

        let mut next = Selection::new();
        next.set(new_ids.iter().copied());
        self.replace_selection(next);
        Ok(new_ids)
    }

    /// Replace every item, keeping selected ids that still exist.
    pub fn set_items(&mut self, items: Vec<PositionableItem>) -> CanvasResult<()> {
        let items = prepare_items(items, &self.engine)?;
        self.cancel_gesture();
        self.items = items;
        self.prune_selection();
        self.commit(HistoryAction::Replace);
        Ok(())
    }

    /// Replace an item's host-owned content payload.
    pub fn update_item_content(&mut self, id: ItemId, content: serde_json::Value) -> CanvasResult<()> {
        let index = self.index_of(id).ok_or(CanvasError::ItemNotFound(id))?;
        self.items[index].content = content;
        self.commit(HistoryAction::Edit);
        Ok(())
    }

    // --- History ---

    /// Record the current items if they differ from the last entry.
    fn commit(&mut self, action: HistoryAction) -> bool {
        if self.history.current().items == self.items {
            return false;
        }
        self.history.push(HistoryEntry {
            action,
            items: self.items.clone(),
        });
        log::info!("committed {:?} ({} items)", action, self.items.len());
        self.events.push(CanvasEvent::ItemsChanged(self.items.clone()));
        true
    }

    /// Snapshots taken under an earlier mode may predate its minimums.
    fn restore(&mut self, mut items: Vec<PositionableItem>) {
        for item in &mut items {
            normalize_logged(item, &self.engine);
        }
        self.items = items;
        self.prune_selection();
        self.events.push(CanvasEvent::ItemsChanged(self.items.clone()));
    }

    /// Step back one entry. Returns false at the oldest entry.
    pub fn undo(&mut self) -> bool {
        self.cancel_gesture();
        let Some(entry) = self.history.undo() else {
            return false;
        };
        let items = entry.items.clone();
        log::info!("undo to {:?}", entry.action);
        self.restore(items);
        true
    }

    /// Step forward one entry. Returns false at the newest entry.
    pub fn redo(&mut self) -> bool {
        self.cancel_gesture();
        let Some(entry) = self.history.redo() else {
            return false;
        };
        let items = entry.items.clone();
        log::info!("redo {:?}", entry.action);
        self.restore(items);
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }
}

fn normalize_logged(item: &mut PositionableItem, engine: &EngineConfig) {
    if item.normalize(&engine.default_constraints) {
        log::warn!("repaired malformed geometry on item {}", item.id);
    }
}

fn prepare_items(mut items: Vec<PositionableItem>, engine: &EngineConfig) -> CanvasResult<Vec<PositionableItem>> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in &mut items {
        if !seen.insert(item.id) {
            return Err(CanvasError::DuplicateItem(item.id));
        }
        normalize_logged(item, engine);
    }
    Ok(items)
}
