//! Pointer gesture state machine for drag, resize and rotate.
//!
//! The controller never touches the item list. It reads a snapshot on every
//! move and hands back a [`Proposal`]; the owner decides whether to write it.

use crate::config::{GestureConfig, SnapConfig};
use crate::geometry::{BoundingBox, clamp_into, distance};
use crate::guides::{AlignmentGuide, GuideSet, detect_guides};
use crate::handles::{ResizeHandle, apply_resize};
use crate::input::{Instant, Modifiers};
use crate::item::{ItemConstraints, ItemId, ItemPosition, PositionableItem};
use crate::snap::{normalize_degrees, snap_angle, snap_position};
use crate::target::PointerTarget;
use crate::timer::HoldTimer;
use kurbo::{Point, Rect, Size, Vec2};

/// Which gesture finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    Drag,
    Resize(ResizeHandle),
    Rotate,
}

/// A drag that has been armed or is running.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    /// Item under the pointer.
    pub item_id: ItemId,
    /// Canvas-local pointer position at pointer-down.
    pub pointer_start: Point,
    /// Every item that moves with the pointer, with its starting position.
    /// The active item is always first.
    pub origins: Vec<(ItemId, ItemPosition)>,
}

impl DragSession {
    fn moving_ids(&self) -> Vec<ItemId> {
        self.origins.iter().map(|(id, _)| *id).collect()
    }

    fn active_start(&self) -> ItemPosition {
        self.origins[0].1
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResizeSession {
    pub item_id: ItemId,
    pub handle: ResizeHandle,
    pub pointer_start: Point,
    pub start: ItemPosition,
    pub constraints: ItemConstraints,
    /// Width/height ratio at gesture start.
    pub start_ratio: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RotateSession {
    pub item_id: ItemId,
    pub start: ItemPosition,
    pub center: Point,
    /// Pointer angle at gesture start, in degrees with 0 pointing up.
    pub start_angle: f64,
}

/// Gesture state.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    PendingDrag(DragSession),
    Dragging(DragSession),
    Resizing(ResizeSession),
    Rotating(RotateSession),
}

impl GestureState {
    fn name(&self) -> &'static str {
        match self {
            GestureState::Idle => "idle",
            GestureState::PendingDrag(_) => "pending-drag",
            GestureState::Dragging(_) => "dragging",
            GestureState::Resizing(_) => "resizing",
            GestureState::Rotating(_) => "rotating",
        }
    }
}

/// Why a pointer-down did not start a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Another gesture is already running.
    Busy,
    /// The item is locked or hidden.
    NotInteractive,
    /// The pointer landed on something that owns the gesture itself.
    Routed(PointerTarget),
    /// Interaction is disabled for this editor mode.
    Disabled,
    /// No such item.
    UnknownItem,
}

/// Result of a pointer-down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerDownOutcome {
    /// A gesture was armed or started.
    Started,
    Ignored(IgnoreReason),
}

impl PointerDownOutcome {
    pub fn is_started(self) -> bool {
        matches!(self, PointerDownOutcome::Started)
    }
}

/// Result of a pointer-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerUpOutcome {
    /// No gesture was running.
    None,
    /// The pointer came up before the drag began; the click belongs to the host.
    Click(ItemId),
    /// A gesture finished and its last proposal should be committed.
    Committed { item_id: ItemId, kind: GestureKind },
}

/// Positions the controller wants written for the current frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Proposal {
    pub positions: Vec<(ItemId, ItemPosition)>,
    /// Guides that matched this frame.
    pub guides: Vec<AlignmentGuide>,
}

/// Read-only context for one pointer-move frame.
#[derive(Debug, Clone, Copy)]
pub struct MoveContext<'a> {
    pub items: &'a [PositionableItem],
    pub canvas: Size,
    pub snap: &'a SnapConfig,
    pub grid: Option<f64>,
    pub bounds: Option<Rect>,
}

/// Pointer angle around `center` in degrees, 0 pointing up, clockwise positive.
pub fn pointer_angle(center: Point, pointer: Point) -> f64 {
    let v = pointer - center;
    normalize_degrees(v.y.atan2(v.x).to_degrees() + 90.0)
}

/// Drives one gesture at a time.
#[derive(Debug, Clone, Default)]
pub struct GestureController {
    state: GestureState,
    hold: HoldTimer,
    config: GestureConfig,
}

impl GestureController {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            state: GestureState::Idle,
            hold: HoldTimer::new(),
            config,
        }
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: GestureConfig) {
        self.config = config;
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, GestureState::Idle)
    }

    /// Item the current gesture belongs to.
    pub fn active_item(&self) -> Option<ItemId> {
        match &self.state {
            GestureState::Idle => None,
            GestureState::PendingDrag(s) | GestureState::Dragging(s) => Some(s.item_id),
            GestureState::Resizing(s) => Some(s.item_id),
            GestureState::Rotating(s) => Some(s.item_id),
        }
    }

    /// Deadline of the pending hold timer, for hosts that schedule wakeups.
    pub fn hold_deadline(&self) -> Option<Instant> {
        self.hold.deadline()
    }

    fn transition(&mut self, next: GestureState) {
        log::debug!("gesture {} -> {}", self.state.name(), next.name());
        self.state = next;
    }

    fn admit(&self, item: &PositionableItem) -> Result<(), IgnoreReason> {
        if !self.is_idle() {
            return Err(IgnoreReason::Busy);
        }
        if !item.is_interactive() {
            return Err(IgnoreReason::NotInteractive);
        }
        Ok(())
    }

    /// Arm a drag on `item`.
    ///
    /// `companions` are the other items that move along with it (the rest of
    /// the selection). Nothing moves until the pointer travels past the drag
    /// threshold or the hold delay elapses.
    pub fn begin_drag<'a>(
        &mut self,
        item: &PositionableItem,
        companions: impl IntoIterator<Item = &'a PositionableItem>,
        pointer: Point,
        target: PointerTarget,
        now: Instant,
    ) -> PointerDownOutcome {
        if let Err(reason) = self.admit(item) {
            return PointerDownOutcome::Ignored(reason);
        }
        if !target.starts_gesture() {
            log::debug!("pointer-down on {} routed to {:?}", item.id, target);
            return PointerDownOutcome::Ignored(IgnoreReason::Routed(target));
        }

        let mut origins = vec![(item.id, item.position)];
        for other in companions {
            if other.id != item.id && other.is_interactive() && !origins.iter().any(|(id, _)| *id == other.id) {
                origins.push((other.id, other.position));
            }
        }

        self.hold.schedule(now, self.config.hold_delay);
        self.transition(GestureState::PendingDrag(DragSession {
            item_id: item.id,
            pointer_start: pointer,
            origins,
        }));
        PointerDownOutcome::Started
    }

    /// Start resizing `item` from `handle`.
    pub fn begin_resize(
        &mut self,
        item: &PositionableItem,
        handle: ResizeHandle,
        pointer: Point,
        constraints: ItemConstraints,
    ) -> PointerDownOutcome {
        if let Err(reason) = self.admit(item) {
            return PointerDownOutcome::Ignored(reason);
        }
        self.transition(GestureState::Resizing(ResizeSession {
            item_id: item.id,
            handle,
            pointer_start: pointer,
            start: item.position,
            constraints,
            start_ratio: item.position.aspect_ratio(),
        }));
        PointerDownOutcome::Started
    }

    /// Start rotating `item` around its center.
    pub fn begin_rotate(&mut self, item: &PositionableItem, pointer: Point) -> PointerDownOutcome {
        if let Err(reason) = self.admit(item) {
            return PointerDownOutcome::Ignored(reason);
        }
        let center = item.position.center();
        self.transition(GestureState::Rotating(RotateSession {
            item_id: item.id,
            start: item.position,
            center,
            start_angle: pointer_angle(center, pointer),
        }));
        PointerDownOutcome::Started
    }

    /// Fire the hold timer if it is due. Returns true if a drag just began.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.hold.fire_if_due(now) {
            return false;
        }
        self.promote_pending()
    }

    fn promote_pending(&mut self) -> bool {
        self.hold.cancel();
        let GestureState::PendingDrag(session) = &self.state else {
            return false;
        };
        let next = GestureState::Dragging(session.clone());
        self.transition(next);
        true
    }

    /// Advance the gesture with a new canvas-local pointer position.
    pub fn pointer_move(
        &mut self,
        pointer: Point,
        modifiers: Modifiers,
        now: Instant,
        ctx: &MoveContext<'_>,
    ) -> Option<Proposal> {
        self.tick(now);

        let within_threshold = match &self.state {
            GestureState::PendingDrag(session) => {
                Some(distance(session.pointer_start, pointer) <= self.config.drag_threshold)
            }
            _ => None,
        };
        match within_threshold {
            Some(true) => return None,
            Some(false) => {
                self.promote_pending();
            }
            None => {}
        }

        match &self.state {
            GestureState::Idle | GestureState::PendingDrag(_) => None,
            GestureState::Dragging(session) => Some(drag_frame(session, pointer, modifiers, ctx)),
            GestureState::Resizing(session) => {
                let keep_ratio = session.constraints.maintain_aspect_ratio || modifiers.constrains();
                let position = apply_resize(
                    &session.start,
                    session.handle,
                    pointer - session.pointer_start,
                    &session.constraints,
                    keep_ratio.then_some(session.start_ratio),
                    ctx.bounds,
                );
                Some(Proposal {
                    positions: vec![(session.item_id, position)],
                    guides: Vec::new(),
                })
            }
            GestureState::Rotating(session) => {
                let swept = pointer_angle(session.center, pointer) - session.start_angle;
                let raw = session.start.rotation + swept;
                let rotation = if modifiers.constrains() {
                    snap_angle(raw, self.config.rotation_snap_degrees)
                } else {
                    normalize_degrees(raw)
                };
                Some(Proposal {
                    positions: vec![(session.item_id, ItemPosition { rotation, ..session.start })],
                    guides: Vec::new(),
                })
            }
        }
    }

    /// Finish the current gesture.
    pub fn pointer_up(&mut self, now: Instant) -> PointerUpOutcome {
        self.tick(now);
        self.hold.cancel();
        let outcome = match &self.state {
            GestureState::Idle => return PointerUpOutcome::None,
            GestureState::PendingDrag(s) => PointerUpOutcome::Click(s.item_id),
            GestureState::Dragging(s) => PointerUpOutcome::Committed {
                item_id: s.item_id,
                kind: GestureKind::Drag,
            },
            GestureState::Resizing(s) => PointerUpOutcome::Committed {
                item_id: s.item_id,
                kind: GestureKind::Resize(s.handle),
            },
            GestureState::Rotating(s) => PointerUpOutcome::Committed {
                item_id: s.item_id,
                kind: GestureKind::Rotate,
            },
        };
        self.transition(GestureState::Idle);
        outcome
    }

    /// Abandon the current gesture. Returns the positions to restore.
    pub fn cancel(&mut self) -> Vec<(ItemId, ItemPosition)> {
        self.hold.cancel();
        let restore = match &self.state {
            GestureState::Idle => return Vec::new(),
            GestureState::PendingDrag(_) => Vec::new(),
            GestureState::Dragging(s) => s.origins.clone(),
            GestureState::Resizing(s) => vec![(s.item_id, s.start)],
            GestureState::Rotating(s) => vec![(s.item_id, s.start)],
        };
        self.transition(GestureState::Idle);
        restore
    }
}

fn drag_frame(session: &DragSession, pointer: Point, modifiers: Modifiers, ctx: &MoveContext<'_>) -> Proposal {
    let start = session.active_start();
    let raw = start.origin() + (pointer - session.pointer_start);
    let size = Size::new(start.width, start.height);
    let moving = session.moving_ids();

    let (adjusted, guides) = if modifiers.bypasses_snap() {
        (raw, Vec::new())
    } else {
        let set = if ctx.snap.enabled {
            let prospective = BoundingBox::new(raw.x, raw.y, start.width, start.height);
            detect_guides(&prospective, ctx.items, &moving, ctx.canvas, ctx.snap)
        } else {
            GuideSet::default()
        };
        if !set.is_empty() {
            log::debug!("guides for {}: {:?}", session.item_id, set);
        }
        let snapped = snap_position(raw, size, &set, ctx.snap, ctx.grid);
        (snapped.point, set.guides())
    };

    let mut offset: Vec2 = adjusted - start.origin();
    if let Some(bounds) = ctx.bounds {
        offset = clamp_group_offset(&session.origins, offset, bounds);
    }

    let positions = session
        .origins
        .iter()
        .map(|(id, origin)| {
            let mut position = *origin;
            position.set_origin(origin.origin() + offset);
            (*id, position)
        })
        .collect();

    Proposal { positions, guides }
}

/// Shrink `offset` so the union of all moving boxes stays inside `bounds`.
fn clamp_group_offset(origins: &[(ItemId, ItemPosition)], offset: Vec2, bounds: Rect) -> Vec2 {
    let Some(union) = origins
        .iter()
        .map(|(_, p)| p.rect())
        .reduce(|a, b| a.union(b))
    else {
        return offset;
    };
    let wanted = union.origin() + offset;
    let clamped = clamp_into(wanted, union.width(), union.height(), bounds);
    clamped - union.origin()
}
