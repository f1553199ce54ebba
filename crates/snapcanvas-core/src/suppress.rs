//! Swallows the click that a browser-style host fires right after a drag ends.

use crate::input::Instant;
use crate::item::ItemId;
use crate::target::PointerTarget;
use std::collections::HashMap;
use std::time::Duration;

/// Where a click landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    /// Somewhere inside an item.
    Item(ItemId, PointerTarget),
    /// Empty canvas area.
    Canvas,
}

/// Global suppress-until deadline plus per-item transient flags.
#[derive(Debug, Clone, Default)]
pub struct ClickSuppressionGuard {
    suppress_until: Option<Instant>,
    items: HashMap<ItemId, Instant>,
}

impl ClickSuppressionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start suppressing clicks after `item` finished a drag.
    pub fn engage(&mut self, item: ItemId, now: Instant, window: Duration) {
        let until = now + window;
        self.suppress_until = Some(self.suppress_until.map_or(until, |current| current.max(until)));
        self.items.insert(item, until);
        log::debug!("click suppression engaged for {} ({:?})", item, window);
    }

    /// Drop flags whose window has passed.
    pub fn expire(&mut self, now: Instant) {
        self.items.retain(|_, until| now < *until);
        if self.suppress_until.is_some_and(|until| now >= until) {
            self.suppress_until = None;
        }
    }

    /// Whether any suppression window is still open.
    pub fn is_active(&self, now: Instant) -> bool {
        self.suppress_until.is_some_and(|until| now < until)
    }

    /// Whether `item` was just dragged and its window is still open.
    pub fn is_flagged(&self, item: ItemId, now: Instant) -> bool {
        self.items.get(&item).is_some_and(|until| now < *until)
    }

    /// Decide whether a click must be stopped before content handlers see it.
    ///
    /// Controls always pass. Inside the global window, clicks on a flagged
    /// item and clicks on the bare canvas are swallowed; the latter covers a
    /// release that landed just outside the item after snapping moved it.
    pub fn should_suppress(&mut self, target: ClickTarget, now: Instant) -> bool {
        self.expire(now);
        if !self.is_active(now) {
            return false;
        }
        match target {
            ClickTarget::Item(_, PointerTarget::ExternalControl) => false,
            ClickTarget::Item(id, _) => self.is_flagged(id, now),
            ClickTarget::Canvas => true,
        }
    }
}
