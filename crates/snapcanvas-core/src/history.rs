//! Undo/redo over item-array snapshots.

use crate::item::PositionableItem;
use serde::{Deserialize, Serialize};

/// What produced a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HistoryAction {
    Initial,
    Drag,
    Resize,
    Rotate,
    Add,
    Delete,
    Duplicate,
    Align,
    Distribute,
    Nudge,
    Reorder,
    Replace,
    Edit,
    /// Geometry grown to meet new minimums.
    Repair,
}

/// An immutable snapshot of every item.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub action: HistoryAction,
    pub items: Vec<PositionableItem>,
}

/// A cursor over a bounded list of snapshots.
///
/// The entry under the cursor is the current state. Undo and redo move the
/// cursor; pushing after an undo discards everything past the cursor.
#[derive(Debug, Clone)]
pub struct History<T> {
    entries: Vec<T>,
    cursor: usize,
    limit: usize,
}

impl<T: Clone> History<T> {
    /// Start a history whose first (current) entry is `initial`.
    pub fn new(initial: T, limit: usize) -> Self {
        Self {
            entries: vec![initial],
            cursor: 0,
            limit: limit.max(1),
        }
    }

    /// Record a new current state.
    pub fn push(&mut self, snapshot: T) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(snapshot);

        // Limit history size
        if self.entries.len() > self.limit {
            let overflow = self.entries.len() - self.limit;
            self.entries.drain(..overflow);
        }
        self.cursor = self.entries.len() - 1;
    }

    /// Step back. Returns the new current state, or `None` at the oldest entry.
    pub fn undo(&mut self) -> Option<&T> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor)
    }

    /// Step forward. Returns the new current state, or `None` at the newest entry.
    pub fn redo(&mut self) -> Option<&T> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// The state under the cursor.
    pub fn current(&self) -> &T {
        &self.entries[self.cursor]
    }
}
