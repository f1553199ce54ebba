//! Pointer modifiers and the time source.

use serde::{Deserialize, Serialize};

// Use web_time for WASM compatibility
#[cfg(target_arch = "wasm32")]
pub use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
pub use std::time::Instant;

/// Modifier keys held during a pointer event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// No modifiers held.
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    /// Only shift held.
    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }

    /// Only alt held.
    pub fn alt() -> Self {
        Self {
            alt: true,
            ..Self::NONE
        }
    }

    /// Shift snaps rotation and locks the aspect ratio while resizing.
    pub fn constrains(&self) -> bool {
        self.shift
    }

    /// Alt temporarily disables snapping while dragging.
    pub fn bypasses_snap(&self) -> bool {
        self.alt
    }

    /// Ctrl/Cmd or shift extend the selection instead of replacing it.
    pub fn extends_selection(&self) -> bool {
        self.shift || self.ctrl || self.meta
    }
}
