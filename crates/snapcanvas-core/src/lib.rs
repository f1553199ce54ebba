//! SnapCanvas Core
//!
//! Positioning engine for design canvases: pointer gestures, magnetic
//! alignment guides, grid snapping, multi-select layout and undo history.
//! Rendering and persistence stay with the host.

pub mod canvas;
pub mod config;
pub mod controller;
pub mod error;
pub mod geometry;
pub mod guides;
pub mod handles;
pub mod history;
pub mod input;
pub mod item;
pub mod selection;
pub mod snap;
pub mod suppress;
pub mod target;
pub mod timer;

pub use canvas::{CanvasEvent, ClickDisposition, PositioningCanvas};
pub use config::{CanvasConfig, EditorMode, EngineConfig, GestureConfig, Padding, SnapConfig};
pub use controller::{GestureController, GestureKind, GestureState, IgnoreReason, PointerDownOutcome, PointerUpOutcome};
pub use error::{CanvasError, CanvasResult};
pub use geometry::{BoundingBox, Viewport, bounding_box, to_canvas_local};
pub use guides::{AlignmentGuide, GuideAxis, GuideSet, detect_guides};
pub use handles::{Corner, Edge, ResizeHandle};
pub use history::{History, HistoryAction, HistoryEntry};
pub use input::{Instant, Modifiers};
pub use item::{ItemConstraints, ItemId, ItemKind, ItemPosition, PositionableItem};
pub use selection::{AlignEdge, DistributeAxis, Selection};
pub use snap::{SnapResult, resolve_magnetic_snap, snap_position, snap_to_grid};
pub use suppress::{ClickSuppressionGuard, ClickTarget};
pub use target::{HitPath, HitRole, PointerTarget, classify_target};
