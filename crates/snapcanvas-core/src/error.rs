//! Engine error type.

use crate::item::ItemId;
use thiserror::Error;

/// Errors reported by non-interactive canvas operations.
///
/// Pointer routing never fails: ignored gestures are reported through the
/// outcome enums in [`crate::controller`].
#[derive(Debug, Error)]
pub enum CanvasError {
    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),
    #[error("Item already exists: {0}")]
    DuplicateItem(ItemId),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for canvas operations.
pub type CanvasResult<T> = Result<T, CanvasError>;
