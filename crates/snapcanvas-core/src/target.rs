//! Classification of what a pointer event landed on.
//!
//! The host reports the chain of elements under the pointer, innermost
//! first. It is classified once per pointer-down and the result travels
//! with the gesture, so no call site has to walk ancestors again.

use crate::item::ItemId;
use serde::{Deserialize, Serialize};

/// Role of one element in the hit chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "role", content = "id", rename_all = "kebab-case")]
pub enum HitRole {
    /// Passive content (text glyphs, image pixels, padding).
    Content,
    /// A live inline editor such as a focused text field.
    TextEditor,
    /// A drag handle owned by a child element.
    DragHandle,
    /// A button or other toolbar control.
    Control,
    /// The draggable wrapper of an item.
    Item(ItemId),
}

/// Elements under the pointer, innermost first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitPath(pub Vec<HitRole>);

impl HitPath {
    /// A hit directly on an item's wrapper.
    pub fn item(id: ItemId) -> Self {
        Self(vec![HitRole::Item(id)])
    }

    /// A hit on passive content inside an item.
    pub fn content(id: ItemId) -> Self {
        Self(vec![HitRole::Content, HitRole::Item(id)])
    }

    /// Build from innermost-first roles.
    pub fn from_roles(roles: impl IntoIterator<Item = HitRole>) -> Self {
        Self(roles.into_iter().collect())
    }

    /// Every item wrapper in the chain, innermost first.
    pub fn item_ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.0.iter().filter_map(|role| match role {
            HitRole::Item(id) => Some(*id),
            _ => None,
        })
    }

    /// The innermost item wrapper in the chain.
    pub fn innermost_item(&self) -> Option<ItemId> {
        self.item_ids().next()
    }
}

/// What a pointer-down on an item actually targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PointerTarget {
    /// Plain item surface; the item's own gesture applies.
    Plain,
    /// An inline editor; pointer input belongs to the editor.
    Editable,
    /// A more specific draggable inside the item owns the gesture.
    NestedDraggable,
    /// A control that must always receive its clicks.
    ExternalControl,
}

impl PointerTarget {
    /// Whether the item controller may start a gesture on this target.
    pub fn starts_gesture(self) -> bool {
        matches!(self, PointerTarget::Plain)
    }
}

/// Classify a hit chain relative to `item`.
///
/// Only the elements between the pointer and the item's wrapper matter.
/// The first significant element wins: a control inside an editor is still a
/// control, and another item wrapper on the way makes `item` an outer
/// draggable.
pub fn classify_target(path: &HitPath, item: ItemId) -> PointerTarget {
    for role in &path.0 {
        match role {
            HitRole::Item(id) if *id == item => return PointerTarget::Plain,
            HitRole::Item(_) | HitRole::DragHandle => return PointerTarget::NestedDraggable,
            HitRole::Control => return PointerTarget::ExternalControl,
            HitRole::TextEditor => return PointerTarget::Editable,
            HitRole::Content => {}
        }
    }
    PointerTarget::Plain
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_plain_targets() {
        let id = Uuid::new_v4();
        assert_eq!(classify_target(&HitPath::item(id), id), PointerTarget::Plain);
        assert_eq!(classify_target(&HitPath::content(id), id), PointerTarget::Plain);
        assert!(PointerTarget::Plain.starts_gesture());
    }

    #[test]
    fn test_editor_and_control() {
        let id = Uuid::new_v4();
        let path = HitPath::from_roles([HitRole::Content, HitRole::TextEditor, HitRole::Item(id)]);
        assert_eq!(classify_target(&path, id), PointerTarget::Editable);

        let path = HitPath::from_roles([HitRole::Control, HitRole::Item(id)]);
        assert_eq!(classify_target(&path, id), PointerTarget::ExternalControl);
        assert!(!PointerTarget::ExternalControl.starts_gesture());
    }

    #[test]
    fn test_nested_draggable() {
        let outer = Uuid::new_v4();
        let inner = Uuid::new_v4();
        let path = HitPath::from_roles([HitRole::Content, HitRole::Item(inner), HitRole::Item(outer)]);
        assert_eq!(classify_target(&path, outer), PointerTarget::NestedDraggable);
        assert_eq!(classify_target(&path, inner), PointerTarget::Plain);
        assert_eq!(path.innermost_item(), Some(inner));
        assert_eq!(path.item_ids().collect::<Vec<_>>(), vec![inner, outer]);

        let path = HitPath::from_roles([HitRole::DragHandle, HitRole::Item(outer)]);
        assert_eq!(classify_target(&path, outer), PointerTarget::NestedDraggable);
    }

    #[test]
    fn test_roles_outside_item_are_ignored() {
        let id = Uuid::new_v4();
        // A toolbar that wraps the item doesn't affect the item's own surface.
        let path = HitPath::from_roles([HitRole::Item(id), HitRole::Control]);
        assert_eq!(classify_target(&path, id), PointerTarget::Plain);
    }
}
