//! Authoritative-on-client overlay collection.

use crate::overlay::{Overlay, OverlayId, OverlayPatch};

/// Ordered collection of overlays.
///
/// Insertion order is display order in the list view and is never resorted
/// by geometry or recency. The store only mutates local state; remote
/// traffic is mediated by [`crate::editor::Editor`].
#[derive(Debug, Clone, Default)]
pub struct OverlayStore {
    overlays: Vec<Overlay>,
}

impl OverlayStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the collection with the remote store's listing. Used once at
    /// startup.
    pub fn seed(&mut self, overlays: Vec<Overlay>) {
        self.overlays = overlays;
    }

    /// Append a remote-confirmed overlay. Returns false (and changes
    /// nothing) if an overlay with the same id is already present.
    pub fn insert_confirmed(&mut self, overlay: Overlay) -> bool {
        if self.contains(overlay.id) {
            log::warn!("duplicate overlay id {} from remote, ignoring", overlay.id);
            return false;
        }
        self.overlays.push(overlay);
        true
    }

    /// Apply a partial update locally, clamping geometry. Returns false if
    /// the id is not in the collection (silent no-op for updates racing a
    /// delete).
    pub fn apply_patch(&mut self, id: OverlayId, patch: &OverlayPatch) -> bool {
        match self.get_mut(id) {
            Some(overlay) => {
                overlay.apply(patch);
                true
            }
            None => false,
        }
    }

    /// Replace an overlay with the server's canonical representation,
    /// keeping its slot in the display order.
    pub fn reconcile(&mut self, id: OverlayId, canonical: Overlay) -> bool {
        match self.overlays.iter_mut().find(|o| o.id == id) {
            Some(slot) => {
                *slot = canonical;
                true
            }
            None => false,
        }
    }

    /// Remove an overlay, returning it if it was present.
    pub fn remove(&mut self, id: OverlayId) -> Option<Overlay> {
        let index = self.overlays.iter().position(|o| o.id == id)?;
        Some(self.overlays.remove(index))
    }

    /// Look up an overlay by id.
    pub fn get(&self, id: OverlayId) -> Option<&Overlay> {
        self.overlays.iter().find(|o| o.id == id)
    }

    fn get_mut(&mut self, id: OverlayId) -> Option<&mut Overlay> {
        self.overlays.iter_mut().find(|o| o.id == id)
    }

    /// Whether the collection holds the given id.
    pub fn contains(&self, id: OverlayId) -> bool {
        self.overlays.iter().any(|o| o.id == id)
    }

    /// Read-only ordered snapshot for list rendering.
    pub fn overlays(&self) -> &[Overlay] {
        &self.overlays
    }

    /// Number of overlays.
    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Position, Size};
    use crate::overlay::OverlayKind;
    use uuid::Uuid;

    fn overlay(content: &str) -> Overlay {
        Overlay {
            id: Uuid::new_v4(),
            kind: OverlayKind::Text,
            content: content.to_string(),
            position: Position::new(50, 50),
            size: Size::new(200, 50),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_insertion_order_is_preserved() {
        let mut store = OverlayStore::new();
        store.insert_confirmed(overlay("first"));
        store.insert_confirmed(overlay("second"));
        store.insert_confirmed(overlay("third"));

        let contents: Vec<_> = store.overlays().iter().map(|o| o.content.as_str()).collect();
        assert_eq!(contents, ["first", "second", "third"]);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut store = OverlayStore::new();
        let entity = overlay("one");
        assert!(store.insert_confirmed(entity.clone()));
        assert!(!store.insert_confirmed(entity));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_patch_missing_id_is_noop() {
        let mut store = OverlayStore::new();
        store.insert_confirmed(overlay("one"));

        let applied = store.apply_patch(Uuid::new_v4(), &OverlayPatch::content("ghost"));
        assert!(!applied);
        assert_eq!(store.overlays()[0].content, "one");
    }

    #[test]
    fn test_reconcile_keeps_slot() {
        let mut store = OverlayStore::new();
        let first = overlay("first");
        let second = overlay("second");
        let first_id = first.id;
        store.insert_confirmed(first.clone());
        store.insert_confirmed(second);

        let mut canonical = first;
        canonical.content = "first (canonical)".to_string();
        assert!(store.reconcile(first_id, canonical));

        assert_eq!(store.overlays()[0].content, "first (canonical)");
    }

    #[test]
    fn test_remove() {
        let mut store = OverlayStore::new();
        let entity = overlay("one");
        let id = entity.id;
        store.insert_confirmed(entity);

        assert!(store.remove(id).is_some());
        assert!(store.remove(id).is_none());
        assert!(store.is_empty());
    }
}
