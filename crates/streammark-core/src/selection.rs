//! Single-selection state for overlay manipulation.

use crate::overlay::OverlayId;

/// At most one overlay is selected at a time.
///
/// The selection is a bare identifier, not a live reference: it may
/// transiently name an overlay that is no longer in the store (a delete
/// racing a stale event handler). Rendering simply shows no selected overlay
/// until the id resolves or is cleared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    current: Option<OverlayId>,
}

impl Selection {
    /// Create an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Select an overlay, replacing any prior selection.
    pub fn select(&mut self, id: OverlayId) {
        self.current = Some(id);
    }

    /// Clear the selection.
    pub fn clear(&mut self) {
        self.current = None;
    }

    /// The selected overlay id, if any.
    pub fn selected(&self) -> Option<OverlayId> {
        self.current
    }

    /// Whether the given overlay is selected.
    pub fn is_selected(&self, id: OverlayId) -> bool {
        self.current == Some(id)
    }
}
