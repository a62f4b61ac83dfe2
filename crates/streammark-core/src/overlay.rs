//! Overlay entities and their wire representations.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::{Position, Size};
use crate::remote::RemoteError;

/// Unique overlay identifier, assigned by the remote store on creation.
pub type OverlayId = Uuid;

/// Overlay content kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayKind {
    Text,
    Image,
}

/// A positioned, sized annotation rendered on top of the video surface.
///
/// For [`OverlayKind::Text`] the content is the display text; for
/// [`OverlayKind::Image`] it is a resource URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    pub id: OverlayId,
    #[serde(rename = "type")]
    pub kind: OverlayKind,
    pub content: String,
    pub position: Position,
    pub size: Size,
    /// Server-side creation timestamp (RFC 3339). Advisory only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Server-side last-update timestamp (RFC 3339). Advisory only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Overlay {
    /// Apply a partial update in place. Geometry is clamped against the
    /// overlay's (possibly updated) kind.
    pub fn apply(&mut self, patch: &OverlayPatch) {
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(ref content) = patch.content {
            self.content = content.clone();
        }
        if let Some(position) = patch.position {
            self.position = position.clamped();
        }
        if let Some(size) = patch.size {
            self.size = size.clamped(self.kind);
        }
    }
}

/// Payload for creating a new overlay. No id yet: the remote store assigns
/// one, and the overlay is not addressable until it does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayDraft {
    #[serde(rename = "type")]
    pub kind: OverlayKind,
    pub content: String,
    pub position: Position,
    pub size: Size,
}

impl OverlayDraft {
    /// Create a draft with the default placement (50,50) and size 200x50.
    pub fn new(kind: OverlayKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
            position: Position::new(50, 50),
            size: Size::new(200, 50),
        }
    }

    /// Reject drafts whose content is empty after trimming. Runs before any
    /// remote call is issued.
    pub fn validate(&self) -> Result<(), RemoteError> {
        if self.content.trim().is_empty() {
            return Err(RemoteError::Validation(
                "overlay content must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Clamp the draft's geometry to the valid range.
    pub fn clamped(mut self) -> Self {
        self.position = self.position.clamped();
        self.size = self.size.clamped(self.kind);
        self
    }
}

/// Partial update for an existing overlay. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverlayPatch {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<OverlayKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
}

impl OverlayPatch {
    /// A patch carrying only a new position.
    pub fn position(position: Position) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    /// A patch carrying only a new size.
    pub fn size(size: Size) -> Self {
        Self {
            size: Some(size),
            ..Self::default()
        }
    }

    /// A patch carrying only new content.
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    /// Overwrite this patch's fields with the ones set in `newer`. Used to
    /// coalesce successive updates for the same overlay into a single
    /// request.
    pub fn merge(&mut self, newer: &OverlayPatch) {
        if newer.kind.is_some() {
            self.kind = newer.kind;
        }
        if newer.content.is_some() {
            self.content = newer.content.clone();
        }
        if newer.position.is_some() {
            self.position = newer.position;
        }
        if newer.size.is_some() {
            self.size = newer.size;
        }
    }

    /// True if no field is set.
    pub fn is_empty(&self) -> bool {
        self.kind.is_none()
            && self.content.is_none()
            && self.position.is_none()
            && self.size.is_none()
    }
}
