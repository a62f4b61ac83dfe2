//! Pure geometry for overlay placement and sizing.

use kurbo::Vec2;
use serde::{Deserialize, Serialize};

use crate::overlay::OverlayKind;

/// Minimum overlay width in pixels.
pub const MIN_WIDTH: i32 = 50;
/// Minimum overlay height in pixels. Applies to image overlays only; text
/// height is determined by the rendered content.
pub const MIN_HEIGHT: i32 = 50;

/// Overlay position in pixels, relative to the top-left corner of the video
/// surface container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Create a new position.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Clamp both coordinates to `>= 0`.
    ///
    /// There is no upper bound: an overlay may extend past the visible frame.
    pub fn clamped(self) -> Self {
        Self {
            x: self.x.max(0),
            y: self.y.max(0),
        }
    }

    /// Translate by a pointer delta (rounded to whole pixels), then clamp.
    pub fn translated(self, delta: Vec2) -> Self {
        Self {
            x: self.x + delta.x.round() as i32,
            y: self.y + delta.y.round() as i32,
        }
        .clamped()
    }
}

/// Overlay size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    /// Create a new size.
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Enforce the minimum dimensions for the given overlay kind.
    ///
    /// Width is floored at [`MIN_WIDTH`] for every kind. Height is floored at
    /// [`MIN_HEIGHT`] for images only; text height passes through unchanged
    /// since the rendered height is content-driven and the stored value is
    /// advisory.
    pub fn clamped(self, kind: OverlayKind) -> Self {
        let height = match kind {
            OverlayKind::Image => self.height.max(MIN_HEIGHT),
            OverlayKind::Text => self.height,
        };
        Self {
            width: self.width.max(MIN_WIDTH),
            height,
        }
    }

    /// Grow or shrink by a pointer delta (rounded to whole pixels), then
    /// clamp. Text overlays keep their stored height: only the horizontal
    /// component of the delta applies.
    pub fn resized(self, kind: OverlayKind, delta: Vec2) -> Self {
        let height = match kind {
            OverlayKind::Image => self.height + delta.y.round() as i32,
            OverlayKind::Text => self.height,
        };
        Self {
            width: self.width + delta.x.round() as i32,
            height,
        }
        .clamped(kind)
    }
}
