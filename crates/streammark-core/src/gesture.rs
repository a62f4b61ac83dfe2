//! Pointer gesture tracking for overlay drag and resize.

use kurbo::{Point, Vec2};

use crate::geometry::{Position, Size};
use crate::overlay::{OverlayId, OverlayKind};

/// Which part of an overlay a pointer-down landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitRegion {
    /// The overlay body: eligible to start a drag.
    Body,
    /// The resize handle at the bottom-right corner: eligible to start a
    /// resize.
    ResizeHandle,
}

/// A pointer event in video-surface client coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down {
        /// The overlay (and region) under the pointer, if any.
        target: Option<(OverlayId, HitRegion)>,
        position: Point,
    },
    Move {
        position: Point,
    },
    Up {
        position: Point,
    },
}

impl PointerEvent {
    /// The pointer position carried by the event.
    pub fn position(&self) -> Point {
        match *self {
            PointerEvent::Down { position, .. }
            | PointerEvent::Move { position }
            | PointerEvent::Up { position } => position,
        }
    }
}

/// Kind of gesture in progress. Drag and resize are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    Drag,
    Resize,
}

/// Transient state of an in-progress drag or resize.
///
/// Lives only between gesture start and gesture end; never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureSession {
    /// The overlay being manipulated.
    pub id: OverlayId,
    pub kind: GestureKind,
    /// Pointer position at gesture start.
    pub start_pointer: Point,
    /// Overlay position snapshot at gesture start.
    pub start_position: Position,
    /// Overlay size snapshot at gesture start.
    pub start_size: Size,
}

impl GestureSession {
    /// Pointer movement since gesture start.
    pub fn delta(&self, pointer: Point) -> Vec2 {
        Vec2::new(
            pointer.x - self.start_pointer.x,
            pointer.y - self.start_pointer.y,
        )
    }

    /// Position produced by dragging to the given pointer location.
    pub fn drag_position(&self, pointer: Point) -> Position {
        self.start_position.translated(self.delta(pointer))
    }

    /// Size produced by resizing to the given pointer location.
    pub fn resize_size(&self, kind: OverlayKind, pointer: Point) -> Size {
        self.start_size.resized(kind, self.delta(pointer))
    }
}

/// Single-slot gesture tracker.
///
/// At most one overlay may have an active gesture of either kind
/// system-wide. Starting a gesture while one is active is ignored; ending an
/// already-idle tracker is a no-op.
#[derive(Debug, Clone, Copy, Default)]
pub struct GestureTracker {
    session: Option<GestureSession>,
}

impl GestureTracker {
    /// Create an idle tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a drag, snapshotting the pointer and the overlay's geometry.
    pub fn start_drag(&mut self, id: OverlayId, pointer: Point, position: Position, size: Size) {
        self.start(GestureKind::Drag, id, pointer, position, size);
    }

    /// Begin a resize, snapshotting the pointer and the overlay's geometry.
    pub fn start_resize(&mut self, id: OverlayId, pointer: Point, position: Position, size: Size) {
        self.start(GestureKind::Resize, id, pointer, position, size);
    }

    fn start(
        &mut self,
        kind: GestureKind,
        id: OverlayId,
        pointer: Point,
        position: Position,
        size: Size,
    ) {
        if self.session.is_some() {
            // Single global active-gesture slot.
            return;
        }
        self.session = Some(GestureSession {
            id,
            kind,
            start_pointer: pointer,
            start_position: position,
            start_size: size,
        });
    }

    /// End the active gesture. Idempotent: ending an idle tracker does
    /// nothing. Forced termination (pointer-capture loss, blur) goes through
    /// the same path.
    pub fn end(&mut self) {
        self.session = None;
    }

    /// The active session, if any.
    pub fn session(&self) -> Option<&GestureSession> {
        self.session.as_ref()
    }

    /// Whether any gesture is in progress.
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Whether the active gesture targets the given overlay.
    pub fn targets(&self, id: OverlayId) -> bool {
        self.session.map(|s| s.id == id).unwrap_or(false)
    }
}
