//! StreamMark Core Library
//!
//! Platform-agnostic engine for draggable/resizable text and image overlays
//! rendered on top of a live video surface: pointer gesture tracking, single
//! selection, an optimistic overlay store, and reconciliation of local state
//! against a remote persistence collaborator.

pub mod editor;
pub mod geometry;
pub mod gesture;
pub mod overlay;
pub mod remote;
pub mod selection;
pub mod store;
pub mod sync;

pub use editor::Editor;
pub use geometry::{MIN_HEIGHT, MIN_WIDTH, Position, Size};
pub use gesture::{GestureKind, GestureSession, GestureTracker, HitRegion, PointerEvent};
pub use overlay::{Overlay, OverlayDraft, OverlayId, OverlayKind, OverlayPatch};
pub use remote::{BoxFuture, MemoryRemote, RemoteError, RemoteResult, RemoteStore, StreamSettings};
pub use selection::Selection;
pub use store::OverlayStore;
pub use sync::{RemoteRequest, RemoteResponse, SequenceTracker, perform};
