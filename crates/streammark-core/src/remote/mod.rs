//! Persistence collaborator contract.

mod memory;

pub use memory::MemoryRemote;

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::overlay::{Overlay, OverlayDraft, OverlayId, OverlayPatch};

/// Errors surfaced by the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// Rejected before (or by) the remote store; the operation was never
    /// applied anywhere.
    #[error("validation failed: {0}")]
    Validation(String),
    /// The remote store no longer has the referenced overlay.
    #[error("overlay not found: {0}")]
    NotFound(OverlayId),
    /// The remote call itself failed or timed out.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Result type for remote operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Boxed future for async operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Stream source configuration.
///
/// The core reads and writes the address without interpreting it; playback
/// is an external collaborator's concern. Wire field names follow the
/// dashboard API (`rtsp_url` / `stream_active`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamSettings {
    #[serde(rename = "rtsp_url")]
    pub stream_address: String,
    #[serde(rename = "stream_active")]
    pub is_active: bool,
}

/// Remote persistence contract for overlays and stream settings.
///
/// Implementations may live in memory (tests), over HTTP, or anywhere else;
/// the core only relies on this surface.
pub trait RemoteStore: Send + Sync {
    /// List all overlays. Used once at startup to seed the store.
    fn list_overlays(&self) -> BoxFuture<'_, RemoteResult<Vec<Overlay>>>;

    /// Create an overlay; the remote store assigns the id.
    fn create_overlay(&self, draft: OverlayDraft) -> BoxFuture<'_, RemoteResult<Overlay>>;

    /// Apply a partial update, returning the canonical post-update entity.
    fn update_overlay(
        &self,
        id: OverlayId,
        patch: OverlayPatch,
    ) -> BoxFuture<'_, RemoteResult<Overlay>>;

    /// Delete an overlay.
    fn delete_overlay(&self, id: OverlayId) -> BoxFuture<'_, RemoteResult<()>>;

    /// Fetch the stream settings.
    fn get_settings(&self) -> BoxFuture<'_, RemoteResult<StreamSettings>>;

    /// Store the stream settings.
    fn put_settings(&self, settings: StreamSettings) -> BoxFuture<'_, RemoteResult<()>>;
}
