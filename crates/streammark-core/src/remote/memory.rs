//! In-memory remote store for testing and ephemeral use.

use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use uuid::Uuid;

use super::{BoxFuture, RemoteError, RemoteResult, RemoteStore, StreamSettings};
use crate::overlay::{Overlay, OverlayDraft, OverlayId, OverlayPatch};

/// In-memory implementation of [`RemoteStore`].
///
/// Behaves like the real backend (assigns ids, merges patches, returns
/// canonical entities) and can be switched into a failing mode to exercise
/// transport-error paths.
#[derive(Default)]
pub struct MemoryRemote {
    overlays: RwLock<Vec<Overlay>>,
    settings: RwLock<StreamSettings>,
    failing: AtomicBool,
}

impl MemoryRemote {
    /// Create an empty remote store.
    pub fn new() -> Self {
        Self::default()
    }

    /// When set, every subsequent call fails with a transport error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check_transport(&self) -> RemoteResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(RemoteError::Transport("injected failure".to_string()))
        } else {
            Ok(())
        }
    }

    fn lock_err(msg: impl std::fmt::Display) -> RemoteError {
        RemoteError::Transport(format!("lock error: {msg}"))
    }
}

impl RemoteStore for MemoryRemote {
    fn list_overlays(&self) -> BoxFuture<'_, RemoteResult<Vec<Overlay>>> {
        Box::pin(async move {
            self.check_transport()?;
            let overlays = self.overlays.read().map_err(Self::lock_err)?;
            Ok(overlays.clone())
        })
    }

    fn create_overlay(&self, draft: OverlayDraft) -> BoxFuture<'_, RemoteResult<Overlay>> {
        Box::pin(async move {
            self.check_transport()?;
            draft.validate()?;
            let overlay = Overlay {
                id: Uuid::new_v4(),
                kind: draft.kind,
                content: draft.content,
                position: draft.position,
                size: draft.size,
                created_at: None,
                updated_at: None,
            };
            let mut overlays = self.overlays.write().map_err(Self::lock_err)?;
            overlays.push(overlay.clone());
            Ok(overlay)
        })
    }

    fn update_overlay(
        &self,
        id: OverlayId,
        patch: OverlayPatch,
    ) -> BoxFuture<'_, RemoteResult<Overlay>> {
        Box::pin(async move {
            self.check_transport()?;
            let mut overlays = self.overlays.write().map_err(Self::lock_err)?;
            let overlay = overlays
                .iter_mut()
                .find(|o| o.id == id)
                .ok_or(RemoteError::NotFound(id))?;
            overlay.apply(&patch);
            Ok(overlay.clone())
        })
    }

    fn delete_overlay(&self, id: OverlayId) -> BoxFuture<'_, RemoteResult<()>> {
        Box::pin(async move {
            self.check_transport()?;
            let mut overlays = self.overlays.write().map_err(Self::lock_err)?;
            let index = overlays
                .iter()
                .position(|o| o.id == id)
                .ok_or(RemoteError::NotFound(id))?;
            overlays.remove(index);
            Ok(())
        })
    }

    fn get_settings(&self) -> BoxFuture<'_, RemoteResult<StreamSettings>> {
        Box::pin(async move {
            self.check_transport()?;
            let settings = self.settings.read().map_err(Self::lock_err)?;
            Ok(settings.clone())
        })
    }

    fn put_settings(&self, settings: StreamSettings) -> BoxFuture<'_, RemoteResult<()>> {
        Box::pin(async move {
            self.check_transport()?;
            let mut slot = self.settings.write().map_err(Self::lock_err)?;
            *slot = settings;
            Ok(())
        })
    }
}
