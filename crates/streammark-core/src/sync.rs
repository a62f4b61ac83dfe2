//! Synchronization policy between the local store and the remote
//! collaborator.
//!
//! During a gesture, every intermediate geometry value is applied locally,
//! but only the latest value needs to reach the remote store. Overlapping
//! update requests for the same overlay may complete out of order; each
//! outbound update therefore carries a per-overlay sequence number, and a
//! response is applied only if its sequence number is the latest issued for
//! that overlay.

use std::collections::HashMap;

use crate::overlay::{Overlay, OverlayDraft, OverlayId, OverlayPatch};
use crate::remote::{RemoteResult, RemoteStore};

/// Per-overlay monotonically increasing sequence numbers.
#[derive(Debug, Clone, Default)]
pub struct SequenceTracker {
    issued: HashMap<OverlayId, u64>,
}

impl SequenceTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next sequence number for an overlay.
    pub fn next(&mut self, id: OverlayId) -> u64 {
        let counter = self.issued.entry(id).or_insert(0);
        *counter += 1;
        *counter
    }

    /// The latest sequence number issued for an overlay, if any.
    pub fn latest(&self, id: OverlayId) -> Option<u64> {
        self.issued.get(&id).copied()
    }

    /// Whether a response tagged with `seq` is the latest issued for the
    /// overlay. Stale responses must be discarded, not applied.
    pub fn is_current(&self, id: OverlayId, seq: u64) -> bool {
        self.latest(id) == Some(seq)
    }

    /// Drop tracking for a deleted overlay.
    pub fn forget(&mut self, id: OverlayId) {
        self.issued.remove(&id);
    }
}

/// Outbound request to the persistence collaborator.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteRequest {
    Create {
        draft: OverlayDraft,
    },
    Update {
        id: OverlayId,
        /// Sequence tag echoed back in the matching [`RemoteResponse`].
        seq: u64,
        patch: OverlayPatch,
    },
    Delete {
        id: OverlayId,
    },
}

/// Completion of a previously issued [`RemoteRequest`].
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteResponse {
    Created(RemoteResult<Overlay>),
    Updated {
        id: OverlayId,
        seq: u64,
        result: RemoteResult<Overlay>,
    },
    Deleted {
        id: OverlayId,
        result: RemoteResult<()>,
    },
}

/// Perform a request against a remote store, pairing the completion with the
/// tags [`crate::editor::Editor::apply_response`] needs.
///
/// Requests for different overlays (or overlapping updates for the same one)
/// may be performed concurrently; the sequence tags keep reordering safe.
pub async fn perform(remote: &dyn RemoteStore, request: RemoteRequest) -> RemoteResponse {
    match request {
        RemoteRequest::Create { draft } => RemoteResponse::Created(remote.create_overlay(draft).await),
        RemoteRequest::Update { id, seq, patch } => RemoteResponse::Updated {
            id,
            seq,
            result: remote.update_overlay(id, patch).await,
        },
        RemoteRequest::Delete { id } => RemoteResponse::Deleted {
            id,
            result: remote.delete_overlay(id).await,
        },
    }
}
