//! The owned state container for the overlay UI.
//!
//! [`Editor`] is the single writer for the overlay collection (via the
//! store), the selection, and the active gesture. Views read snapshots and
//! feed events back in; they never mutate state directly. Remote traffic is
//! queued as [`RemoteRequest`]s, drained by the embedding application with
//! [`Editor::take_requests`], and completed with [`Editor::apply_response`]
//! in whatever order the network delivers them.
//!
//! Local optimistic changes are applied synchronously, so rendering is
//! always up to date with the pointer regardless of network state.

use kurbo::Point;

use crate::gesture::{GestureKind, GestureSession, GestureTracker, HitRegion, PointerEvent};
use crate::overlay::{Overlay, OverlayDraft, OverlayId, OverlayPatch};
use crate::remote::RemoteError;
use crate::selection::Selection;
use crate::store::OverlayStore;
use crate::sync::{RemoteRequest, RemoteResponse, SequenceTracker};

/// Interactive overlay manipulation and synchronization engine.
#[derive(Debug, Default)]
pub struct Editor {
    store: OverlayStore,
    selection: Selection,
    gesture: GestureTracker,
    sequences: SequenceTracker,
    /// Outbound requests awaiting dispatch. Updates for the same overlay are
    /// coalesced while queued.
    outbox: Vec<RemoteRequest>,
}

impl Editor {
    /// Create an empty editor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the collection from the remote store's listing. Used once at
    /// startup.
    pub fn seed(&mut self, overlays: Vec<Overlay>) {
        self.store.seed(overlays);
    }

    // --- read-only snapshots for views ---

    /// Ordered snapshot for list rendering.
    pub fn overlays(&self) -> &[Overlay] {
        self.store.overlays()
    }

    /// Look up a single overlay.
    pub fn overlay(&self, id: OverlayId) -> Option<&Overlay> {
        self.store.get(id)
    }

    /// The selected overlay id, if any.
    pub fn selected(&self) -> Option<OverlayId> {
        self.selection.selected()
    }

    /// Whether the given overlay is selected.
    pub fn is_selected(&self, id: OverlayId) -> bool {
        self.selection.is_selected(id)
    }

    /// The gesture in progress, if any.
    pub fn active_gesture(&self) -> Option<&GestureSession> {
        self.gesture.session()
    }

    // --- selection ---

    /// Select an overlay, replacing any prior selection. The id need not be
    /// present in the collection.
    pub fn select(&mut self, id: OverlayId) {
        self.selection.select(id);
    }

    /// Clear the selection.
    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    // --- pointer input ---

    /// Feed a pointer event through the gesture state machine.
    ///
    /// Pointer-down on a non-selected overlay selects it; the gesture begins
    /// only on a later pointer-down while selected (two-step contract).
    /// Events with non-finite coordinates are ignored.
    pub fn handle_pointer_event(&mut self, event: PointerEvent) {
        let position = event.position();
        if !position.x.is_finite() || !position.y.is_finite() {
            return;
        }

        match event {
            PointerEvent::Down { target, .. } => self.pointer_down(target, position),
            PointerEvent::Move { .. } => self.pointer_move(position),
            PointerEvent::Up { .. } => self.gesture.end(),
        }
    }

    /// Force-terminate the active gesture (pointer-capture loss, window
    /// blur, unmount). An in-flight update simply completes and is
    /// reconciled normally; no cancel request is sent.
    pub fn cancel_gesture(&mut self) {
        self.gesture.end();
    }

    fn pointer_down(&mut self, target: Option<(OverlayId, HitRegion)>, position: Point) {
        let Some((id, region)) = target else {
            // Background press: nothing to manipulate.
            return;
        };

        if !self.selection.is_selected(id) {
            self.selection.select(id);
            return;
        }

        // A delete may have raced the event handler; a gesture on a missing
        // overlay is a silent no-op.
        let Some(overlay) = self.store.get(id) else {
            return;
        };

        match region {
            HitRegion::Body => {
                self.gesture
                    .start_drag(id, position, overlay.position, overlay.size)
            }
            HitRegion::ResizeHandle => {
                self.gesture
                    .start_resize(id, position, overlay.position, overlay.size)
            }
        }
    }

    fn pointer_move(&mut self, position: Point) {
        let Some(session) = self.gesture.session().copied() else {
            return;
        };
        let Some(overlay) = self.store.get(session.id) else {
            // Overlay deleted mid-gesture.
            return;
        };

        let patch = match session.kind {
            GestureKind::Drag => OverlayPatch::position(session.drag_position(position)),
            GestureKind::Resize => OverlayPatch::size(session.resize_size(overlay.kind, position)),
        };
        self.apply_and_queue(session.id, patch);
    }

    // --- store operations ---

    /// Request creation of a new overlay.
    ///
    /// Validation failures block the operation entirely: no remote request
    /// is issued and nothing enters the collection. The overlay is appended
    /// only once the remote store confirms it with an id.
    pub fn request_create(&mut self, draft: OverlayDraft) -> Result<(), RemoteError> {
        draft.validate()?;
        self.outbox.push(RemoteRequest::Create {
            draft: draft.clamped(),
        });
        Ok(())
    }

    /// Apply a content/kind/geometry edit optimistically and queue the
    /// matching update request. Returns false (silent no-op) if the id is
    /// not in the collection.
    pub fn request_field_edit(&mut self, id: OverlayId, patch: OverlayPatch) -> bool {
        if patch.is_empty() {
            return false;
        }
        self.apply_and_queue(id, patch)
    }

    /// Remove an overlay optimistically and queue the delete request.
    ///
    /// Clears the selection if it referenced the overlay and force-ends any
    /// gesture targeting it. Returns false if the id was not present.
    pub fn request_delete(&mut self, id: OverlayId) -> bool {
        if self.store.remove(id).is_none() {
            return false;
        }
        if self.selection.is_selected(id) {
            self.selection.clear();
        }
        if self.gesture.targets(id) {
            self.gesture.end();
        }
        self.sequences.forget(id);
        // Queued updates for the overlay are now pointless.
        self.outbox
            .retain(|r| !matches!(r, RemoteRequest::Update { id: uid, .. } if *uid == id));
        self.outbox.push(RemoteRequest::Delete { id });
        true
    }

    fn apply_and_queue(&mut self, id: OverlayId, patch: OverlayPatch) -> bool {
        if !self.store.apply_patch(id, &patch) {
            return false;
        }
        let seq = self.sequences.next(id);

        // Coalesce with an undispatched update for the same overlay: only
        // the latest value needs to reach the remote store.
        let pending = self.outbox.iter_mut().find_map(|r| match r {
            RemoteRequest::Update {
                id: uid,
                seq,
                patch,
            } if *uid == id => Some((seq, patch)),
            _ => None,
        });
        match pending {
            Some((pending_seq, pending_patch)) => {
                pending_patch.merge(&patch);
                *pending_seq = seq;
            }
            None => self.outbox.push(RemoteRequest::Update { id, seq, patch }),
        }
        true
    }

    // --- remote synchronization ---

    /// Drain the outbound request queue for dispatch.
    pub fn take_requests(&mut self) -> Vec<RemoteRequest> {
        std::mem::take(&mut self.outbox)
    }

    /// Whether any request is waiting for dispatch.
    pub fn has_pending_requests(&self) -> bool {
        !self.outbox.is_empty()
    }

    /// Apply a remote completion.
    ///
    /// Confirmed creations enter the collection; failed ones never do.
    /// Update confirmations reconcile the local entity with the server's
    /// canonical representation, but only when tagged with the latest
    /// sequence number issued for that overlay; stale responses are
    /// discarded. Update and delete failures are reported to the caller
    /// while the optimistic local state is left in place: losing in-progress
    /// drag feedback would be more disruptive than a transient mismatch.
    pub fn apply_response(&mut self, response: RemoteResponse) -> Result<(), RemoteError> {
        match response {
            RemoteResponse::Created(Ok(overlay)) => {
                log::debug!("overlay {} confirmed by remote", overlay.id);
                self.store.insert_confirmed(overlay);
                Ok(())
            }
            RemoteResponse::Created(Err(err)) => {
                log::warn!("overlay creation failed: {err}");
                Err(err)
            }
            RemoteResponse::Updated { id, seq, result } => match result {
                Ok(canonical) => {
                    if self.sequences.is_current(id, seq) {
                        self.store.reconcile(id, canonical);
                    } else {
                        log::debug!("dropping stale update response for {id} (seq {seq})");
                    }
                    Ok(())
                }
                Err(err) => {
                    log::warn!("update of overlay {id} failed, keeping local state: {err}");
                    Err(err)
                }
            },
            RemoteResponse::Deleted { id, result } => match result {
                Ok(()) => Ok(()),
                Err(err) => {
                    log::warn!("delete of overlay {id} failed remotely: {err}");
                    Err(err)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Position, Size};
    use crate::gesture::GestureKind;
    use crate::overlay::OverlayKind;
    use crate::remote::{MemoryRemote, RemoteStore};
    use crate::sync::perform;
    use uuid::Uuid;

    fn block_on<F: std::future::Future>(f: F) -> F::Output {
        // Simple blocking executor for tests
        use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

        fn dummy_raw_waker() -> RawWaker {
            fn no_op(_: *const ()) {}
            fn clone(_: *const ()) -> RawWaker {
                dummy_raw_waker()
            }
            static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
            RawWaker::new(std::ptr::null(), &VTABLE)
        }

        let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
        let mut cx = Context::from_waker(&waker);
        let mut f = std::pin::pin!(f);

        loop {
            match f.as_mut().poll(&mut cx) {
                Poll::Ready(result) => return result,
                Poll::Pending => {}
            }
        }
    }

    fn overlay(kind: OverlayKind, position: Position, size: Size) -> Overlay {
        Overlay {
            id: Uuid::new_v4(),
            kind,
            content: match kind {
                OverlayKind::Text => "caption".to_string(),
                OverlayKind::Image => "http://example/logo.png".to_string(),
            },
            position,
            size,
            created_at: None,
            updated_at: None,
        }
    }

    fn seeded_editor(kind: OverlayKind) -> (Editor, OverlayId) {
        let mut editor = Editor::new();
        let entity = overlay(kind, Position::new(100, 100), Size::new(200, 50));
        let id = entity.id;
        editor.seed(vec![entity]);
        (editor, id)
    }

    fn down_on_body(id: OverlayId, x: f64, y: f64) -> PointerEvent {
        PointerEvent::Down {
            target: Some((id, HitRegion::Body)),
            position: Point::new(x, y),
        }
    }

    fn down_on_handle(id: OverlayId, x: f64, y: f64) -> PointerEvent {
        PointerEvent::Down {
            target: Some((id, HitRegion::ResizeHandle)),
            position: Point::new(x, y),
        }
    }

    #[test]
    fn test_two_step_select_then_drag() {
        let (mut editor, id) = seeded_editor(OverlayKind::Text);

        // First pointer-down only selects; no gesture starts.
        editor.handle_pointer_event(down_on_body(id, 150.0, 120.0));
        assert!(editor.is_selected(id));
        assert!(editor.active_gesture().is_none());

        // Second pointer-down while selected starts the drag.
        editor.handle_pointer_event(PointerEvent::Up {
            position: Point::new(150.0, 120.0),
        });
        editor.handle_pointer_event(down_on_body(id, 150.0, 120.0));
        let session = editor.active_gesture().unwrap();
        assert_eq!(session.kind, GestureKind::Drag);
        assert_eq!(session.start_position, Position::new(100, 100));
    }

    #[test]
    fn test_drag_clamps_at_origin() {
        let (mut editor, id) = seeded_editor(OverlayKind::Text);
        editor.select(id);

        editor.handle_pointer_event(down_on_body(id, 300.0, 300.0));
        editor.handle_pointer_event(PointerEvent::Move {
            position: Point::new(150.0, 340.0), // delta (-150, 40)
        });

        assert_eq!(editor.overlay(id).unwrap().position, Position::new(0, 140));
    }

    #[test]
    fn test_resize_image_floor_clamps() {
        let mut editor = Editor::new();
        let entity = overlay(OverlayKind::Image, Position::new(100, 100), Size::new(200, 50));
        let id = entity.id;
        editor.seed(vec![entity]);
        editor.select(id);

        editor.handle_pointer_event(down_on_handle(id, 300.0, 150.0));
        editor.handle_pointer_event(PointerEvent::Move {
            position: Point::new(100.0, 140.0), // delta (-200, -10)
        });

        assert_eq!(editor.overlay(id).unwrap().size, Size::new(50, 50));
    }

    #[test]
    fn test_resize_text_keeps_height() {
        let (mut editor, id) = seeded_editor(OverlayKind::Text);
        editor.select(id);

        editor.handle_pointer_event(down_on_handle(id, 300.0, 150.0));
        editor.handle_pointer_event(PointerEvent::Move {
            position: Point::new(340.0, 400.0),
        });

        assert_eq!(editor.overlay(id).unwrap().size, Size::new(240, 50));
    }

    #[test]
    fn test_moves_coalesce_into_one_request() {
        let (mut editor, id) = seeded_editor(OverlayKind::Text);
        editor.select(id);

        editor.handle_pointer_event(down_on_body(id, 300.0, 300.0));
        for i in 1..=5 {
            editor.handle_pointer_event(PointerEvent::Move {
                position: Point::new(300.0 + f64::from(i) * 10.0, 300.0),
            });
        }
        editor.handle_pointer_event(PointerEvent::Up {
            position: Point::new(350.0, 300.0),
        });

        let requests = editor.take_requests();
        assert_eq!(requests.len(), 1);
        match &requests[0] {
            RemoteRequest::Update { id: uid, seq, patch } => {
                assert_eq!(*uid, id);
                assert_eq!(*seq, 5); // every move issued a sequence number
                assert_eq!(patch.position, Some(Position::new(150, 100)));
            }
            other => panic!("expected update request, got {other:?}"),
        }
    }

    #[test]
    fn test_stale_responses_are_discarded() {
        let (mut editor, id) = seeded_editor(OverlayKind::Text);

        // Three dispatched updates with sequence numbers 1, 2, 3.
        let mut dispatched = Vec::new();
        for x in [110, 120, 130] {
            editor.request_field_edit(id, OverlayPatch::position(Position::new(x, 100)));
            dispatched.extend(editor.take_requests());
        }
        assert_eq!(dispatched.len(), 3);

        let response_for = |req: &RemoteRequest| match req {
            RemoteRequest::Update { id, seq, patch } => {
                let mut canonical = overlay(
                    OverlayKind::Text,
                    patch.position.unwrap(),
                    Size::new(200, 50),
                );
                canonical.id = *id;
                RemoteResponse::Updated {
                    id: *id,
                    seq: *seq,
                    result: Ok(canonical),
                }
            }
            other => panic!("expected update request, got {other:?}"),
        };

        // Responses arrive out of order: 2, 1, 3.
        editor.apply_response(response_for(&dispatched[1])).unwrap();
        editor.apply_response(response_for(&dispatched[0])).unwrap();
        editor.apply_response(response_for(&dispatched[2])).unwrap();

        // Only sequence 3 was applied; 1 was discarded despite arriving
        // after 2.
        assert_eq!(editor.overlay(id).unwrap().position, Position::new(130, 100));
    }

    #[test]
    fn test_create_with_empty_content_never_reaches_remote() {
        let mut editor = Editor::new();
        let result = editor.request_create(OverlayDraft::new(OverlayKind::Text, "   "));

        assert!(matches!(result, Err(RemoteError::Validation(_))));
        assert!(editor.take_requests().is_empty());
        assert!(editor.overlays().is_empty());
    }

    #[test]
    fn test_create_appends_only_on_confirmation() {
        let mut editor = Editor::new();
        editor
            .request_create(OverlayDraft::new(OverlayKind::Text, "caption"))
            .unwrap();

        // Pending: not addressable yet.
        assert!(editor.overlays().is_empty());

        let requests = editor.take_requests();
        assert_eq!(requests.len(), 1);
        let confirmed = overlay(OverlayKind::Text, Position::new(50, 50), Size::new(200, 50));
        editor
            .apply_response(RemoteResponse::Created(Ok(confirmed.clone())))
            .unwrap();

        assert_eq!(editor.overlays(), [confirmed]);
    }

    #[test]
    fn test_failed_create_enters_nothing() {
        let mut editor = Editor::new();
        editor
            .request_create(OverlayDraft::new(OverlayKind::Text, "caption"))
            .unwrap();
        editor.take_requests();

        let result = editor.apply_response(RemoteResponse::Created(Err(RemoteError::Transport(
            "connection refused".to_string(),
        ))));

        assert!(result.is_err());
        assert!(editor.overlays().is_empty());
    }

    #[test]
    fn test_delete_clears_selection() {
        let (mut editor, id) = seeded_editor(OverlayKind::Text);
        editor.select(id);

        assert!(editor.request_delete(id));
        assert_eq!(editor.selected(), None);
        assert!(editor.overlays().is_empty());
        assert_eq!(editor.take_requests(), [RemoteRequest::Delete { id }]);
    }

    #[test]
    fn test_delete_ends_gesture_and_drops_queued_updates() {
        let (mut editor, id) = seeded_editor(OverlayKind::Text);
        editor.select(id);

        editor.handle_pointer_event(down_on_body(id, 300.0, 300.0));
        editor.handle_pointer_event(PointerEvent::Move {
            position: Point::new(310.0, 300.0),
        });
        assert!(editor.active_gesture().is_some());

        editor.request_delete(id);
        assert!(editor.active_gesture().is_none());

        // Only the delete goes out; the queued update was dropped.
        assert_eq!(editor.take_requests(), [RemoteRequest::Delete { id }]);

        // Stale move events after the delete are silent no-ops.
        editor.handle_pointer_event(PointerEvent::Move {
            position: Point::new(400.0, 300.0),
        });
        assert!(editor.take_requests().is_empty());
    }

    #[test]
    fn test_delete_failure_does_not_restore() {
        let (mut editor, id) = seeded_editor(OverlayKind::Text);
        editor.request_delete(id);
        editor.take_requests();

        let result = editor.apply_response(RemoteResponse::Deleted {
            id,
            result: Err(RemoteError::Transport("timeout".to_string())),
        });

        assert!(result.is_err());
        assert!(editor.overlays().is_empty()); // accepted limitation
    }

    #[test]
    fn test_update_failure_keeps_optimistic_state() {
        let (mut editor, id) = seeded_editor(OverlayKind::Text);
        editor.request_field_edit(id, OverlayPatch::content("edited"));
        let requests = editor.take_requests();
        assert_eq!(requests.len(), 1);

        let result = editor.apply_response(RemoteResponse::Updated {
            id,
            seq: 1,
            result: Err(RemoteError::NotFound(id)),
        });

        assert!(result.is_err());
        // Responsiveness over strict consistency: the local edit stays.
        assert_eq!(editor.overlay(id).unwrap().content, "edited");
    }

    #[test]
    fn test_edit_of_missing_id_is_noop() {
        let mut editor = Editor::new();
        let applied = editor.request_field_edit(Uuid::new_v4(), OverlayPatch::content("ghost"));
        assert!(!applied);
        assert!(editor.take_requests().is_empty());
    }

    #[test]
    fn test_selecting_missing_id_is_permitted() {
        let mut editor = Editor::new();
        let ghost = Uuid::new_v4();
        editor.select(ghost);
        assert!(editor.is_selected(ghost));

        // A gesture on the missing id is a silent no-op.
        editor.handle_pointer_event(down_on_body(ghost, 10.0, 10.0));
        editor.handle_pointer_event(down_on_body(ghost, 10.0, 10.0));
        assert!(editor.active_gesture().is_none());
    }

    #[test]
    fn test_non_finite_coordinates_are_ignored() {
        let (mut editor, id) = seeded_editor(OverlayKind::Text);
        editor.select(id);
        editor.handle_pointer_event(down_on_body(id, 300.0, 300.0));

        editor.handle_pointer_event(PointerEvent::Move {
            position: Point::new(f64::NAN, 300.0),
        });

        assert_eq!(editor.overlay(id).unwrap().position, Position::new(100, 100));
        assert!(editor.take_requests().is_empty());
    }

    #[test]
    fn test_cancel_gesture_forces_idle() {
        let (mut editor, id) = seeded_editor(OverlayKind::Text);
        editor.select(id);
        editor.handle_pointer_event(down_on_body(id, 300.0, 300.0));
        assert!(editor.active_gesture().is_some());

        editor.cancel_gesture();
        assert!(editor.active_gesture().is_none());
        editor.cancel_gesture(); // idempotent
    }

    #[test]
    fn test_end_to_end_against_memory_remote() {
        let remote = MemoryRemote::new();
        let mut editor = Editor::new();

        editor
            .request_create(OverlayDraft::new(OverlayKind::Text, "caption"))
            .unwrap();
        for request in editor.take_requests() {
            let response = block_on(perform(&remote, request));
            editor.apply_response(response).unwrap();
        }
        assert_eq!(editor.overlays().len(), 1);
        let id = editor.overlays()[0].id;

        editor.request_field_edit(id, OverlayPatch::position(Position::new(10, 20)));
        for request in editor.take_requests() {
            let response = block_on(perform(&remote, request));
            editor.apply_response(response).unwrap();
        }
        assert_eq!(editor.overlay(id).unwrap().position, Position::new(10, 20));

        editor.request_delete(id);
        for request in editor.take_requests() {
            let response = block_on(perform(&remote, request));
            editor.apply_response(response).unwrap();
        }
        assert!(editor.overlays().is_empty());
        assert!(block_on(remote.list_overlays()).unwrap().is_empty());
    }
}
