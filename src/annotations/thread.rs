//! Annotation thread state machine
//!
//! A thread owns one group of annotations sharing a location and applies
//! every mutation optimistically: the local list changes before the remote
//! call settles, then the continuation reconciles (create) or stands pat
//! (delete). The thread is a cheap cloneable handle around shared inner
//! state; the lock is never held across an await, so a continuation always
//! re-checks what it is about to mutate.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use super::dialog::{AnnotationDialog, IndicatorElement, ThreadKind, ThreadUiFactory};
use super::types::{Annotation, AnnotationDraft, AnnotationType, Location};
use crate::error::{AnnotationError, Result};
use crate::events::ThreadEvent;
use crate::service::{generate_annotation_id, AnnotationStore};

/// Thread lifecycle states.
///
/// Hover states are distinct from explicit activation so hover-driven dialog
/// visibility never wins over a dialog the user opened directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadState {
    /// Newly created draft, no confirmed annotations; dialog implicitly open
    /// for the first comment
    Pending,
    /// Pending while a sibling UI element is mid-interaction
    PendingActive,
    /// Has confirmed annotations; indicator shown, dialog hidden
    Inactive,
    /// Dialog open from direct interaction
    Active,
    /// Dialog shown transiently due to pointer hover
    Hover,
    /// Hovered while explicitly activated
    ActiveHover,
}

struct ThreadStateData {
    annotations: Vec<Annotation>,
    state: ThreadState,
    dialog: Option<Box<dyn AnnotationDialog>>,
    indicator: Option<Box<dyn IndicatorElement>>,
    destroyed: bool,
}

struct ThreadInner {
    thread_id: String,
    file_version_id: String,
    location: Location,
    kind: ThreadKind,
    store: Arc<dyn AnnotationStore>,
    ui: Arc<dyn ThreadUiFactory>,
    events: mpsc::UnboundedSender<ThreadEvent>,
    state: Mutex<ThreadStateData>,
}

/// One group of annotations sharing a location, indicator, and dialog.
#[derive(Clone)]
pub struct AnnotationThread {
    inner: Arc<ThreadInner>,
}

impl AnnotationThread {
    /// Create a thread from fetched annotations (≥1) or as a pending local
    /// draft (zero annotations).
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        annotations: Vec<Annotation>,
        location: Location,
        annotation_type: AnnotationType,
        thread_id: String,
        file_version_id: String,
        store: Arc<dyn AnnotationStore>,
        ui: Arc<dyn ThreadUiFactory>,
        events: mpsc::UnboundedSender<ThreadEvent>,
    ) -> Self {
        let state = if annotations.is_empty() {
            ThreadState::Pending
        } else {
            ThreadState::Inactive
        };

        Self {
            inner: Arc::new(ThreadInner {
                thread_id,
                file_version_id,
                location,
                kind: ThreadKind::from(annotation_type),
                store,
                ui,
                events,
                state: Mutex::new(ThreadStateData {
                    annotations,
                    state,
                    dialog: None,
                    indicator: None,
                    destroyed: false,
                }),
            }),
        }
    }

    pub fn thread_id(&self) -> &str {
        &self.inner.thread_id
    }

    pub fn location(&self) -> &Location {
        &self.inner.location
    }

    pub fn page(&self) -> u32 {
        self.inner.location.page()
    }

    pub fn kind(&self) -> ThreadKind {
        self.inner.kind
    }

    pub fn state(&self) -> ThreadState {
        self.inner.state.lock().state
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.state.lock().destroyed
    }

    /// Snapshot of the thread's annotations, in insertion order
    pub fn annotations(&self) -> Vec<Annotation> {
        self.inner.state.lock().annotations.clone()
    }

    /// Show the thread's indicator, and its dialog where the state calls
    /// for one. This is the subtype hook: point threads pin an icon and keep
    /// the dialog open while pending, highlight threads draw their marks and
    /// only surface the dialog on activation or hover.
    pub fn show(&self) {
        let mut st = self.inner.state.lock();
        if st.destroyed {
            return;
        }

        if st.indicator.is_none() {
            st.indicator = Some(
                self.inner
                    .ui
                    .create_indicator(self.inner.kind, &self.inner.location),
            );
        }
        if let Some(indicator) = st.indicator.as_mut() {
            indicator.show(&self.inner.location);
        }

        match st.state {
            ThreadState::Inactive => {
                if let Some(dialog) = st.dialog.as_mut() {
                    dialog.hide();
                }
            }
            // Pending threads hold the dialog open for the first comment;
            // active and hovered threads show it too.
            _ => {
                self.ensure_dialog(&mut st);
                if let Some(dialog) = st.dialog.as_mut() {
                    dialog.show();
                }
            }
        }
    }

    /// Unconditional reset to the inactive state
    pub fn reset(&self) {
        let mut st = self.inner.state.lock();
        if st.destroyed {
            return;
        }
        st.state = ThreadState::Inactive;
        if let Some(dialog) = st.dialog.as_mut() {
            dialog.hide();
        }
    }

    /// Open the dialog from direct interaction
    pub fn activate(&self) {
        let mut st = self.inner.state.lock();
        if st.destroyed {
            return;
        }
        match st.state {
            ThreadState::Pending | ThreadState::PendingActive => {}
            _ => {
                self.ensure_dialog(&mut st);
                if let Some(dialog) = st.dialog.as_mut() {
                    dialog.show();
                }
                st.state = ThreadState::Active;
            }
        }
    }

    /// Pointer entered the indicator
    pub fn hover_enter(&self) {
        let mut st = self.inner.state.lock();
        if st.destroyed {
            return;
        }
        match st.state {
            ThreadState::Inactive => {
                self.ensure_dialog(&mut st);
                if let Some(dialog) = st.dialog.as_mut() {
                    dialog.show();
                }
                st.state = ThreadState::Hover;
            }
            ThreadState::Active => st.state = ThreadState::ActiveHover,
            _ => {}
        }
    }

    /// Pointer left the indicator. An explicitly activated dialog stays up.
    pub fn hover_leave(&self) {
        let mut st = self.inner.state.lock();
        if st.destroyed {
            return;
        }
        match st.state {
            ThreadState::Hover => {
                if let Some(dialog) = st.dialog.as_mut() {
                    dialog.hide();
                }
                st.state = ThreadState::Inactive;
            }
            ThreadState::ActiveHover => st.state = ThreadState::Active,
            _ => {}
        }
    }

    /// A sibling UI element took focus while this thread is still pending
    pub fn mark_pending_active(&self) {
        let mut st = self.inner.state.lock();
        if !st.destroyed && st.state == ThreadState::Pending {
            st.state = ThreadState::PendingActive;
        }
    }

    /// Save a new annotation on this thread, optimistically.
    ///
    /// The local annotation is visible before the remote call settles; on
    /// success it is replaced in place by the server's version, on failure
    /// it is rolled back and `AnnotationCreateError` is emitted.
    pub async fn save_annotation(
        &self,
        annotation_type: AnnotationType,
        text: &str,
    ) -> Result<Annotation> {
        let draft = AnnotationDraft {
            file_version_id: self.inner.file_version_id.clone(),
            annotation_type,
            text: text.to_string(),
            location: self.inner.location.clone(),
            thread_id: self.inner.thread_id.clone(),
        };

        let temp = Annotation::from_draft(&draft, generate_annotation_id(), self.inner.store.user());
        let temp_id = temp.annotation_id.clone();

        {
            let mut st = self.inner.state.lock();
            if st.destroyed {
                tracing::warn!(thread_id = %self.inner.thread_id, "save on destroyed thread");
                return Err(AnnotationError::CreateFailed);
            }
            st.annotations.push(temp.clone());
            if let Some(dialog) = st.dialog.as_mut() {
                dialog.add_annotation(&temp);
            }
        }

        match self.inner.store.create(&draft).await {
            Ok(saved) => {
                let mut st = self.inner.state.lock();
                // The thread may have been destroyed while the request was
                // in flight; nothing left to reconcile.
                if st.destroyed {
                    return Ok(saved);
                }

                // Match the temp annotation by identity, never by index.
                match st
                    .annotations
                    .iter_mut()
                    .find(|a| a.annotation_id == temp_id)
                {
                    Some(slot) => *slot = saved.clone(),
                    // Removed while in flight (e.g. canceled); keep the
                    // confirmed annotation by appending it.
                    None => st.annotations.push(saved.clone()),
                }
                if let Some(dialog) = st.dialog.as_mut() {
                    dialog.remove_annotation(&temp_id);
                    dialog.add_annotation(&saved);
                }

                let dialog_visible = st.dialog.as_ref().map(|d| d.is_visible()).unwrap_or(false);
                st.state = if dialog_visible {
                    ThreadState::Hover
                } else {
                    ThreadState::Inactive
                };

                Ok(saved)
            }
            Err(err) => {
                let mut st = self.inner.state.lock();
                st.annotations.retain(|a| a.annotation_id != temp_id);
                if let Some(dialog) = st.dialog.as_mut() {
                    dialog.remove_annotation(&temp_id);
                }
                tracing::error!(
                    thread_id = %self.inner.thread_id,
                    "rolled back optimistic create"
                );
                self.emit(ThreadEvent::AnnotationCreateError {
                    thread_id: self.inner.thread_id.clone(),
                });
                Err(err)
            }
        }
    }

    /// Delete an annotation from this thread, optimistically.
    ///
    /// Silent no-op when the annotation is missing, the session lacks the
    /// delete capability, or the annotation's own permissions forbid it.
    /// The local removal is never rolled back: a failed remote delete only
    /// emits `AnnotationDeleteError`.
    pub async fn delete_annotation(&self, annotation_id: &str, use_server: bool) -> Result<()> {
        let (chain_delete, now_empty) = {
            let mut st = self.inner.state.lock();
            if st.destroyed {
                return Ok(());
            }

            let Some(index) = st
                .annotations
                .iter()
                .position(|a| a.annotation_id == annotation_id)
            else {
                return Ok(());
            };
            if !self.inner.store.can_delete() || !st.annotations[index].permissions.can_delete {
                tracing::warn!(annotation_id, "delete denied locally, skipping");
                return Ok(());
            }

            st.annotations.remove(index);
            if let Some(dialog) = st.dialog.as_mut() {
                dialog.remove_annotation(annotation_id);
            }

            let plain_highlight = self.is_plain_highlight(&st.annotations);
            let mark_deletable = st
                .annotations
                .first()
                .map(|a| a.permissions.can_delete)
                .unwrap_or(false);

            // The orphaned blank mark gets cleaned up on the server after
            // the primary delete confirms.
            let chain_delete = if plain_highlight && mark_deletable {
                st.annotations.first().map(|a| a.annotation_id.clone())
            } else {
                None
            };

            if st.annotations.is_empty() || (plain_highlight && mark_deletable) {
                self.destroy_locked(&mut st);
            } else if plain_highlight {
                // The remaining mark belongs to another user: keep the
                // thread, close out the first-comment UI state only.
                self.cancel_first_comment_locked(&mut st);
            }

            (chain_delete, st.annotations.is_empty())
        };

        if !use_server {
            return Ok(());
        }

        match self.inner.store.delete(annotation_id).await {
            Ok(()) => {
                if let Some(mark_id) = chain_delete {
                    if let Err(err) = self.inner.store.delete(&mark_id).await {
                        tracing::error!(annotation_id = %mark_id, "blank mark cleanup failed");
                        self.emit(ThreadEvent::AnnotationDeleteError {
                            thread_id: self.inner.thread_id.clone(),
                            annotation_id: mark_id,
                        });
                        return Err(err);
                    }
                }
                if now_empty {
                    self.emit(ThreadEvent::ThreadCleanup {
                        thread_id: self.inner.thread_id.clone(),
                        page: self.page(),
                    });
                }
                Ok(())
            }
            Err(err) => {
                tracing::error!(annotation_id, "remote delete failed, local removal stands");
                self.emit(ThreadEvent::AnnotationDeleteError {
                    thread_id: self.inner.thread_id.clone(),
                    annotation_id: annotation_id.to_string(),
                });
                Err(err)
            }
        }
    }

    /// Cancel a thread that never got its first annotation saved
    pub fn cancel_unsaved_annotation(&self) {
        let mut st = self.inner.state.lock();
        if matches!(
            st.state,
            ThreadState::Pending | ThreadState::PendingActive
        ) && !st.destroyed
        {
            self.destroy_locked(&mut st);
        }
    }

    /// Close out the first-comment UI without touching the annotation list
    pub fn cancel_first_comment(&self) {
        let mut st = self.inner.state.lock();
        if st.destroyed {
            return;
        }
        self.cancel_first_comment_locked(&mut st);
    }

    fn cancel_first_comment_locked(&self, st: &mut ThreadStateData) {
        if let Some(dialog) = st.dialog.as_mut() {
            dialog.hide();
        }
        st.state = ThreadState::Inactive;
    }

    /// Tear down the thread: release dialog and indicator, emit
    /// `ThreadDeleted`. Terminal; later calls are no-ops.
    pub fn destroy(&self) {
        let mut st = self.inner.state.lock();
        self.destroy_locked(&mut st);
    }

    fn destroy_locked(&self, st: &mut ThreadStateData) {
        if st.destroyed {
            return;
        }
        st.destroyed = true;
        if let Some(mut dialog) = st.dialog.take() {
            dialog.destroy();
        }
        if let Some(mut indicator) = st.indicator.take() {
            indicator.destroy();
        }
        self.emit(ThreadEvent::ThreadDeleted {
            thread_id: self.inner.thread_id.clone(),
            page: self.page(),
        });
    }

    fn ensure_dialog(&self, st: &mut ThreadStateData) {
        if st.dialog.is_none() {
            let mut dialog =
                self.inner
                    .ui
                    .create_dialog(self.inner.kind, &self.inner.location, &st.annotations);
            dialog.setup(&st.annotations);
            st.dialog = Some(dialog);
        }
    }

    /// A highlight thread whose remaining annotations are all blank marks
    fn is_plain_highlight(&self, annotations: &[Annotation]) -> bool {
        self.inner.kind == ThreadKind::Highlight
            && !annotations.is_empty()
            && annotations.iter().all(|a| a.text.is_empty())
    }

    fn emit(&self, event: ThreadEvent) {
        // The annotator may already be gone during teardown
        let _ = self.inner.events.send(event);
    }
}
