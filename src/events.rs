//! Typed notification channels
//!
//! Threads publish `ThreadEvent`s on an unbounded mpsc channel owned by the
//! annotator; the annotator maintains its thread map from them and re-emits
//! everything to viewers over a broadcast channel as `AnnotatorEvent`s.
//! Events are plain enums so the taxonomy is enforced by the type system.

/// Events emitted by an annotation thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThreadEvent {
    /// The thread was destroyed (last annotation removed, draft canceled,
    /// or explicit teardown)
    ThreadDeleted { thread_id: String, page: u32 },
    /// The thread's last annotation was confirmed deleted on the server
    ThreadCleanup { thread_id: String, page: u32 },
    /// A remote create failed and the optimistic annotation was rolled back
    AnnotationCreateError { thread_id: String },
    /// A remote delete failed; the local removal stands
    AnnotationDeleteError {
        thread_id: String,
        annotation_id: String,
    },
}

impl ThreadEvent {
    /// Thread the event belongs to
    pub fn thread_id(&self) -> &str {
        match self {
            ThreadEvent::ThreadDeleted { thread_id, .. }
            | ThreadEvent::ThreadCleanup { thread_id, .. }
            | ThreadEvent::AnnotationCreateError { thread_id }
            | ThreadEvent::AnnotationDeleteError { thread_id, .. } => thread_id,
        }
    }
}

/// Events emitted by the annotator to viewers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotatorEvent {
    PointModeEnter,
    PointModeExit,
    HighlightModeEnter,
    HighlightModeExit,
    /// Forwarded thread lifecycle event
    Thread(ThreadEvent),
}
