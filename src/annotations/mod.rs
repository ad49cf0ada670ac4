//! Annotation data model and thread engine
//!
//! An annotation is an immutable-by-convention value object; a thread owns
//! the ordered group of annotations sharing one location, one indicator, and
//! one dialog, and runs the optimistic create/delete state machine against
//! the remote store.

pub mod dialog;
pub mod thread;
pub mod types;

#[cfg(test)]
pub mod mock;

pub use dialog::{AnnotationDialog, AnnotatorHost, IndicatorElement, ThreadKind, ThreadUiFactory};
pub use thread::{AnnotationThread, ThreadState};
pub use types::{
    Annotation, AnnotationDraft, AnnotationPermissions, AnnotationType, AnnotationUser, Location,
};
