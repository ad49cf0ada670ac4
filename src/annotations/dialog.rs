//! Collaborator seams for DOM-facing components
//!
//! The engine never touches the DOM. Dialogs, indicator elements, the mode
//! marker, and listener binding are supplied by the embedding viewer through
//! these traits; threads and the annotator drive them at well-defined points
//! of the state machine.

use super::types::{Annotation, AnnotationType, Location};
use crate::annotator::AnnotationMode;

/// Thread subtype selector.
///
/// Point and highlight threads share one state machine and differ only in
/// indicator rendering and dialog geometry, so the subtype is a tag that
/// picks the UI hooks, not a separate type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadKind {
    Point,
    Highlight,
}

impl From<AnnotationType> for ThreadKind {
    fn from(annotation_type: AnnotationType) -> Self {
        match annotation_type {
            AnnotationType::Point => ThreadKind::Point,
            AnnotationType::Highlight | AnnotationType::HighlightComment => ThreadKind::Highlight,
        }
    }
}

/// Comment dialog attached to one thread.
///
/// Created lazily; a pending thread opens it implicitly for the first
/// comment. Destroying the thread destroys the dialog.
pub trait AnnotationDialog: Send {
    fn show(&mut self);
    fn hide(&mut self);
    fn is_visible(&self) -> bool;
    /// Populate the dialog from the current annotation list
    fn setup(&mut self, annotations: &[Annotation]);
    fn add_annotation(&mut self, annotation: &Annotation);
    fn remove_annotation(&mut self, annotation_id: &str);
    fn destroy(&mut self);
}

/// Visual indicator for one thread (point icon or highlight marks)
pub trait IndicatorElement: Send {
    fn show(&mut self, location: &Location);
    fn hide(&mut self);
    fn destroy(&mut self);
}

/// Factory for thread UI collaborators, dispatched on thread kind
pub trait ThreadUiFactory: Send + Sync {
    fn create_dialog(
        &self,
        kind: ThreadKind,
        location: &Location,
        annotations: &[Annotation],
    ) -> Box<dyn AnnotationDialog>;

    fn create_indicator(&self, kind: ThreadKind, location: &Location) -> Box<dyn IndicatorElement>;
}

/// Host seam for the external location resolver.
///
/// The mode marker is a DOM class the resolver reads to decide what a click
/// means; listener sets are swapped so only one mode's listeners are ever
/// active at a time.
pub trait AnnotatorHost: Send + Sync {
    fn set_mode_marker(&self, mode: AnnotationMode, active: bool);
    fn bind_mode_listeners(&self, mode: AnnotationMode);
    fn unbind_mode_listeners(&self, mode: AnnotationMode);
}
