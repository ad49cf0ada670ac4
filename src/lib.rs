//! Amnesia Annotations
//!
//! Client-side annotation engine for document previews. Annotations are
//! grouped into *threads* (one location, one indicator, one dialog); threads
//! apply edits optimistically and reconcile them against a remote annotation
//! store once the network call settles.
//!
//! # Modules
//!
//! - `annotations`: annotation data model, thread state machine, collaborator
//!   seams (dialog, indicator, host)
//! - `service`: the remote store boundary (REST transport + store trait)
//! - `annotator`: per-document orchestration (thread map, modes, events)
//! - `events`: typed notification channels
//!
//! Rendering, DOM location resolution, and asset loading are collaborator
//! responsibilities and stay outside this crate.

pub mod annotations;
pub mod annotator;
pub mod config;
pub mod error;
pub mod events;
pub mod service;

pub use annotations::dialog::{
    AnnotationDialog, AnnotatorHost, IndicatorElement, ThreadKind, ThreadUiFactory,
};
pub use annotations::thread::{AnnotationThread, ThreadState};
pub use annotations::types::{
    Annotation, AnnotationDraft, AnnotationPermissions, AnnotationType, AnnotationUser, Location,
};
pub use annotator::{AnnotationMode, Annotator};
pub use config::AnnotationConfig;
pub use error::{AnnotationError, Result};
pub use events::{AnnotatorEvent, ThreadEvent};
pub use service::{generate_annotation_id, AnnotationService, AnnotationStore};
