//! Error types for the annotation engine
//!
//! The service layer never recovers errors itself: every failed remote call
//! is mapped into one of these variants and the owning thread decides the UI
//! consequence. Deleting an annotation without `can_delete` permission is a
//! local silent no-op, not an error value.

use thiserror::Error;

/// Crate-wide result type
pub type Result<T> = std::result::Result<T, AnnotationError>;

/// Annotation engine error type
#[derive(Debug, Error)]
pub enum AnnotationError {
    /// Remote create failed (transport error, non-success status, error
    /// envelope, or malformed body). Intentionally generic: no partial state
    /// is retained on the service.
    #[error("Could not create annotation")]
    CreateFailed,

    /// Remote read failed for a file version
    #[error("Could not read annotations for file version {0}")]
    ReadFailed(String),

    /// Remote delete was not confirmed (anything other than HTTP 204)
    #[error("Could not delete annotation {0}")]
    DeleteFailed(String),
}
