//! Annotation value types
//!
//! Wire-compatible with the `/2.0/annotations` REST contract: annotation
//! types and locations serialize to the shapes the server exchanges.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single comment or mark on a document.
///
/// Immutable by convention: threads replace annotations wholesale instead of
/// mutating them in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Unique identifier (RFC4122 v4 UUID), unique across the whole file
    #[serde(rename = "annotationId")]
    pub annotation_id: String,
    /// Groups annotations into one conversation sharing an indicator/dialog
    #[serde(rename = "threadId")]
    pub thread_id: String,
    /// File version the annotation belongs to
    #[serde(rename = "fileVersionId")]
    pub file_version_id: String,
    /// Kind of annotation
    #[serde(rename = "type")]
    pub annotation_type: AnnotationType,
    /// Comment text; empty for a blank highlight mark
    pub text: String,
    /// Viewer-specific geometry, opaque to the engine
    pub location: Location,
    /// Author identity
    pub user: AnnotationUser,
    /// What the current user may do with this annotation
    pub permissions: AnnotationPermissions,
    /// Creation timestamp
    pub created: DateTime<Utc>,
    /// Last modification timestamp
    pub modified: DateTime<Utc>,
}

/// Kinds of annotations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnnotationType {
    /// Point comment pinned to page coordinates
    #[serde(rename = "point")]
    Point,
    /// Text highlight mark with no comment
    #[serde(rename = "highlight")]
    Highlight,
    /// Text highlight carrying a comment
    #[serde(rename = "highlight-comment")]
    HighlightComment,
}

/// Viewer-specific annotation geometry.
///
/// Opaque to the engine except for the page number, which keys the thread
/// map. Untagged on the wire: a point location carries `x`/`y`, a highlight
/// location carries quad points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Location {
    /// Page coordinates of a point annotation
    Point { x: f64, y: f64, page: u32 },
    /// Quad points (x1..y4 per quad) of a highlight annotation
    Quad {
        #[serde(rename = "quadPoints")]
        quad_points: Vec<[f64; 8]>,
        page: u32,
    },
}

impl Location {
    /// Page the annotation lives on
    pub fn page(&self) -> u32 {
        match self {
            Location::Point { page, .. } => *page,
            Location::Quad { page, .. } => *page,
        }
    }
}

/// Annotation author
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationUser {
    pub id: String,
    pub name: String,
    #[serde(rename = "avatarUrl", skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl AnnotationUser {
    /// Placeholder identity used until the server resolves the real user
    pub fn anonymous() -> Self {
        Self {
            id: "0".to_string(),
            name: "Unknown User".to_string(),
            avatar_url: None,
        }
    }

    /// Whether this is the unresolved placeholder identity
    pub fn is_anonymous(&self) -> bool {
        self.id == "0"
    }
}

impl Default for AnnotationUser {
    fn default() -> Self {
        Self::anonymous()
    }
}

/// Per-annotation capability flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationPermissions {
    #[serde(rename = "canEdit")]
    pub can_edit: bool,
    #[serde(rename = "canDelete")]
    pub can_delete: bool,
}

impl AnnotationPermissions {
    /// Permissions granted to a freshly created local annotation
    pub fn owner() -> Self {
        Self {
            can_edit: true,
            can_delete: true,
        }
    }
}

/// Input to a remote create: everything the server needs, nothing it assigns
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationDraft {
    pub file_version_id: String,
    pub annotation_type: AnnotationType,
    pub text: String,
    pub location: Location,
    pub thread_id: String,
}

impl Annotation {
    /// Materialize a local annotation from a draft, ahead of server
    /// confirmation. The caller supplies the generated id and the identity
    /// currently resolved by the service.
    pub fn from_draft(draft: &AnnotationDraft, annotation_id: String, user: AnnotationUser) -> Self {
        let now = Utc::now();
        Self {
            annotation_id,
            thread_id: draft.thread_id.clone(),
            file_version_id: draft.file_version_id.clone(),
            annotation_type: draft.annotation_type,
            text: draft.text.clone(),
            location: draft.location.clone(),
            user,
            permissions: AnnotationPermissions::owner(),
            created: now,
            modified: now,
        }
    }
}
