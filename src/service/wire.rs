//! Wire types for the `/2.0/annotations` REST contract
//!
//! Request and response shapes are kept separate from the engine's value
//! types: the server speaks in entries with `item`/`details` envelopes, the
//! engine speaks in `Annotation`s.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::annotations::types::{
    Annotation, AnnotationDraft, AnnotationPermissions, AnnotationType, AnnotationUser, Location,
};

/// Body of `POST /2.0/annotations`
#[derive(Debug, Serialize)]
pub struct CreateRequest {
    pub item: ItemRef,
    pub details: AnnotationDetails,
    pub message: String,
}

impl CreateRequest {
    pub fn from_draft(draft: &AnnotationDraft) -> Self {
        Self {
            item: ItemRef {
                item_type: "file_version".to_string(),
                id: draft.file_version_id.clone(),
            },
            details: AnnotationDetails {
                annotation_type: draft.annotation_type,
                location: draft.location.clone(),
                thread_id: draft.thread_id.clone(),
            },
            message: draft.text.clone(),
        }
    }
}

/// Reference to the annotated entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemRef {
    #[serde(rename = "type")]
    pub item_type: String,
    pub id: String,
}

/// The annotation payload shared by requests and entries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationDetails {
    #[serde(rename = "type")]
    pub annotation_type: AnnotationType,
    pub location: Location,
    #[serde(rename = "threadID")]
    pub thread_id: String,
}

/// One annotation as returned by the server
#[derive(Debug, Deserialize)]
pub struct AnnotationEntry {
    pub id: String,
    pub item: ItemRef,
    pub details: AnnotationDetails,
    #[serde(default)]
    pub message: String,
    pub created_by: WireUser,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    #[serde(default)]
    pub permissions: WirePermissions,
}

#[derive(Debug, Deserialize)]
pub struct WireUser {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WirePermissions {
    #[serde(default)]
    pub can_edit: bool,
    #[serde(default)]
    pub can_delete: bool,
}

impl AnnotationEntry {
    /// Convert a server entry into the engine's value type
    pub fn into_annotation(self) -> Annotation {
        Annotation {
            annotation_id: self.id,
            thread_id: self.details.thread_id,
            file_version_id: self.item.id,
            annotation_type: self.details.annotation_type,
            text: self.message,
            location: self.details.location,
            user: AnnotationUser {
                id: self.created_by.id,
                name: self.created_by.name,
                avatar_url: self.created_by.avatar_url,
            },
            permissions: AnnotationPermissions {
                can_edit: self.permissions.can_edit,
                can_delete: self.permissions.can_delete,
            },
            created: self.created_at,
            modified: self.modified_at,
        }
    }
}

/// Whether a response body is the server's `{type: "error"}` envelope
pub fn is_error_envelope(value: &serde_json::Value) -> bool {
    value.get("type").and_then(|t| t.as_str()) == Some("error")
}
