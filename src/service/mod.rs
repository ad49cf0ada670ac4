//! Remote annotation store boundary
//!
//! The store trait is the sole I/O boundary of the engine: threads never
//! issue network calls themselves. The REST implementation lives in `http`;
//! tests swap in a mock (same pattern as provider traits elsewhere in the
//! stack). Every call gets its own future — results are never funneled
//! through a shared resolver, so concurrent in-flight requests cannot
//! observe each other's outcomes.

pub mod http;
pub mod wire;

#[cfg(test)]
pub mod mock;

use std::collections::BTreeMap;

use async_trait::async_trait;
use uuid::Uuid;

use crate::annotations::types::{Annotation, AnnotationDraft, AnnotationUser};
use crate::error::Result;

pub use http::AnnotationService;

/// Generate a globally unique annotation id (RFC4122 v4).
///
/// Pure and unbiased: 122 bits of entropy, enough that two concurrently
/// created local threads never collide.
pub fn generate_annotation_id() -> String {
    Uuid::new_v4().to_string()
}

/// Remote CRUD boundary for annotations.
#[async_trait]
pub trait AnnotationStore: Send + Sync {
    /// Create one annotation remotely.
    ///
    /// Resolves with the fully populated annotation (server id, permissions,
    /// timestamps, resolved author). Rejects with a generic create error on
    /// any failure; no partial state is retained.
    async fn create(&self, draft: &AnnotationDraft) -> Result<Annotation>;

    /// Fetch all annotations for a file version.
    async fn read(&self, file_version_id: &str) -> Result<Vec<Annotation>>;

    /// Delete one annotation. Succeeds only on an explicit server
    /// confirmation (HTTP 204).
    async fn delete(&self, annotation_id: &str) -> Result<()>;

    /// Whether the current session may create annotations
    fn can_annotate(&self) -> bool;

    /// Whether the current session may delete annotations at all; each
    /// annotation is further gated by its own permissions
    fn can_delete(&self) -> bool;

    /// Identity resolved for the current session (anonymous until the first
    /// successful create)
    fn user(&self) -> AnnotationUser;

    /// Fetch and group annotations by thread.
    ///
    /// Deterministic transform over `read`: group by `thread_id`, then sort
    /// each group ascending by creation time. The BTreeMap keeps thread
    /// iteration order stable across identical fetches.
    async fn thread_map(&self, file_version_id: &str) -> Result<BTreeMap<String, Vec<Annotation>>> {
        let annotations = self.read(file_version_id).await?;

        let mut map: BTreeMap<String, Vec<Annotation>> = BTreeMap::new();
        for annotation in annotations {
            map.entry(annotation.thread_id.clone())
                .or_default()
                .push(annotation);
        }
        for group in map.values_mut() {
            group.sort_by(|a, b| a.created.cmp(&b.created));
        }

        Ok(map)
    }
}
