//! Mock store for tests

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use super::AnnotationStore;
use crate::annotations::types::{
    Annotation, AnnotationDraft, AnnotationPermissions, AnnotationUser,
};
use crate::error::{AnnotationError, Result};

/// In-memory store that records calls and can be told to fail.
pub struct MockStore {
    seeded: Mutex<Vec<Annotation>>,
    pub created: Mutex<Vec<AnnotationDraft>>,
    pub deleted: Mutex<Vec<String>>,
    fail_create: AtomicBool,
    fail_delete: AtomicBool,
    next_id: AtomicU64,
    user: Mutex<AnnotationUser>,
    can_annotate: AtomicBool,
    can_delete: AtomicBool,
}

impl MockStore {
    pub fn new() -> Self {
        Self {
            seeded: Mutex::new(Vec::new()),
            created: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
            fail_create: AtomicBool::new(false),
            fail_delete: AtomicBool::new(false),
            next_id: AtomicU64::new(1),
            user: Mutex::new(AnnotationUser {
                id: "42".to_string(),
                name: "Ada".to_string(),
                avatar_url: None,
            }),
            can_annotate: AtomicBool::new(true),
            can_delete: AtomicBool::new(true),
        }
    }

    /// Annotations returned by `read`
    pub fn seed(&self, annotations: Vec<Annotation>) {
        *self.seeded.lock() = annotations;
    }

    pub fn fail_next_create(&self) {
        self.fail_create.store(true, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self) {
        self.fail_delete.store(true, Ordering::SeqCst);
    }

    pub fn deny_annotate(&self) {
        self.can_annotate.store(false, Ordering::SeqCst);
    }

    pub fn deny_delete(&self) {
        self.can_delete.store(false, Ordering::SeqCst);
    }

    pub fn created_count(&self) -> usize {
        self.created.lock().len()
    }

    pub fn deleted_ids(&self) -> Vec<String> {
        self.deleted.lock().clone()
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnnotationStore for MockStore {
    async fn create(&self, draft: &AnnotationDraft) -> Result<Annotation> {
        if self.fail_create.swap(false, Ordering::SeqCst) {
            return Err(AnnotationError::CreateFailed);
        }

        self.created.lock().push(draft.clone());

        let now = Utc::now();
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        Ok(Annotation {
            annotation_id: format!("server-{}", n),
            thread_id: draft.thread_id.clone(),
            file_version_id: draft.file_version_id.clone(),
            annotation_type: draft.annotation_type,
            text: draft.text.clone(),
            location: draft.location.clone(),
            user: self.user.lock().clone(),
            permissions: AnnotationPermissions::owner(),
            created: now,
            modified: now,
        })
    }

    async fn read(&self, _file_version_id: &str) -> Result<Vec<Annotation>> {
        Ok(self.seeded.lock().clone())
    }

    async fn delete(&self, annotation_id: &str) -> Result<()> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(AnnotationError::DeleteFailed(annotation_id.to_string()));
        }
        self.deleted.lock().push(annotation_id.to_string());
        Ok(())
    }

    fn can_annotate(&self) -> bool {
        self.can_annotate.load(Ordering::SeqCst)
    }

    fn can_delete(&self) -> bool {
        self.can_delete.load(Ordering::SeqCst)
    }

    fn user(&self) -> AnnotationUser {
        self.user.lock().clone()
    }
}
