//! REST implementation of the annotation store
//!
//! Translates store operations into `/2.0/annotations` calls and maps every
//! failure path into the error taxonomy. Causes are logged here; callers only
//! see the typed error.

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::{RequestBuilder, StatusCode};

use super::wire::{self, AnnotationEntry, CreateRequest};
use super::AnnotationStore;
use crate::annotations::types::{Annotation, AnnotationDraft, AnnotationUser};
use crate::config::AnnotationConfig;
use crate::error::{AnnotationError, Result};

/// Envelope of `GET /2.0/files/{id}/annotations`
#[derive(Debug, serde::Deserialize)]
struct EntriesEnvelope {
    entries: Vec<serde_json::Value>,
}

/// HTTP-backed annotation store.
///
/// Stateless per file version except for the lazily resolved user identity
/// and the capability flags supplied at construction.
pub struct AnnotationService {
    client: reqwest::Client,
    config: AnnotationConfig,
    file_id: String,
    user: RwLock<AnnotationUser>,
}

impl AnnotationService {
    /// Create a service for one file
    pub fn new(config: AnnotationConfig, file_id: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
            file_id: file_id.to_string(),
            user: RwLock::new(AnnotationUser::anonymous()),
        }
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.config.api.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn annotations_url(&self) -> String {
        format!("{}/2.0/annotations", self.config.api.base_url)
    }

    /// Adopt the author of a confirmed create as the session identity, once
    fn adopt_identity(&self, annotation: &Annotation) {
        let mut user = self.user.write();
        if user.is_anonymous() && !annotation.user.is_anonymous() {
            tracing::debug!(user_id = %annotation.user.id, "resolved session identity");
            *user = annotation.user.clone();
        }
    }

    fn parse_entry(value: serde_json::Value) -> Option<Annotation> {
        if wire::is_error_envelope(&value) {
            return None;
        }
        serde_json::from_value::<AnnotationEntry>(value)
            .map(AnnotationEntry::into_annotation)
            .ok()
    }
}

#[async_trait]
impl AnnotationStore for AnnotationService {
    async fn create(&self, draft: &AnnotationDraft) -> Result<Annotation> {
        let body = CreateRequest::from_draft(draft);

        let response = self
            .authed(self.client.post(self.annotations_url()))
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                tracing::error!(thread_id = %draft.thread_id, %err, "annotation create failed");
                AnnotationError::CreateFailed
            })?;

        if !response.status().is_success() {
            tracing::error!(
                thread_id = %draft.thread_id,
                status = %response.status(),
                "annotation create rejected"
            );
            return Err(AnnotationError::CreateFailed);
        }

        let value: serde_json::Value = response
            .json()
            .await
            .map_err(|_| AnnotationError::CreateFailed)?;
        let annotation = Self::parse_entry(value).ok_or(AnnotationError::CreateFailed)?;

        self.adopt_identity(&annotation);
        Ok(annotation)
    }

    async fn read(&self, file_version_id: &str) -> Result<Vec<Annotation>> {
        let url = format!(
            "{}/2.0/files/{}/annotations",
            self.config.api.base_url, self.file_id
        );

        let read_failed = || AnnotationError::ReadFailed(file_version_id.to_string());

        let response = self
            .authed(self.client.get(url))
            .query(&[
                ("version", file_version_id),
                (
                    "fields",
                    "item,details,message,created_by,created_at,modified_at,permissions",
                ),
            ])
            .send()
            .await
            .map_err(|err| {
                tracing::error!(file_version_id, %err, "annotation read failed");
                read_failed()
            })?;

        if !response.status().is_success() {
            tracing::error!(
                file_version_id,
                status = %response.status(),
                "annotation read rejected"
            );
            return Err(read_failed());
        }

        let value: serde_json::Value = response.json().await.map_err(|_| read_failed())?;
        if wire::is_error_envelope(&value) {
            return Err(read_failed());
        }

        // Only the first page of entries is consumed; the server's offset
        // paging is a known limitation of this transport.
        let envelope: EntriesEnvelope = serde_json::from_value(value).map_err(|_| read_failed())?;

        envelope
            .entries
            .into_iter()
            .map(|entry| Self::parse_entry(entry).ok_or_else(|| read_failed()))
            .collect()
    }

    async fn delete(&self, annotation_id: &str) -> Result<()> {
        let url = format!("{}/{}", self.annotations_url(), annotation_id);

        let response = self
            .authed(self.client.delete(url))
            .send()
            .await
            .map_err(|err| {
                tracing::error!(annotation_id, %err, "annotation delete failed");
                AnnotationError::DeleteFailed(annotation_id.to_string())
            })?;

        // Only an explicit 204 counts as deleted
        if response.status() == StatusCode::NO_CONTENT {
            Ok(())
        } else {
            tracing::error!(
                annotation_id,
                status = %response.status(),
                "annotation delete rejected"
            );
            Err(AnnotationError::DeleteFailed(annotation_id.to_string()))
        }
    }

    fn can_annotate(&self) -> bool {
        self.config.capabilities.can_annotate
    }

    fn can_delete(&self) -> bool {
        self.config.capabilities.can_delete
    }

    fn user(&self) -> AnnotationUser {
        self.user.read().clone()
    }
}
