//! The artifact intake service.
//!
//! [`ArtifactService`] implements submit, list, and get over an injected
//! [`KvStore`]. It holds no mutable state of its own; concurrent calls
//! only meet inside the backend, where same-id writes are last-writer-wins.
//!
//! A service built without a backend still answers: submissions derive
//! their id and report success without writing, listings are empty, and
//! every lookup is a miss.

use std::sync::Arc;

use chrono::Utc;
use futures::future::try_join_all;

use crate::error::{Result, ServiceError};
use crate::id::{artifact_id, IdLength};
use crate::models::{
    Artifact, ArtifactList, ArtifactRecord, ArtifactStatus, SubmitResponse, SUBMIT_MESSAGE,
};
use crate::store::KvStore;
use crate::validate::{Limits, SubmitRequest};

/// Page size used when a caller does not ask for one.
pub const DEFAULT_LIST_LIMIT: usize = 100;

/// Content-addressed artifact store.
pub struct ArtifactService {
    store: Option<Arc<dyn KvStore>>,
    id_len: IdLength,
    limits: Limits,
    list_cap: usize,
}

impl ArtifactService {
    /// Creates a service over `store` with default id length, limits, and
    /// list cap.
    pub fn new(store: Option<Arc<dyn KvStore>>) -> Self {
        Self {
            store,
            id_len: IdLength::default(),
            limits: Limits::default(),
            list_cap: DEFAULT_LIST_LIMIT,
        }
    }

    pub fn with_id_length(mut self, id_len: IdLength) -> Self {
        self.id_len = id_len;
        self
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Sets the largest page [`list`](Self::list) will return. Zero is
    /// treated as one.
    pub fn with_list_cap(mut self, cap: usize) -> Self {
        self.list_cap = cap.max(1);
        self
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn list_cap(&self) -> usize {
        self.list_cap
    }

    pub fn has_backend(&self) -> bool {
        self.store.is_some()
    }

    /// Validates a raw JSON submission and stores it under its content id.
    pub async fn submit(&self, body: &[u8]) -> Result<SubmitResponse> {
        let submission = SubmitRequest::from_json(body)?.validate(&self.limits)?;
        let id = artifact_id(&submission.content, self.id_len);

        let record = ArtifactRecord {
            kind: submission.kind,
            content: submission.content,
            source_url: submission.source_url,
            submitter: submission.submitter,
            tags: submission.tags,
            note: submission.note,
            ingested_at: Utc::now(),
            status: ArtifactStatus::Pending,
        };

        match &self.store {
            Some(store) => {
                let value = serde_json::to_string(&record)
                    .map_err(|e| ServiceError::storage("Failed to store artifact", e))?;
                store
                    .put(&id, &value)
                    .await
                    .map_err(|e| ServiceError::storage("Failed to store artifact", e))?;
                tracing::info!(artifact_id = %id, kind = %record.kind, "artifact stored");
            }
            None => {
                tracing::warn!(artifact_id = %id, "no storage backend; artifact not persisted");
            }
        }

        Ok(SubmitResponse {
            success: true,
            artifact_id: id,
            message: SUBMIT_MESSAGE.to_string(),
        })
    }

    /// Lists up to `limit` artifacts (clamped to the list cap), in the
    /// backend's key order.
    pub async fn list(&self, limit: Option<usize>) -> Result<ArtifactList> {
        let store = match &self.store {
            Some(s) => s,
            None => return Ok(ArtifactList::new(Vec::new())),
        };
        let limit = limit.unwrap_or(self.list_cap).clamp(1, self.list_cap);

        let keys = store
            .list(limit)
            .await
            .map_err(|e| ServiceError::storage("Failed to fetch artifacts", e))?;

        let fetched = try_join_all(keys.into_iter().map(|key| async move {
            let value = store.get(&key).await?;
            Ok::<_, anyhow::Error>(value.map(|v| (key, v)))
        }))
        .await
        .map_err(|e| ServiceError::storage("Failed to fetch artifacts", e))?;

        let artifacts = fetched
            .into_iter()
            // A key listed but gone by the time it is read is skipped.
            .flatten()
            .map(|(id, value)| decode(id, &value))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| ServiceError::storage("Failed to fetch artifacts", e))?;

        Ok(ArtifactList::new(artifacts))
    }

    /// Fetches a single artifact by id.
    pub async fn get(&self, id: &str) -> Result<Artifact> {
        let store = self.store.as_ref().ok_or(ServiceError::NotFound)?;
        let value = store
            .get(id)
            .await
            .map_err(|e| ServiceError::storage("Failed to fetch artifact", e))?
            .ok_or(ServiceError::NotFound)?;
        decode(id.to_string(), &value)
            .map_err(|e| ServiceError::storage("Failed to fetch artifact", e))
    }
}

fn decode(id: String, value: &str) -> serde_json::Result<Artifact> {
    let record: ArtifactRecord = serde_json::from_str(value)?;
    Ok(Artifact { id, record })
}
