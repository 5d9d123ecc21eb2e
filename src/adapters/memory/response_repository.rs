//! In-memory ResponseRepository.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, MapId, ResponseId, Timestamp};
use crate::domain::response::versioning;
use crate::domain::response::{Response, ResponseStatus, Visibility};
use crate::ports::{ResponseRepository, VersionInsert};

#[derive(Debug, Default)]
pub struct InMemoryResponseRepository {
    responses: RwLock<HashMap<ResponseId, Response>>,
}

impl InMemoryResponseRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a response as is, bypassing version checks (seeding).
    pub async fn seed(&self, response: Response) {
        self.responses.write().await.insert(*response.id(), response);
    }
}

#[async_trait]
impl ResponseRepository for InMemoryResponseRepository {
    async fn insert_version(
        &self,
        candidate: &Response,
        expected_latest: Option<ResponseId>,
    ) -> Result<VersionInsert, DomainError> {
        // Check and insert under one write guard.
        let mut responses = self.responses.write().await;
        let versions: Vec<Response> = responses
            .values()
            .filter(|r| r.map_id() == candidate.map_id() && r.round() == candidate.round())
            .cloned()
            .collect();

        if let Some(current) = versioning::current_version(&versions) {
            if Some(*current.id()) != expected_latest {
                return Ok(VersionInsert::Superseded(current.clone()));
            }
        }

        responses.insert(*candidate.id(), candidate.clone());
        Ok(VersionInsert::Inserted(candidate.clone()))
    }

    async fn save_comment(&self, response: &Response) -> Result<bool, DomainError> {
        let mut responses = self.responses.write().await;
        let stored = responses.get_mut(response.id()).ok_or_else(|| not_found(response.id()))?;
        if stored.is_submitted() {
            return Ok(false);
        }
        *stored = patched(
            stored,
            ResponseStatus::Draft,
            response.additional_comment(),
            stored.visibility(),
            *response.updated_at(),
        );
        Ok(true)
    }

    async fn mark_submitted(&self, response: &Response) -> Result<bool, DomainError> {
        let mut responses = self.responses.write().await;
        let stored = responses.get_mut(response.id()).ok_or_else(|| not_found(response.id()))?;
        if stored.is_submitted() {
            return Ok(false);
        }
        *stored = patched(
            stored,
            ResponseStatus::Submitted,
            response.additional_comment(),
            stored.visibility(),
            *response.updated_at(),
        );
        Ok(true)
    }

    async fn set_visibility(
        &self,
        id: &ResponseId,
        visibility: Visibility,
        updated_at: Timestamp,
    ) -> Result<(), DomainError> {
        let mut responses = self.responses.write().await;
        let stored = responses.get_mut(id).ok_or_else(|| not_found(id))?;
        *stored = patched(
            stored,
            stored.status(),
            stored.additional_comment(),
            visibility,
            updated_at,
        );
        Ok(())
    }

    async fn find_by_id(&self, id: &ResponseId) -> Result<Option<Response>, DomainError> {
        Ok(self.responses.read().await.get(id).cloned())
    }

    async fn find_by_map_and_round(&self, map_id: &MapId, round: Option<u32>) -> Result<Vec<Response>, DomainError> {
        let mut versions: Vec<Response> = self
            .responses
            .read()
            .await
            .values()
            .filter(|r| r.map_id() == map_id && r.round() == round)
            .cloned()
            .collect();
        versioning::sort_most_recent_first(&mut versions);
        Ok(versions)
    }

    async fn delete(&self, id: &ResponseId) -> Result<(), DomainError> {
        self.responses.write().await.remove(id);
        Ok(())
    }
}

fn not_found(id: &ResponseId) -> DomainError {
    DomainError::new(ErrorCode::ResponseNotFound, format!("Response not found: {}", id))
}

/// Copy of `stored` with the mutable columns replaced.
fn patched(
    stored: &Response,
    status: ResponseStatus,
    comment: &str,
    visibility: Visibility,
    updated_at: Timestamp,
) -> Response {
    Response::reconstitute(
        *stored.id(),
        *stored.map_id(),
        stored.round(),
        stored.version_num().map(str::to_string),
        status,
        comment.to_string(),
        visibility,
        *stored.created_at(),
        updated_at,
    )
}
