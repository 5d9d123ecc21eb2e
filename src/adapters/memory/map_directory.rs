//! In-memory response maps and reviewer directory.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, MapId};
use crate::domain::review_map::{ResponseMap, ReviewerOfRecord};
use crate::ports::{ResponseMapReader, ReviewerDirectory};

/// Holds maps together with their resolved reviewer of record.
///
/// Implements both read ports so tests and the `memory` backend can seed
/// assignments in one place.
#[derive(Debug, Default)]
pub struct InMemoryMapDirectory {
    entries: RwLock<HashMap<MapId, (ResponseMap, ReviewerOfRecord)>>,
}

impl InMemoryMapDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a map and its reviewer.
    pub async fn insert(&self, map: ResponseMap, reviewer: ReviewerOfRecord) {
        self.entries.write().await.insert(*map.id(), (map, reviewer));
    }
}

#[async_trait]
impl ResponseMapReader for InMemoryMapDirectory {
    async fn find_by_id(&self, id: &MapId) -> Result<Option<ResponseMap>, DomainError> {
        Ok(self.entries.read().await.get(id).map(|(map, _)| map.clone()))
    }

    async fn find_siblings(&self, map: &ResponseMap) -> Result<Vec<ResponseMap>, DomainError> {
        Ok(self
            .entries
            .read()
            .await
            .values()
            .filter(|(candidate, _)| candidate.is_sibling_of(map))
            .map(|(candidate, _)| candidate.clone())
            .collect())
    }
}

#[async_trait]
impl ReviewerDirectory for InMemoryMapDirectory {
    async fn resolve(&self, map: &ResponseMap) -> Result<ReviewerOfRecord, DomainError> {
        Ok(self
            .entries
            .read()
            .await
            .get(map.id())
            .map(|(_, reviewer)| reviewer.clone())
            .unwrap_or(ReviewerOfRecord::Unassigned))
    }
}
