//! Reviewer-of-record capability check shared by every handler.

use std::sync::Arc;

use crate::domain::foundation::{MapId, UserId};
use crate::domain::response::ResponseError;
use crate::domain::review_map::{ResponseMap, ReviewerOfRecord};
use crate::ports::{ResponseMapReader, ReviewerDirectory};

/// A map the caller is allowed to act on, with its resolved reviewer.
#[derive(Debug, Clone)]
pub struct ReviewContext {
    pub map: ResponseMap,
    pub reviewer: ReviewerOfRecord,
}

impl ReviewContext {
    /// Team-reviewed maps serialize editing through the lock manager.
    pub fn requires_lock(&self) -> bool {
        self.map.reviewer_is_team() || self.reviewer.is_team()
    }
}

pub struct ReviewAccess {
    maps: Arc<dyn ResponseMapReader>,
    directory: Arc<dyn ReviewerDirectory>,
}

impl ReviewAccess {
    pub fn new(maps: Arc<dyn ResponseMapReader>, directory: Arc<dyn ReviewerDirectory>) -> Self {
        Self { maps, directory }
    }

    /// Loads the map and checks that `caller` is its reviewer (or a member
    /// of the reviewing team).
    ///
    /// # Errors
    ///
    /// - `MapNotFound` if the map doesn't exist
    /// - `Forbidden` if the caller is not on the reviewer of record, including
    ///   when the reviewer reference resolves to nobody
    pub async fn authorize(&self, map_id: &MapId, caller: &UserId) -> Result<ReviewContext, ResponseError> {
        let map = self
            .maps
            .find_by_id(map_id)
            .await?
            .ok_or_else(|| ResponseError::map_not_found(*map_id))?;

        let reviewer = self.directory.resolve(&map).await?;
        if !reviewer.includes(caller) {
            tracing::info!(map_id = %map_id, user_id = %caller, "caller is not on the reviewer of record");
            return Err(ResponseError::Forbidden);
        }

        Ok(ReviewContext { map, reviewer })
    }
}
