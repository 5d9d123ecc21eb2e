//! Version Store - resolves the current response version for a (map, round).

use std::sync::Arc;

use crate::domain::foundation::ResponseId;
use crate::domain::response::versioning::{self, VersionDecision, VersionRequest};
use crate::domain::response::{Response, ResponseError};
use crate::domain::review_map::ResponseMap;
use crate::ports::{Clock, ResponseRepository, VersionInsert};

pub struct VersionStore {
    responses: Arc<dyn ResponseRepository>,
    clock: Arc<dyn Clock>,
}

impl VersionStore {
    pub fn new(responses: Arc<dyn ResponseRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { responses, clock }
    }

    /// Returns the version an edit of `map` in `round` should target,
    /// creating one when none exists or when a new attempt follows a
    /// submitted version in a round that allows re-submission.
    ///
    /// No locking happens here. Concurrent creators converge on one version
    /// through the repository's conditional insert.
    pub async fn resolve_or_create(
        &self,
        map: &ResponseMap,
        round: Option<u32>,
        request: VersionRequest,
    ) -> Result<Response, ResponseError> {
        let versions = self.responses.find_by_map_and_round(map.id(), round).await?;

        let (ordinal, expected_latest) = match versioning::decide(&versions, request) {
            VersionDecision::UseExisting(current) => return Ok(current.clone()),
            VersionDecision::CreateFirst => (1, None),
            VersionDecision::CreateNext { ordinal, after } => (ordinal, Some(after)),
        };

        let candidate = Response::new_draft(ResponseId::new(), *map.id(), round, ordinal, self.clock.now());
        match self.responses.insert_version(&candidate, expected_latest).await? {
            VersionInsert::Inserted(created) => {
                tracing::debug!(
                    map_id = %map.id(),
                    response_id = %created.id(),
                    version = ordinal,
                    "created response version"
                );
                Ok(created)
            }
            VersionInsert::Superseded(winner) => {
                tracing::debug!(
                    map_id = %map.id(),
                    response_id = %winner.id(),
                    "concurrent creator won, using its version"
                );
                Ok(winner)
            }
        }
    }
}
