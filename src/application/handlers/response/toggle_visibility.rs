//! ToggleVisibilityHandler - Changes who can see a response.
//!
//! Visibility is metadata rather than content: it can change after
//! submission and needs no edit lock.

use std::sync::Arc;

use crate::application::services::ReviewAccess;
use crate::domain::foundation::{CommandMetadata, ResponseId};
use crate::domain::response::{Response, ResponseError, Visibility};
use crate::ports::{Clock, ResponseRepository};

#[derive(Debug, Clone)]
pub struct ToggleVisibilityCommand {
    pub response_id: ResponseId,
    pub visibility: Visibility,
}

#[derive(Debug, Clone)]
pub struct ToggleVisibilityResult {
    pub response: Response,
    pub previous: Visibility,
}

pub struct ToggleVisibilityHandler {
    responses: Arc<dyn ResponseRepository>,
    access: Arc<ReviewAccess>,
    clock: Arc<dyn Clock>,
}

impl ToggleVisibilityHandler {
    pub fn new(responses: Arc<dyn ResponseRepository>, access: Arc<ReviewAccess>, clock: Arc<dyn Clock>) -> Self {
        Self {
            responses,
            access,
            clock,
        }
    }

    pub async fn handle(
        &self,
        cmd: ToggleVisibilityCommand,
        metadata: CommandMetadata,
    ) -> Result<ToggleVisibilityResult, ResponseError> {
        let mut response = self
            .responses
            .find_by_id(&cmd.response_id)
            .await?
            .ok_or_else(|| ResponseError::response_not_found(cmd.response_id))?;
        self.access.authorize(response.map_id(), &metadata.user_id).await?;

        let now = self.clock.now();
        let previous = response.set_visibility(cmd.visibility, now);
        if previous != cmd.visibility {
            self.responses.set_visibility(response.id(), cmd.visibility, now).await?;
            tracing::debug!(
                response_id = %response.id(),
                from = %previous,
                to = %cmd.visibility,
                "visibility changed"
            );
        }

        Ok(ToggleVisibilityResult { response, previous })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::response::testing::{Fixture, ScriptedResponses};
    use crate::application::handlers::response::{OpenForEditCommand, SubmitResponseCommand};

    #[tokio::test]
    async fn submitted_response_can_be_published_without_lock() {
        let fixture = Fixture::new();
        let map = fixture.team_map().await;
        let response = fixture
            .open_handler()
            .handle(
                OpenForEditCommand {
                    map_id: map,
                    round: None,
                    resubmission_allowed: false,
                    new_attempt: false,
                    question_ids: vec![],
                },
                fixture.metadata("alice"),
            )
            .await
            .unwrap()
            .response;
        fixture.responses.mark_submitted(&response).await.unwrap();

        // bob holds no lock
        let result = fixture
            .visibility_handler()
            .handle(
                ToggleVisibilityCommand {
                    response_id: *response.id(),
                    visibility: Visibility::Published,
                },
                fixture.metadata("bob"),
            )
            .await
            .unwrap();

        assert_eq!(result.previous, Visibility::Private);
        let stored = fixture.responses.find_by_id(response.id()).await.unwrap().unwrap();
        assert_eq!(stored.visibility(), Visibility::Published);
        assert!(stored.is_submitted());
    }

    #[tokio::test]
    async fn outsider_cannot_change_visibility() {
        let fixture = Fixture::new();
        let map = fixture.individual_map("carol").await;
        let response = fixture
            .open_handler()
            .handle(
                OpenForEditCommand {
                    map_id: map,
                    round: None,
                    resubmission_allowed: false,
                    new_attempt: false,
                    question_ids: vec![],
                },
                fixture.metadata("carol"),
            )
            .await
            .unwrap()
            .response;

        let result = fixture
            .visibility_handler()
            .handle(
                ToggleVisibilityCommand {
                    response_id: *response.id(),
                    visibility: Visibility::Public,
                },
                fixture.metadata("mallory"),
            )
            .await;

        assert!(matches!(result, Err(ResponseError::Forbidden)));
    }

    #[tokio::test]
    async fn toggle_from_stale_draft_leaves_submission_intact() {
        let fixture = Fixture::new();
        let map = fixture.team_map().await;
        let draft = fixture
            .open_handler()
            .handle(
                OpenForEditCommand {
                    map_id: map,
                    round: None,
                    resubmission_allowed: false,
                    new_attempt: false,
                    question_ids: vec![],
                },
                fixture.metadata("alice"),
            )
            .await
            .unwrap()
            .response;
        let submit = || SubmitResponseCommand {
            response_id: *draft.id(),
            additional_comment: Some("final".to_string()),
            answers: vec![],
        };
        fixture
            .submit_handler()
            .handle(submit(), fixture.metadata("alice"))
            .await
            .unwrap();

        // bob loaded the draft before alice's submit landed
        let stale = Arc::new(ScriptedResponses::stale(fixture.responses.clone(), draft.clone()));
        fixture
            .visibility_handler_with(stale)
            .handle(
                ToggleVisibilityCommand {
                    response_id: *draft.id(),
                    visibility: Visibility::Published,
                },
                fixture.metadata("bob"),
            )
            .await
            .unwrap();

        let stored = fixture.responses.find_by_id(draft.id()).await.unwrap().unwrap();
        assert!(stored.is_submitted());
        assert_eq!(stored.additional_comment(), "final");
        assert_eq!(stored.visibility(), Visibility::Published);

        let again = fixture
            .submit_handler()
            .handle(submit(), fixture.metadata("alice"))
            .await
            .unwrap();
        assert!(!again.newly_submitted);
        assert_eq!(fixture.bus.events_of_type("review.deviation_detected.v1").len(), 1);
    }
}
