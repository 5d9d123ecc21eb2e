//! SaveDraftHandler - Command handler for autosaving a draft.

use std::sync::Arc;

use crate::application::services::{AnswerLedger, LockManager, ReviewAccess, ReviewContext};
use crate::domain::answer::{AnswerEntry, LedgerReport};
use crate::domain::foundation::{CommandMetadata, ResponseId, UserId};
use crate::domain::response::{Response, ResponseError};
use crate::ports::{Clock, ResponseRepository};

/// Command to save draft content.
#[derive(Debug, Clone)]
pub struct SaveDraftCommand {
    pub response_id: ResponseId,
    /// `None` leaves the comment as it is.
    pub additional_comment: Option<String>,
    pub answers: Vec<AnswerEntry>,
}

#[derive(Debug, Clone)]
pub struct SaveDraftResult {
    pub response: Response,
    pub report: LedgerReport,
}

pub struct SaveDraftHandler {
    responses: Arc<dyn ResponseRepository>,
    access: Arc<ReviewAccess>,
    locks: Arc<LockManager>,
    ledger: Arc<AnswerLedger>,
    clock: Arc<dyn Clock>,
}

impl SaveDraftHandler {
    pub fn new(
        responses: Arc<dyn ResponseRepository>,
        access: Arc<ReviewAccess>,
        locks: Arc<LockManager>,
        ledger: Arc<AnswerLedger>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            responses,
            access,
            locks,
            ledger,
            clock,
        }
    }

    pub async fn handle(&self, cmd: SaveDraftCommand, metadata: CommandMetadata) -> Result<SaveDraftResult, ResponseError> {
        let caller = &metadata.user_id;

        // 1. Load and authorize
        let mut response = self
            .responses
            .find_by_id(&cmd.response_id)
            .await?
            .ok_or_else(|| ResponseError::response_not_found(cmd.response_id))?;
        let ctx = self.access.authorize(response.map_id(), caller).await?;

        // 2. Submitted content is frozen, then the lock must be ours
        response.ensure_editable()?;
        ensure_lock_held(&self.locks, &ctx, &response, caller).await?;

        // 3. Comment first so a validation failure writes nothing; a
        //    submission that landed since the load wins
        if let Some(comment) = cmd.additional_comment {
            response.edit_comment(comment, self.clock.now())?;
            if !self.responses.save_comment(&response).await? {
                return Err(ResponseError::AlreadySubmitted);
            }
        }

        // 4. Answers, independently per question
        let report = self.ledger.upsert_answers(*response.id(), cmd.answers).await;

        Ok(SaveDraftResult { response, report })
    }
}

/// Fails with `LockNotHeld` when the map is team-reviewed and `caller` does
/// not hold a live lock on `response`.
pub(super) async fn ensure_lock_held(
    locks: &LockManager,
    ctx: &ReviewContext,
    response: &Response,
    caller: &UserId,
) -> Result<(), ResponseError> {
    if ctx.requires_lock() && !locks.is_held_by(response.id(), caller).await? {
        tracing::info!(response_id = %response.id(), user_id = %caller, "mutation without edit lock rejected");
        return Err(ResponseError::LockNotHeld);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::response::testing::{Fixture, ScriptedResponses, LOCK_TIMEOUT};
    use crate::application::handlers::response::OpenForEditCommand;
    use crate::domain::foundation::MapId;
    use crate::domain::response::MAX_COMMENT_LENGTH;
    use crate::ports::AnswerRepository;

    async fn open(fixture: &Fixture, map_id: MapId, who: &str) -> Response {
        fixture
            .open_handler()
            .handle(
                OpenForEditCommand {
                    map_id,
                    round: Some(1),
                    resubmission_allowed: false,
                    new_attempt: false,
                    question_ids: fixture.questions.clone(),
                },
                fixture.metadata(who),
            )
            .await
            .unwrap()
            .response
    }

    fn save(response: &Response, comment: &str, entries: Vec<AnswerEntry>) -> SaveDraftCommand {
        SaveDraftCommand {
            response_id: *response.id(),
            additional_comment: Some(comment.to_string()),
            answers: entries,
        }
    }

    #[tokio::test]
    async fn lock_holder_saves_comment_and_answers() {
        let fixture = Fixture::new();
        let map = fixture.team_map().await;
        let response = open(&fixture, map, "alice").await;
        let q = fixture.questions[0];

        let result = fixture
            .save_handler()
            .handle(
                save(&response, "solid work", vec![AnswerEntry::new(q, Some(4), "clear")]),
                fixture.metadata("alice"),
            )
            .await
            .unwrap();

        assert_eq!(result.response.additional_comment(), "solid work");
        assert!(result.report.is_complete());
        let stored = fixture.answers.find(response.id(), &q).await.unwrap().unwrap();
        assert_eq!(stored.score, Some(4));
    }

    #[tokio::test]
    async fn team_member_without_lock_is_rejected() {
        let fixture = Fixture::new();
        let map = fixture.team_map().await;
        let response = open(&fixture, map, "alice").await;

        let result = fixture
            .save_handler()
            .handle(save(&response, "sneaky", vec![]), fixture.metadata("bob"))
            .await;

        assert!(matches!(result, Err(ResponseError::LockNotHeld)));
        let stored = fixture.responses.find_by_id(response.id()).await.unwrap().unwrap();
        assert_eq!(stored.additional_comment(), "");
    }

    #[tokio::test]
    async fn expired_lock_no_longer_authorizes_saves() {
        let fixture = Fixture::new();
        let map = fixture.team_map().await;
        let response = open(&fixture, map, "alice").await;
        fixture.clock.advance(LOCK_TIMEOUT);

        let result = fixture
            .save_handler()
            .handle(save(&response, "late", vec![]), fixture.metadata("alice"))
            .await;

        assert!(matches!(result, Err(ResponseError::LockNotHeld)));
    }

    #[tokio::test]
    async fn submitted_response_reports_already_submitted_before_lock() {
        let fixture = Fixture::new();
        let map = fixture.team_map().await;
        let response = open(&fixture, map, "alice").await;
        fixture.responses.mark_submitted(&response).await.unwrap();

        // bob holds no lock; the submitted check still wins
        let result = fixture
            .save_handler()
            .handle(save(&response, "too late", vec![]), fixture.metadata("bob"))
            .await;

        assert!(matches!(result, Err(ResponseError::AlreadySubmitted)));
    }

    #[tokio::test]
    async fn save_from_stale_draft_cannot_touch_submitted_comment() {
        let fixture = Fixture::new();
        let map = fixture.individual_map("carol").await;
        let mut draft = open(&fixture, map, "carol").await;
        draft.edit_comment("final".to_string(), fixture.clock.now()).unwrap();
        fixture.responses.mark_submitted(&draft).await.unwrap();

        let stale = Arc::new(ScriptedResponses::stale(fixture.responses.clone(), draft.clone()));
        let result = fixture
            .save_handler_with(stale)
            .handle(save(&draft, "rewritten", vec![]), fixture.metadata("carol"))
            .await;

        assert!(matches!(result, Err(ResponseError::AlreadySubmitted)));
        let stored = fixture.responses.find_by_id(draft.id()).await.unwrap().unwrap();
        assert!(stored.is_submitted());
        assert_eq!(stored.additional_comment(), "final");
    }

    #[tokio::test]
    async fn individual_reviewer_saves_without_lock() {
        let fixture = Fixture::new();
        let map = fixture.individual_map("carol").await;
        let response = open(&fixture, map, "carol").await;

        let result = fixture
            .save_handler()
            .handle(save(&response, "fine", vec![]), fixture.metadata("carol"))
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn oversized_comment_writes_nothing() {
        let fixture = Fixture::new();
        let map = fixture.individual_map("carol").await;
        let response = open(&fixture, map, "carol").await;
        let q = fixture.questions[0];

        let result = fixture
            .save_handler()
            .handle(
                save(
                    &response,
                    &"x".repeat(MAX_COMMENT_LENGTH + 1),
                    vec![AnswerEntry::new(q, Some(5), "")],
                ),
                fixture.metadata("carol"),
            )
            .await;

        assert!(matches!(result, Err(ResponseError::ValidationFailed { .. })));
        let untouched = fixture.answers.find(response.id(), &q).await.unwrap().unwrap();
        assert_eq!(untouched.score, None);
    }

    #[tokio::test]
    async fn unknown_response_is_not_found() {
        let fixture = Fixture::new();
        let result = fixture
            .save_handler()
            .handle(
                SaveDraftCommand {
                    response_id: ResponseId::new(),
                    additional_comment: None,
                    answers: vec![],
                },
                fixture.metadata("alice"),
            )
            .await;
        assert!(matches!(result, Err(ResponseError::ResponseNotFound(_))));
    }
}
