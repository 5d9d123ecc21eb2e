//! SubmitResponseHandler - Saves final content and submits the response.
//!
//! The stored flag flips through a compare-and-set, so of any number of
//! racing submits exactly one reports `newly_submitted` and triggers the
//! deviation check. Effects after that write are best-effort.

use std::sync::Arc;

use super::save_draft::ensure_lock_held;
use crate::application::services::{AnswerLedger, DeviationNotifier, LockManager, ReviewAccess};
use crate::domain::answer::{AnswerEntry, LedgerReport};
use crate::domain::deviation::ReviewDeviationDetected;
use crate::domain::foundation::{CommandMetadata, EventId, ResponseId, SerializableDomainEvent};
use crate::domain::response::{Response, ResponseError, ResponseSubmitted, SubmitTransition};
use crate::domain::review_map::MapKind;
use crate::ports::{Clock, EventPublisher, ResponseRepository};

#[derive(Debug, Clone)]
pub struct SubmitResponseCommand {
    pub response_id: ResponseId,
    /// `None` leaves the comment as it is.
    pub additional_comment: Option<String>,
    pub answers: Vec<AnswerEntry>,
}

#[derive(Debug, Clone)]
pub struct SubmitResponseResult {
    pub response: Response,
    /// Always true on success; an earlier submission is re-confirmed.
    pub submitted: bool,
    /// This call performed the Draft -> Submitted transition.
    pub newly_submitted: bool,
    pub report: LedgerReport,
    pub deviation: Option<ReviewDeviationDetected>,
    /// Set when a deviation was detected but could not be delivered.
    pub delivery_error: Option<ResponseError>,
}

impl SubmitResponseResult {
    /// An earlier submission stands; nothing is announced or evaluated.
    fn confirmed(response: Response, report: LedgerReport) -> Self {
        Self {
            response,
            submitted: true,
            newly_submitted: false,
            report,
            deviation: None,
            delivery_error: None,
        }
    }
}

pub struct SubmitResponseHandler {
    responses: Arc<dyn ResponseRepository>,
    access: Arc<ReviewAccess>,
    locks: Arc<LockManager>,
    ledger: Arc<AnswerLedger>,
    notifier: Arc<DeviationNotifier>,
    publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
}

impl SubmitResponseHandler {
    pub fn new(
        responses: Arc<dyn ResponseRepository>,
        access: Arc<ReviewAccess>,
        locks: Arc<LockManager>,
        ledger: Arc<AnswerLedger>,
        notifier: Arc<DeviationNotifier>,
        publisher: Arc<dyn EventPublisher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            responses,
            access,
            locks,
            ledger,
            notifier,
            publisher,
            clock,
        }
    }

    pub async fn handle(
        &self,
        cmd: SubmitResponseCommand,
        metadata: CommandMetadata,
    ) -> Result<SubmitResponseResult, ResponseError> {
        let caller = &metadata.user_id;

        // 1. Load and authorize
        let mut response = self
            .responses
            .find_by_id(&cmd.response_id)
            .await?
            .ok_or_else(|| ResponseError::response_not_found(cmd.response_id))?;
        let ctx = self.access.authorize(response.map_id(), caller).await?;

        // 2. Re-submitting re-confirms the state and changes nothing
        if response.is_submitted() {
            return Ok(SubmitResponseResult::confirmed(response, LedgerReport::default()));
        }

        // 3. Team reviews need the lock
        ensure_lock_held(&self.locks, &ctx, &response, caller).await?;

        // 4. Final content
        let now = self.clock.now();
        if let Some(comment) = cmd.additional_comment {
            response.edit_comment(comment, now)?;
        }
        let report = self.ledger.upsert_answers(*response.id(), cmd.answers).await;

        // 5. Draft -> Submitted; only the caller whose write flips the stored
        //    flag goes on to announce and evaluate
        let won = match response.submit(now) {
            SubmitTransition::Submitted => self.responses.mark_submitted(&response).await?,
            SubmitTransition::AlreadySubmitted => false,
        };
        if !won {
            tracing::debug!(response_id = %response.id(), user_id = %caller, "submission already recorded");
            let stored = self
                .responses
                .find_by_id(response.id())
                .await?
                .ok_or_else(|| ResponseError::response_not_found(*response.id()))?;
            return Ok(SubmitResponseResult::confirmed(stored, report));
        }
        tracing::info!(
            response_id = %response.id(),
            map_id = %ctx.map.id(),
            user_id = %caller,
            failed_answers = report.failed.len(),
            "response submitted"
        );

        // 6. Publish (best-effort)
        self.announce(ctx.map.kind(), &response, &metadata).await;

        // 7. Deviation check on the edge this call performed
        let answers = match self.ledger.answers_for(response.id()).await {
            Ok(answers) => answers,
            Err(e) => {
                tracing::warn!(response_id = %response.id(), error = %e, "could not load answers for deviation check");
                Vec::new()
            }
        };
        let deviation = self
            .notifier
            .evaluate(&ctx.map, &response, &answers, false, &metadata)
            .await;

        // 8. Release the lock; it lapses on its own if this fails
        if ctx.requires_lock() {
            if let Err(e) = self.locks.release(response.id(), caller).await {
                tracing::warn!(response_id = %response.id(), error = %e, "edit lock not released after submit");
            }
        }

        Ok(SubmitResponseResult {
            response,
            submitted: true,
            newly_submitted: true,
            report,
            deviation: deviation.event,
            delivery_error: deviation.delivery_error,
        })
    }

    async fn announce(&self, kind: MapKind, response: &Response, metadata: &CommandMetadata) {
        let event = ResponseSubmitted {
            event_id: EventId::new(),
            response_id: *response.id(),
            map_id: *response.map_id(),
            map_kind: kind,
            round: response.round(),
            submitted_by: metadata.user_id.clone(),
            submitted_at: *response.updated_at(),
        };

        let envelope = match event.to_envelope() {
            Ok(envelope) => envelope
                .with_correlation_id(metadata.correlation_id())
                .with_user_id(metadata.user_id.to_string()),
            Err(e) => {
                tracing::warn!(response_id = %response.id(), error = %e, "could not encode submission event");
                return;
            }
        };

        if let Err(e) = self.publisher.publish(envelope).await {
            tracing::warn!(response_id = %response.id(), error = %e, "submission event not published");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::response::testing::{Fixture, ScriptedResponses, UnreleasableLocks};
    use crate::application::handlers::response::{OpenForEditCommand, SaveDraftCommand};
    use crate::domain::foundation::MapId;
    use crate::ports::{AnswerRepository, LockStore};

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

    fn submit(response: &Response, fixture: &Fixture) -> SubmitResponseCommand {
        SubmitResponseCommand {
            response_id: *response.id(),
            additional_comment: Some("final".to_string()),
            answers: fixture
                .questions
                .iter()
                .map(|q| AnswerEntry::new(*q, Some(1), "weak"))
                .collect(),
        }
    }

    #[tokio::test]
    async fn submits_draft_and_releases_lock() {
        let fixture = Fixture::new();
        let map = fixture.team_map().await;
        let response = open(&fixture, map, "alice").await;

        let result = fixture
            .submit_handler()
            .handle(submit(&response, &fixture), fixture.metadata("alice"))
            .await
            .unwrap();

        assert!(result.submitted);
        assert!(result.newly_submitted);
        assert!(result.response.is_submitted());
        assert_eq!(result.response.additional_comment(), "final");
        assert!(fixture.locks.find(response.id()).await.unwrap().is_none());
        let answers = fixture.answers.find_by_response(response.id()).await.unwrap();
        assert!(answers.iter().all(|a| a.score == Some(1)));
    }

    #[tokio::test]
    async fn publishes_submission_and_deviation_once() {
        let fixture = Fixture::new();
        let map = fixture.team_map().await;
        let response = open(&fixture, map, "alice").await;
        let handler = fixture.submit_handler();

        let first = handler
            .handle(submit(&response, &fixture), fixture.metadata("alice"))
            .await
            .unwrap();
        let second = handler
            .handle(submit(&response, &fixture), fixture.metadata("alice"))
            .await
            .unwrap();

        assert!(first.deviation.is_some());
        assert!(second.submitted);
        assert!(!second.newly_submitted);
        assert!(second.deviation.is_none());
        assert_eq!(fixture.scorer.calls(), 1);
        assert_eq!(fixture.bus.events_of_type("review.deviation_detected.v1").len(), 1);
        assert_eq!(fixture.bus.events_of_type("response.submitted.v1").len(), 1);
    }

    #[tokio::test]
    async fn resubmit_does_not_touch_content() {
        let fixture = Fixture::new();
        let map = fixture.individual_map("carol").await;
        let response = open(&fixture, map, "carol").await;
        let handler = fixture.submit_handler();
        handler
            .handle(submit(&response, &fixture), fixture.metadata("carol"))
            .await
            .unwrap();

        let mut rewrite = submit(&response, &fixture);
        rewrite.additional_comment = Some("changed my mind".to_string());
        let again = handler.handle(rewrite, fixture.metadata("carol")).await.unwrap();

        assert_eq!(again.response.additional_comment(), "final");
    }

    #[tokio::test]
    async fn save_after_submit_is_already_submitted() {
        let fixture = Fixture::new();
        let map = fixture.individual_map("carol").await;
        let response = open(&fixture, map, "carol").await;
        fixture
            .submit_handler()
            .handle(submit(&response, &fixture), fixture.metadata("carol"))
            .await
            .unwrap();

        let result = fixture
            .save_handler()
            .handle(
                SaveDraftCommand {
                    response_id: *response.id(),
                    additional_comment: Some("edit".to_string()),
                    answers: vec![],
                },
                fixture.metadata("carol"),
            )
            .await;

        assert!(matches!(result, Err(ResponseError::AlreadySubmitted)));
        let stored = fixture.responses.find_by_id(response.id()).await.unwrap().unwrap();
        assert!(stored.is_submitted());
        assert_eq!(stored.additional_comment(), "final");
    }

    #[tokio::test]
    async fn team_member_without_lock_cannot_submit() {
        let fixture = Fixture::new();
        let map = fixture.team_map().await;
        let response = open(&fixture, map, "alice").await;

        let result = fixture
            .submit_handler()
            .handle(submit(&response, &fixture), fixture.metadata("bob"))
            .await;

        assert!(matches!(result, Err(ResponseError::LockNotHeld)));
        let stored = fixture.responses.find_by_id(response.id()).await.unwrap().unwrap();
        assert!(!stored.is_submitted());
        assert_eq!(fixture.scorer.calls(), 0);
    }

    #[tokio::test]
    async fn self_review_submission_skips_deviation_check() {
        let fixture = Fixture::new();
        let map = fixture.individual_map_of_kind("carol", MapKind::SelfReview).await;
        let response = open(&fixture, map, "carol").await;

        let result = fixture
            .submit_handler()
            .handle(submit(&response, &fixture), fixture.metadata("carol"))
            .await
            .unwrap();

        assert!(result.newly_submitted);
        assert!(result.deviation.is_none());
        assert_eq!(fixture.scorer.calls(), 0);
    }

    #[tokio::test]
    async fn submit_from_stale_draft_is_a_confirmation() {
        let fixture = Fixture::new();
        let map = fixture.individual_map("carol").await;
        let draft = open(&fixture, map, "carol").await;
        fixture
            .submit_handler()
            .handle(submit(&draft, &fixture), fixture.metadata("carol"))
            .await
            .unwrap();

        // A second request that loaded the response before the first landed
        let stale = Arc::new(ScriptedResponses::stale(fixture.responses.clone(), draft.clone()));
        let mut late = submit(&draft, &fixture);
        late.additional_comment = Some("second thoughts".to_string());
        let result = fixture
            .submit_handler_with(stale, fixture.locks.clone())
            .handle(late, fixture.metadata("carol"))
            .await
            .unwrap();

        assert!(result.submitted);
        assert!(!result.newly_submitted);
        assert!(result.deviation.is_none());
        assert_eq!(result.response.additional_comment(), "final");
        assert_eq!(fixture.scorer.calls(), 1);
        assert_eq!(fixture.bus.events_of_type("review.deviation_detected.v1").len(), 1);
        assert_eq!(fixture.bus.events_of_type("response.submitted.v1").len(), 1);
    }

    #[tokio::test]
    async fn racing_submits_notify_once() {
        let fixture = Fixture::new();
        let map = fixture.individual_map("carol").await;
        let draft = open(&fixture, map, "carol").await;
        let handler = fixture.submit_handler();

        let (first, second) = tokio::join!(
            handler.handle(submit(&draft, &fixture), fixture.metadata("carol")),
            handler.handle(submit(&draft, &fixture), fixture.metadata("carol")),
        );
        let outcomes = [first.unwrap(), second.unwrap()];

        assert_eq!(outcomes.iter().filter(|r| r.newly_submitted).count(), 1);
        assert!(outcomes.iter().all(|r| r.submitted));
        assert_eq!(fixture.scorer.calls(), 1);
        assert_eq!(fixture.bus.events_for_aggregate(&draft.id().to_string()).len(), 2);
    }

    #[tokio::test]
    async fn lock_release_failure_keeps_the_submission() {
        let fixture = Fixture::new();
        let map = fixture.team_map().await;
        let response = open(&fixture, map, "alice").await;
        let locks = Arc::new(UnreleasableLocks(fixture.locks.clone()));

        let result = fixture
            .submit_handler_with(fixture.responses.clone(), locks)
            .handle(submit(&response, &fixture), fixture.metadata("alice"))
            .await
            .unwrap();

        assert!(result.newly_submitted);
        assert!(result.deviation.is_some());
        let stored = fixture.responses.find_by_id(response.id()).await.unwrap().unwrap();
        assert!(stored.is_submitted());
    }
}
