//! Shared wiring for response handler tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::{
    DeleteResponseHandler, GetResponseHandler, OpenForEditHandler, ReleaseLockHandler, SaveDraftHandler,
    SubmitResponseHandler, ToggleVisibilityHandler,
};
use crate::adapters::clock::ManualClock;
use crate::adapters::events::InMemoryEventBus;
use crate::adapters::memory::{
    InMemoryAnswerRepository, InMemoryLockStore, InMemoryMapDirectory, InMemoryResponseRepository,
};
use crate::application::services::{
    AnswerLedger, DeviationNotifier, LockManager, ReviewAccess, VersionStore,
};
use crate::domain::answer::Answer;
use crate::domain::deviation::DeviationAssessment;
use crate::domain::foundation::{
    AssignmentId, CommandMetadata, DomainError, ErrorCode, MapId, QuestionId, ResponseId, RevieweeId,
    ReviewerId, TeamId, Timestamp, UserId,
};
use crate::domain::lock::{EditLock, LockAcquisition};
use crate::domain::response::{Response, Visibility};
use crate::domain::review_map::{MapKind, ResponseMap, ReviewerOfRecord};
use crate::ports::{DeviationScorer, LockStore, ResponseRepository, VersionInsert};

pub const LOCK_TIMEOUT: Duration = Duration::from_secs(1200);

/// Reports a fixed assessment and counts how often it was consulted.
pub struct CountingScorer {
    pub calls: AtomicUsize,
    pub assessment: Option<DeviationAssessment>,
}

impl CountingScorer {
    pub fn significant() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            assessment: Some(DeviationAssessment {
                submitted_score: 1.0,
                reference_score: 4.5,
                delta: -3.5,
                significant: true,
            }),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeviationScorer for CountingScorer {
    async fn assess(
        &self,
        _map: &ResponseMap,
        _response: &Response,
        _answers: &[Answer],
    ) -> Result<Option<DeviationAssessment>, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.assessment)
    }
}

/// In-memory responses with scripted faults.
///
/// A `snapshot` is served from `find_by_id` in place of the stored row, the
/// way a caller that loaded the response before a concurrent write sees it.
pub struct ScriptedResponses {
    inner: Arc<InMemoryResponseRepository>,
    snapshot: Option<Response>,
    fail_deletes: bool,
}

impl ScriptedResponses {
    pub fn stale(inner: Arc<InMemoryResponseRepository>, snapshot: Response) -> Self {
        Self {
            inner,
            snapshot: Some(snapshot),
            fail_deletes: false,
        }
    }

    pub fn undeletable(inner: Arc<InMemoryResponseRepository>) -> Self {
        Self {
            inner,
            snapshot: None,
            fail_deletes: true,
        }
    }
}

#[async_trait]
impl ResponseRepository for ScriptedResponses {
    async fn insert_version(
        &self,
        candidate: &Response,
        expected_latest: Option<ResponseId>,
    ) -> Result<VersionInsert, DomainError> {
        self.inner.insert_version(candidate, expected_latest).await
    }

    async fn save_comment(&self, response: &Response) -> Result<bool, DomainError> {
        self.inner.save_comment(response).await
    }

    async fn mark_submitted(&self, response: &Response) -> Result<bool, DomainError> {
        self.inner.mark_submitted(response).await
    }

    async fn set_visibility(
        &self,
        id: &ResponseId,
        visibility: Visibility,
        updated_at: Timestamp,
    ) -> Result<(), DomainError> {
        self.inner.set_visibility(id, visibility, updated_at).await
    }

    async fn find_by_id(&self, id: &ResponseId) -> Result<Option<Response>, DomainError> {
        match &self.snapshot {
            Some(snapshot) if snapshot.id() == id => Ok(Some(snapshot.clone())),
            _ => self.inner.find_by_id(id).await,
        }
    }

    async fn find_by_map_and_round(
        &self,
        map_id: &MapId,
        round: Option<u32>,
    ) -> Result<Vec<Response>, DomainError> {
        self.inner.find_by_map_and_round(map_id, round).await
    }

    async fn delete(&self, id: &ResponseId) -> Result<(), DomainError> {
        if self.fail_deletes {
            return Err(DomainError::database("connection reset"));
        }
        self.inner.delete(id).await
    }
}

/// In-memory lock store whose `release` always fails.
pub struct UnreleasableLocks(pub Arc<InMemoryLockStore>);

#[async_trait]
impl LockStore for UnreleasableLocks {
    async fn try_acquire(
        &self,
        response_id: &ResponseId,
        holder: &UserId,
        now: Timestamp,
        timeout: Duration,
    ) -> Result<LockAcquisition, DomainError> {
        self.0.try_acquire(response_id, holder, now, timeout).await
    }

    async fn release(&self, _response_id: &ResponseId, _holder: &UserId) -> Result<bool, DomainError> {
        Err(DomainError::new(ErrorCode::CacheError, "lock store unavailable"))
    }

    async fn find(&self, response_id: &ResponseId) -> Result<Option<EditLock>, DomainError> {
        self.0.find(response_id).await
    }

    async fn remove(&self, response_id: &ResponseId) -> Result<(), DomainError> {
        self.0.remove(response_id).await
    }
}

pub struct Fixture {
    pub directory: Arc<InMemoryMapDirectory>,
    pub responses: Arc<InMemoryResponseRepository>,
    pub answers: Arc<InMemoryAnswerRepository>,
    pub locks: Arc<InMemoryLockStore>,
    pub bus: Arc<InMemoryEventBus>,
    pub clock: Arc<ManualClock>,
    pub scorer: Arc<CountingScorer>,
    pub questions: Vec<QuestionId>,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            directory: Arc::new(InMemoryMapDirectory::new()),
            responses: Arc::new(InMemoryResponseRepository::new()),
            answers: Arc::new(InMemoryAnswerRepository::new()),
            locks: Arc::new(InMemoryLockStore::new()),
            bus: Arc::new(InMemoryEventBus::new()),
            clock: Arc::new(ManualClock::new(Timestamp::from_unix_millis(1_700_000_000_000).unwrap())),
            scorer: Arc::new(CountingScorer::significant()),
            questions: vec![QuestionId::new(), QuestionId::new(), QuestionId::new()],
        }
    }

    pub fn user(&self, id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    pub fn metadata(&self, id: &str) -> CommandMetadata {
        CommandMetadata::new(self.user(id)).with_correlation_id(format!("test-{}", id))
    }

    /// Peer review by a team of alice and bob.
    pub async fn team_map(&self) -> MapId {
        let map = ResponseMap::new(
            MapId::new(),
            AssignmentId::new(),
            ReviewerId::new(),
            RevieweeId::new(),
            true,
            MapKind::Review,
        );
        let id = *map.id();
        self.directory
            .insert(
                map,
                ReviewerOfRecord::Team {
                    team_id: TeamId::new(),
                    members: vec![self.user("alice"), self.user("bob")],
                },
            )
            .await;
        id
    }

    pub async fn individual_map(&self, reviewer: &str) -> MapId {
        self.individual_map_of_kind(reviewer, MapKind::Review).await
    }

    pub async fn individual_map_of_kind(&self, reviewer: &str, kind: MapKind) -> MapId {
        let map = ResponseMap::new(
            MapId::new(),
            AssignmentId::new(),
            ReviewerId::new(),
            RevieweeId::new(),
            false,
            kind,
        );
        let id = *map.id();
        self.directory
            .insert(
                map,
                ReviewerOfRecord::Individual {
                    user_id: self.user(reviewer),
                },
            )
            .await;
        id
    }

    fn access(&self) -> Arc<ReviewAccess> {
        Arc::new(ReviewAccess::new(self.directory.clone(), self.directory.clone()))
    }

    fn lock_manager(&self) -> Arc<LockManager> {
        self.lock_manager_over(self.locks.clone())
    }

    fn lock_manager_over(&self, store: Arc<dyn LockStore>) -> Arc<LockManager> {
        Arc::new(LockManager::new(store, self.clock.clone()).with_timeout(LOCK_TIMEOUT))
    }

    fn ledger(&self) -> Arc<AnswerLedger> {
        Arc::new(AnswerLedger::new(self.answers.clone()))
    }

    pub fn open_handler(&self) -> OpenForEditHandler {
        OpenForEditHandler::new(
            self.access(),
            Arc::new(VersionStore::new(self.responses.clone(), self.clock.clone())),
            self.lock_manager(),
            self.ledger(),
        )
    }

    pub fn save_handler(&self) -> SaveDraftHandler {
        self.save_handler_with(self.responses.clone())
    }

    pub fn save_handler_with(&self, responses: Arc<dyn ResponseRepository>) -> SaveDraftHandler {
        SaveDraftHandler::new(
            responses,
            self.access(),
            self.lock_manager(),
            self.ledger(),
            self.clock.clone(),
        )
    }

    pub fn submit_handler(&self) -> SubmitResponseHandler {
        self.submit_handler_with(self.responses.clone(), self.locks.clone())
    }

    pub fn submit_handler_with(
        &self,
        responses: Arc<dyn ResponseRepository>,
        locks: Arc<dyn LockStore>,
    ) -> SubmitResponseHandler {
        SubmitResponseHandler::new(
            responses,
            self.access(),
            self.lock_manager_over(locks),
            self.ledger(),
            Arc::new(DeviationNotifier::new(
                self.scorer.clone(),
                self.bus.clone(),
                self.clock.clone(),
            )),
            self.bus.clone(),
            self.clock.clone(),
        )
    }

    pub fn release_handler(&self) -> ReleaseLockHandler {
        ReleaseLockHandler::new(self.lock_manager())
    }

    pub fn delete_handler(&self) -> DeleteResponseHandler {
        self.delete_handler_with(self.responses.clone())
    }

    pub fn delete_handler_with(&self, responses: Arc<dyn ResponseRepository>) -> DeleteResponseHandler {
        DeleteResponseHandler::new(
            responses,
            self.access(),
            self.lock_manager(),
            self.ledger(),
            self.bus.clone(),
            self.clock.clone(),
        )
    }

    pub fn visibility_handler(&self) -> ToggleVisibilityHandler {
        self.visibility_handler_with(self.responses.clone())
    }

    pub fn visibility_handler_with(&self, responses: Arc<dyn ResponseRepository>) -> ToggleVisibilityHandler {
        ToggleVisibilityHandler::new(responses, self.access(), self.clock.clone())
    }

    pub fn get_handler(&self) -> GetResponseHandler {
        GetResponseHandler::new(self.responses.clone(), self.access(), self.lock_manager(), self.ledger())
    }
}
