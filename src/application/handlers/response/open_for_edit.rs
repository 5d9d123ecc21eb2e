//! OpenForEditHandler - Resolves the version to edit and takes the edit lock.

use std::sync::Arc;

use crate::application::services::{AnswerLedger, LockManager, ReviewAccess, VersionStore};
use crate::domain::answer::LedgerReport;
use crate::domain::foundation::{CommandMetadata, MapId, QuestionId};
use crate::domain::lock::{EditLock, LockAcquisition};
use crate::domain::response::{Response, ResponseError, VersionRequest};

/// Command to open a response for editing.
#[derive(Debug, Clone)]
pub struct OpenForEditCommand {
    pub map_id: MapId,
    pub round: Option<u32>,
    /// The round permits more than one submission.
    pub resubmission_allowed: bool,
    /// Start a fresh version if the current one was already submitted.
    pub new_attempt: bool,
    /// Rubric questions to initialize with blank answers.
    pub question_ids: Vec<QuestionId>,
}

/// Lock situation of the opened response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockState {
    /// Individually reviewed; nothing to lock.
    NotRequired,
    /// The caller now holds (or refreshed) the lock.
    Held(EditLock),
    /// The version is submitted; editing is closed and no lock was taken.
    EditingClosed,
}

#[derive(Debug, Clone)]
pub struct OpenForEditResult {
    pub response: Response,
    pub lock_state: LockState,
    /// Blank-answer initialization, when the version is editable.
    pub initialized: Option<LedgerReport>,
}

pub struct OpenForEditHandler {
    access: Arc<ReviewAccess>,
    versions: Arc<VersionStore>,
    locks: Arc<LockManager>,
    ledger: Arc<AnswerLedger>,
}

impl OpenForEditHandler {
    pub fn new(
        access: Arc<ReviewAccess>,
        versions: Arc<VersionStore>,
        locks: Arc<LockManager>,
        ledger: Arc<AnswerLedger>,
    ) -> Self {
        Self {
            access,
            versions,
            locks,
            ledger,
        }
    }

    pub async fn handle(
        &self,
        cmd: OpenForEditCommand,
        metadata: CommandMetadata,
    ) -> Result<OpenForEditResult, ResponseError> {
        let caller = &metadata.user_id;

        // 1. Map must exist and the caller must be on the reviewer of record
        let ctx = self.access.authorize(&cmd.map_id, caller).await?;

        // 2. Resolve or create the target version
        let request = VersionRequest {
            resubmission_allowed: cmd.resubmission_allowed,
            new_attempt: cmd.new_attempt,
        };
        let response = self.versions.resolve_or_create(&ctx.map, cmd.round, request).await?;

        // 3. Submitted versions are read-only; no lock is needed
        if response.is_submitted() {
            return Ok(OpenForEditResult {
                response,
                lock_state: LockState::EditingClosed,
                initialized: None,
            });
        }

        // 4. Team reviews serialize editing through the lock
        let lock_state = if ctx.requires_lock() {
            match self.locks.acquire(response.id(), caller).await? {
                LockAcquisition::Granted(lock) => LockState::Held(lock),
                LockAcquisition::Denied { holder, expires_at } => {
                    tracing::info!(
                        response_id = %response.id(),
                        user_id = %caller,
                        held_by = %holder,
                        correlation_id = %metadata.correlation_id(),
                        "open for edit denied"
                    );
                    return Err(ResponseError::denied(holder, expires_at));
                }
            }
        } else {
            LockState::NotRequired
        };

        // 5. Blank rows for unanswered questions
        let initialized = self.ledger.initialize_blank(*response.id(), &cmd.question_ids).await;

        Ok(OpenForEditResult {
            response,
            lock_state,
            initialized: Some(initialized),
        })
    }
}
