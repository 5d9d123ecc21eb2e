//! DeleteResponseHandler - Physically removes a response version.
//!
//! Team reviews take the edit lock first, so a teammate mid-edit blocks the
//! delete. The version row is removed before its answers and lock record, so
//! a failed delete leaves the version intact.

use std::sync::Arc;

use crate::application::services::{AnswerLedger, LockManager, ReviewAccess};
use crate::domain::foundation::{CommandMetadata, EventId, ResponseId, SerializableDomainEvent};
use crate::domain::lock::LockAcquisition;
use crate::domain::response::{ResponseDeleted, ResponseError};
use crate::ports::{Clock, EventPublisher, ResponseRepository};

#[derive(Debug, Clone)]
pub struct DeleteResponseCommand {
    pub response_id: ResponseId,
}

#[derive(Debug, Clone)]
pub struct DeleteResponseResult {
    pub event: ResponseDeleted,
}

pub struct DeleteResponseHandler {
    responses: Arc<dyn ResponseRepository>,
    access: Arc<ReviewAccess>,
    locks: Arc<LockManager>,
    ledger: Arc<AnswerLedger>,
    publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
}

impl DeleteResponseHandler {
    pub fn new(
        responses: Arc<dyn ResponseRepository>,
        access: Arc<ReviewAccess>,
        locks: Arc<LockManager>,
        ledger: Arc<AnswerLedger>,
        publisher: Arc<dyn EventPublisher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            responses,
            access,
            locks,
            ledger,
            publisher,
            clock,
        }
    }

    pub async fn handle(
        &self,
        cmd: DeleteResponseCommand,
        metadata: CommandMetadata,
    ) -> Result<DeleteResponseResult, ResponseError> {
        let caller = &metadata.user_id;

        // 1. Load and authorize
        let response = self
            .responses
            .find_by_id(&cmd.response_id)
            .await?
            .ok_or_else(|| ResponseError::response_not_found(cmd.response_id))?;
        let ctx = self.access.authorize(response.map_id(), caller).await?;

        // 2. A teammate's live lock blocks deletion
        if ctx.requires_lock() {
            if let LockAcquisition::Denied { holder, expires_at } = self.locks.acquire(response.id(), caller).await? {
                return Err(ResponseError::denied(holder, expires_at));
            }
        }

        // 3. The version row goes first; answers and the lock record are
        //    unreachable without it
        self.responses.delete(response.id()).await?;
        if let Err(e) = self.ledger.discard(response.id()).await {
            tracing::warn!(response_id = %response.id(), error = %e, "answers of deleted response left behind");
        }
        if let Err(e) = self.locks.forget(response.id()).await {
            tracing::warn!(response_id = %response.id(), error = %e, "lock record of deleted response left behind");
        }

        tracing::info!(response_id = %response.id(), user_id = %caller, "response deleted");

        // 4. Publish (best-effort)
        let event = ResponseDeleted {
            event_id: EventId::new(),
            response_id: *response.id(),
            map_id: *response.map_id(),
            deleted_by: caller.clone(),
            deleted_at: self.clock.now(),
        };
        match event.to_envelope() {
            Ok(envelope) => {
                let envelope = envelope
                    .with_correlation_id(metadata.correlation_id())
                    .with_user_id(caller.to_string());
                if let Err(e) = self.publisher.publish(envelope).await {
                    tracing::warn!(response_id = %response.id(), error = %e, "deletion event not published");
                }
            }
            Err(e) => tracing::warn!(response_id = %response.id(), error = %e, "could not encode deletion event"),
        }

        Ok(DeleteResponseResult { event })
    }
}
