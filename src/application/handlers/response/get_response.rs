//! GetResponseHandler - Query handler for viewing a response.

use std::sync::Arc;

use crate::application::services::{AnswerLedger, LockManager, ReviewAccess};
use crate::domain::answer::Answer;
use crate::domain::foundation::{CommandMetadata, ResponseId};
use crate::domain::lock::EditLock;
use crate::domain::response::{Response, ResponseError};
use crate::ports::ResponseRepository;

#[derive(Debug, Clone)]
pub struct GetResponseQuery {
    pub response_id: ResponseId,
}

/// A response with its answers (ordered by question id) and live lock.
#[derive(Debug, Clone)]
pub struct ResponseView {
    pub response: Response,
    pub answers: Vec<Answer>,
    pub lock: Option<EditLock>,
}

pub struct GetResponseHandler {
    responses: Arc<dyn ResponseRepository>,
    access: Arc<ReviewAccess>,
    locks: Arc<LockManager>,
    ledger: Arc<AnswerLedger>,
}

impl GetResponseHandler {
    pub fn new(
        responses: Arc<dyn ResponseRepository>,
        access: Arc<ReviewAccess>,
        locks: Arc<LockManager>,
        ledger: Arc<AnswerLedger>,
    ) -> Self {
        Self {
            responses,
            access,
            locks,
            ledger,
        }
    }

    pub async fn handle(&self, query: GetResponseQuery, metadata: CommandMetadata) -> Result<ResponseView, ResponseError> {
        let response = self
            .responses
            .find_by_id(&query.response_id)
            .await?
            .ok_or_else(|| ResponseError::response_not_found(query.response_id))?;
        self.access.authorize(response.map_id(), &metadata.user_id).await?;

        let answers = self.ledger.answers_for(response.id()).await?;
        let lock = self.locks.current(response.id()).await?;

        Ok(ResponseView {
            response,
            answers,
            lock,
        })
    }
}
