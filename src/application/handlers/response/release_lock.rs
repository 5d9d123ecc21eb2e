//! ReleaseLockHandler - Ends an editing session without submitting.

use std::sync::Arc;

use crate::application::services::LockManager;
use crate::domain::foundation::{CommandMetadata, ResponseId};
use crate::domain::response::ResponseError;

#[derive(Debug, Clone)]
pub struct ReleaseLockCommand {
    pub response_id: ResponseId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleaseLockResult {
    /// False when the caller held nothing; that is not an error.
    pub released: bool,
}

pub struct ReleaseLockHandler {
    locks: Arc<LockManager>,
}

impl ReleaseLockHandler {
    pub fn new(locks: Arc<LockManager>) -> Self {
        Self { locks }
    }

    pub async fn handle(
        &self,
        cmd: ReleaseLockCommand,
        metadata: CommandMetadata,
    ) -> Result<ReleaseLockResult, ResponseError> {
        let released = self.locks.release(&cmd.response_id, &metadata.user_id).await?;
        Ok(ReleaseLockResult { released })
    }
}
