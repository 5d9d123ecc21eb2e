//! In-memory LockStore.
//!
//! A single mutex guards the table, so the liveness check and the write in
//! `try_acquire` happen in one critical section.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::domain::foundation::{DomainError, ResponseId, Timestamp, UserId};
use crate::domain::lock::{arbitrate, EditLock, LockAcquisition};
use crate::ports::LockStore;

#[derive(Debug, Default)]
pub struct InMemoryLockStore {
    locks: Mutex<HashMap<ResponseId, EditLock>>,
}

impl InMemoryLockStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LockStore for InMemoryLockStore {
    async fn try_acquire(
        &self,
        response_id: &ResponseId,
        holder: &UserId,
        now: Timestamp,
        timeout: Duration,
    ) -> Result<LockAcquisition, DomainError> {
        let mut locks = self.locks.lock().await;
        let outcome = arbitrate(locks.get(response_id), *response_id, holder, now, timeout);
        if let LockAcquisition::Granted(lock) = &outcome {
            locks.insert(*response_id, lock.clone());
        }
        Ok(outcome)
    }

    async fn release(&self, response_id: &ResponseId, holder: &UserId) -> Result<bool, DomainError> {
        let mut locks = self.locks.lock().await;
        match locks.get(response_id) {
            Some(lock) if &lock.holder == holder => {
                locks.remove(response_id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn find(&self, response_id: &ResponseId) -> Result<Option<EditLock>, DomainError> {
        Ok(self.locks.lock().await.get(response_id).cloned())
    }

    async fn remove(&self, response_id: &ResponseId) -> Result<(), DomainError> {
        self.locks.lock().await.remove(response_id);
        Ok(())
    }
}
