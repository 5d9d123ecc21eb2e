//! Lock Manager - exclusive, timeout-bounded edit locks.
//!
//! Expiry is passive: liveness is recomputed against the clock on every
//! read, and expired records stay in the store until overwritten.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::foundation::{ResponseId, UserId};
use crate::domain::lock::{EditLock, LockAcquisition, DEFAULT_LOCK_TIMEOUT};
use crate::domain::response::ResponseError;
use crate::ports::{Clock, LockStore};

pub struct LockManager {
    store: Arc<dyn LockStore>,
    clock: Arc<dyn Clock>,
    timeout: Duration,
}

impl LockManager {
    pub fn new(store: Arc<dyn LockStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Grant or refresh the lock. Never waits: a live lock held by someone
    /// else comes back as `LockAcquisition::Denied`.
    pub async fn acquire(&self, response_id: &ResponseId, holder: &UserId) -> Result<LockAcquisition, ResponseError> {
        let now = self.clock.now();
        let outcome = self.store.try_acquire(response_id, holder, now, self.timeout).await?;
        match &outcome {
            LockAcquisition::Granted(lock) => tracing::debug!(
                response_id = %response_id,
                holder = %holder,
                expires_at = %lock.expires_at(),
                "edit lock granted"
            ),
            LockAcquisition::Denied { holder: current, .. } => tracing::debug!(
                response_id = %response_id,
                requested_by = %holder,
                held_by = %current,
                "edit lock denied"
            ),
        }
        Ok(outcome)
    }

    /// Release the lock if `holder` owns it. Anything else is a silent no-op.
    pub async fn release(&self, response_id: &ResponseId, holder: &UserId) -> Result<bool, ResponseError> {
        let released = self.store.release(response_id, holder).await?;
        if released {
            tracing::debug!(response_id = %response_id, holder = %holder, "edit lock released");
        }
        Ok(released)
    }

    pub async fn is_held_by(&self, response_id: &ResponseId, holder: &UserId) -> Result<bool, ResponseError> {
        let now = self.clock.now();
        Ok(self
            .store
            .find(response_id)
            .await?
            .map_or(false, |lock| lock.is_held_by(holder, now)))
    }

    /// The live lock on a response, if any.
    pub async fn current(&self, response_id: &ResponseId) -> Result<Option<EditLock>, ResponseError> {
        let now = self.clock.now();
        Ok(self
            .store
            .find(response_id)
            .await?
            .filter(|lock| lock.is_live_at(now)))
    }

    /// Drop whatever record exists, live or not.
    pub async fn forget(&self, response_id: &ResponseId) -> Result<(), ResponseError> {
        self.store.remove(response_id).await?;
        Ok(())
    }
}
