//! Edit lock storage port.
//!
//! The lock store is the only synchronization point between concurrent
//! editors. `try_acquire` and `release` must each be a single atomic
//! check-and-set against the stored record: reading liveness and writing the
//! new holder cannot be split across two round trips, or two callers could
//! both observe "unlocked" and both win.

use async_trait::async_trait;
use std::time::Duration;

use crate::domain::foundation::{DomainError, ResponseId, Timestamp, UserId};
use crate::domain::lock::{EditLock, LockAcquisition};

#[async_trait]
pub trait LockStore: Send + Sync {
    /// Grant or refresh the lock for `holder` unless another holder's lock is
    /// live at `now`. Never waits.
    async fn try_acquire(
        &self,
        response_id: &ResponseId,
        holder: &UserId,
        now: Timestamp,
        timeout: Duration,
    ) -> Result<LockAcquisition, DomainError>;

    /// Delete the lock if `holder` owns the stored record. Returns whether a
    /// record was removed; a mismatch is not an error.
    async fn release(&self, response_id: &ResponseId, holder: &UserId) -> Result<bool, DomainError>;

    /// The stored lock record, live or not.
    async fn find(&self, response_id: &ResponseId) -> Result<Option<EditLock>, DomainError>;

    /// Unconditionally drop the record (used when the response is deleted).
    async fn remove(&self, response_id: &ResponseId) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn LockStore) {}
    }
}
