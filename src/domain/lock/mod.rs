//! Edit lock domain module.
//!
//! An edit lock is an exclusive, timeout-bounded grant on one response
//! version. Liveness is never stored: it is recomputed from the acquisition
//! time and timeout on every read, so an expired row may linger in storage
//! without ever counting as held.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::foundation::{ResponseId, Timestamp, UserId};

/// Default lock timeout (20 minutes).
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(20 * 60);

/// Exclusive editing grant on a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditLock {
    pub response_id: ResponseId,
    pub holder: UserId,
    pub acquired_at: Timestamp,
    pub timeout: Duration,
}

impl EditLock {
    pub fn new(response_id: ResponseId, holder: UserId, acquired_at: Timestamp, timeout: Duration) -> Self {
        Self {
            response_id,
            holder,
            acquired_at,
            timeout,
        }
    }

    pub fn expires_at(&self) -> Timestamp {
        self.acquired_at.plus(self.timeout)
    }

    /// `now < acquired_at + timeout`.
    pub fn is_live_at(&self, now: Timestamp) -> bool {
        now.is_before(&self.expires_at())
    }

    pub fn is_held_by(&self, holder: &UserId, now: Timestamp) -> bool {
        &self.holder == holder && self.is_live_at(now)
    }

    /// Whether `holder` may take or refresh this lock at `now`.
    pub fn admits(&self, holder: &UserId, now: Timestamp) -> bool {
        !self.is_live_at(now) || &self.holder == holder
    }
}

/// Result of a try-once acquisition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockAcquisition {
    /// The caller now holds (or refreshed) the lock.
    Granted(EditLock),
    /// Someone else holds a live lock.
    Denied { holder: UserId, expires_at: Timestamp },
}

impl LockAcquisition {
    pub fn is_granted(&self) -> bool {
        matches!(self, LockAcquisition::Granted(_))
    }
}

/// Decide an acquisition against the currently stored lock, if any.
///
/// Storage adapters call this inside their atomic section.
pub fn arbitrate(
    existing: Option<&EditLock>,
    response_id: ResponseId,
    holder: &UserId,
    now: Timestamp,
    timeout: Duration,
) -> LockAcquisition {
    match existing {
        Some(current) if !current.admits(holder, now) => LockAcquisition::Denied {
            holder: current.holder.clone(),
            expires_at: current.expires_at(),
        },
        _ => LockAcquisition::Granted(EditLock::new(response_id, holder.clone(), now, timeout)),
    }
}
