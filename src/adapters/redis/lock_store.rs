//! Redis-backed lock store for multi-server deployments.
//!
//! Each lock is a hash at `{prefix}:{response_id}` with `holder`,
//! `acquired_at` (unix ms) and `timeout_ms`. Acquire and release run as Lua
//! scripts so the liveness check and the write are one atomic step on the
//! server. Expired records are retained for one extra timeout, then evicted.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Script};
use std::collections::HashMap;
use std::time::Duration;

use crate::domain::foundation::{DomainError, ErrorCode, ResponseId, Timestamp, UserId};
use crate::domain::lock::{EditLock, LockAcquisition};
use crate::ports::LockStore;

const ACQUIRE_SCRIPT: &str = r#"
local holder = redis.call('HGET', KEYS[1], 'holder')
if holder and holder ~= ARGV[1] then
  local expires = tonumber(redis.call('HGET', KEYS[1], 'acquired_at'))
    + tonumber(redis.call('HGET', KEYS[1], 'timeout_ms'))
  if tonumber(ARGV[2]) < expires then
    return {0, holder, expires}
  end
end
redis.call('HSET', KEYS[1], 'holder', ARGV[1], 'acquired_at', ARGV[2], 'timeout_ms', ARGV[3])
redis.call('PEXPIRE', KEYS[1], tonumber(ARGV[3]) * 2)
return {1, ARGV[1], tonumber(ARGV[2]) + tonumber(ARGV[3])}
"#;

const RELEASE_SCRIPT: &str = r#"
if redis.call('HGET', KEYS[1], 'holder') == ARGV[1] then
  return redis.call('DEL', KEYS[1])
end
return 0
"#;

/// Default key prefix.
pub const DEFAULT_KEY_PREFIX: &str = "peer_review:lock";

#[derive(Clone)]
pub struct RedisLockStore {
    conn: MultiplexedConnection,
    key_prefix: String,
    acquire: Script,
    release: Script,
}

impl RedisLockStore {
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self {
            conn,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            acquire: Script::new(ACQUIRE_SCRIPT),
            release: Script::new(RELEASE_SCRIPT),
        }
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    fn key(&self, response_id: &ResponseId) -> String {
        lock_key(&self.key_prefix, response_id)
    }
}

fn lock_key(prefix: &str, response_id: &ResponseId) -> String {
    format!("{}:{}", prefix, response_id)
}

fn cache_error(context: &str, e: redis::RedisError) -> DomainError {
    DomainError::new(ErrorCode::CacheError, format!("{}: {}", context, e))
}

fn millis_to_timestamp(millis: i64) -> Result<Timestamp, DomainError> {
    Timestamp::from_unix_millis(millis)
        .ok_or_else(|| DomainError::new(ErrorCode::CacheError, format!("Invalid lock timestamp: {}", millis)))
}

fn record_to_lock(response_id: ResponseId, record: &HashMap<String, String>) -> Result<EditLock, DomainError> {
    let field = |name: &str| {
        record
            .get(name)
            .ok_or_else(|| DomainError::new(ErrorCode::CacheError, format!("Lock record missing {}", name)))
    };
    let number = |name: &str| -> Result<i64, DomainError> {
        field(name)?
            .parse()
            .map_err(|_| DomainError::new(ErrorCode::CacheError, format!("Lock record has invalid {}", name)))
    };

    Ok(EditLock::new(
        response_id,
        UserId::new(field("holder")?.clone()).map_err(DomainError::from)?,
        millis_to_timestamp(number("acquired_at")?)?,
        Duration::from_millis(u64::try_from(number("timeout_ms")?).unwrap_or(0)),
    ))
}

#[async_trait]
impl LockStore for RedisLockStore {
    async fn try_acquire(
        &self,
        response_id: &ResponseId,
        holder: &UserId,
        now: Timestamp,
        timeout: Duration,
    ) -> Result<LockAcquisition, DomainError> {
        let timeout_ms = i64::try_from(timeout.as_millis()).unwrap_or(i64::MAX);
        let mut conn = self.conn.clone();

        let (granted, current_holder, expires_ms): (i64, String, i64) = self
            .acquire
            .key(self.key(response_id))
            .arg(holder.as_str())
            .arg(now.as_unix_millis())
            .arg(timeout_ms)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| cache_error("Failed to acquire lock", e))?;

        if granted == 1 {
            return Ok(LockAcquisition::Granted(EditLock::new(
                *response_id,
                holder.clone(),
                now,
                timeout,
            )));
        }

        Ok(LockAcquisition::Denied {
            holder: UserId::new(current_holder).map_err(DomainError::from)?,
            expires_at: millis_to_timestamp(expires_ms)?,
        })
    }

    async fn release(&self, response_id: &ResponseId, holder: &UserId) -> Result<bool, DomainError> {
        let mut conn = self.conn.clone();
        let removed: i64 = self
            .release
            .key(self.key(response_id))
            .arg(holder.as_str())
            .invoke_async(&mut conn)
            .await
            .map_err(|e| cache_error("Failed to release lock", e))?;
        Ok(removed > 0)
    }

    async fn find(&self, response_id: &ResponseId) -> Result<Option<EditLock>, DomainError> {
        let mut conn = self.conn.clone();
        let record: HashMap<String, String> = conn
            .hgetall(self.key(response_id))
            .await
            .map_err(|e: redis::RedisError| cache_error("Failed to read lock", e))?;

        if record.is_empty() {
            return Ok(None);
        }
        record_to_lock(*response_id, &record).map(Some)
    }

    async fn remove(&self, response_id: &ResponseId) -> Result<(), DomainError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(self.key(response_id))
            .await
            .map_err(|e: redis::RedisError| cache_error("Failed to remove lock", e))?;
        Ok(())
    }
}
