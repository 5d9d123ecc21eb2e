//! PostgreSQL implementation of LockStore.
//!
//! Acquisition is one conditional upsert: the row is written only if there is
//! no row, the row belongs to the caller, or the stored lock has expired.
//! When the upsert affects nothing the current row is read back to report the
//! holder. If that row vanished in between (released concurrently) the
//! attempt is repeated.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use std::time::Duration;

use super::column;
use crate::domain::foundation::{DomainError, ResponseId, Timestamp, UserId};
use crate::domain::lock::{EditLock, LockAcquisition};
use crate::ports::LockStore;

const MAX_ACQUIRE_ATTEMPTS: usize = 3;

#[derive(Clone)]
pub struct PostgresLockStore {
    pool: PgPool,
}

impl PostgresLockStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn upsert_if_admitted(
        &self,
        response_id: &ResponseId,
        holder: &UserId,
        now: Timestamp,
        timeout: Duration,
    ) -> Result<bool, DomainError> {
        let row = sqlx::query(
            r#"
            INSERT INTO response_locks (response_id, holder, acquired_at, timeout_ms)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (response_id) DO UPDATE SET
                holder = EXCLUDED.holder,
                acquired_at = EXCLUDED.acquired_at,
                timeout_ms = EXCLUDED.timeout_ms
            WHERE response_locks.holder = EXCLUDED.holder
               OR response_locks.acquired_at
                  + response_locks.timeout_ms * INTERVAL '1 millisecond' <= EXCLUDED.acquired_at
            RETURNING response_id
            "#,
        )
        .bind(response_id.as_uuid())
        .bind(holder.as_str())
        .bind(now.as_datetime())
        .bind(timeout_millis(timeout))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to acquire lock: {}", e)))?;

        Ok(row.is_some())
    }
}

#[async_trait]
impl LockStore for PostgresLockStore {
    async fn try_acquire(
        &self,
        response_id: &ResponseId,
        holder: &UserId,
        now: Timestamp,
        timeout: Duration,
    ) -> Result<LockAcquisition, DomainError> {
        for _ in 0..MAX_ACQUIRE_ATTEMPTS {
            if self.upsert_if_admitted(response_id, holder, now, timeout).await? {
                return Ok(LockAcquisition::Granted(EditLock::new(
                    *response_id,
                    holder.clone(),
                    now,
                    timeout,
                )));
            }
            if let Some(current) = self.find(response_id).await? {
                return Ok(LockAcquisition::Denied {
                    holder: current.holder.clone(),
                    expires_at: current.expires_at(),
                });
            }
        }

        Err(DomainError::database(format!(
            "Lock for response {} kept changing during acquisition",
            response_id
        )))
    }

    async fn release(&self, response_id: &ResponseId, holder: &UserId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM response_locks WHERE response_id = $1 AND holder = $2")
            .bind(response_id.as_uuid())
            .bind(holder.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to release lock: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn find(&self, response_id: &ResponseId) -> Result<Option<EditLock>, DomainError> {
        let row = sqlx::query(
            "SELECT response_id, holder, acquired_at, timeout_ms FROM response_locks WHERE response_id = $1",
        )
        .bind(response_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch lock: {}", e)))?;

        row.as_ref().map(row_to_lock).transpose()
    }

    async fn remove(&self, response_id: &ResponseId) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM response_locks WHERE response_id = $1")
            .bind(response_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to remove lock: {}", e)))?;
        Ok(())
    }
}

fn timeout_millis(timeout: Duration) -> i64 {
    i64::try_from(timeout.as_millis()).unwrap_or(i64::MAX)
}

fn row_to_lock(row: &PgRow) -> Result<EditLock, DomainError> {
    let holder: String = column(row, "holder")?;
    let acquired_at: chrono::DateTime<chrono::Utc> = column(row, "acquired_at")?;
    let timeout_ms: i64 = column(row, "timeout_ms")?;

    Ok(EditLock::new(
        ResponseId::from_uuid(column(row, "response_id")?),
        UserId::new(holder).map_err(DomainError::from)?,
        Timestamp::from_datetime(acquired_at),
        Duration::from_millis(u64::try_from(timeout_ms).unwrap_or(0)),
    ))
}
