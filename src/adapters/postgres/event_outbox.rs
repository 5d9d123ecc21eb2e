//! Outbox-backed EventPublisher.
//!
//! Envelopes are written as `pending` rows into `event_outbox`; a relay owned
//! by the surrounding application drains the table to the message broker.
//! Rows are keyed by event id so a retried publish is a no-op.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, ErrorCode, EventEnvelope};
use crate::ports::EventPublisher;

#[derive(Clone)]
pub struct PostgresEventOutbox {
    pool: PgPool,
}

impl PostgresEventOutbox {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Events for one acting user stay ordered within a partition; system events
/// fall back to their aggregate.
fn partition_key(event: &EventEnvelope) -> String {
    event
        .metadata
        .user_id
        .clone()
        .unwrap_or_else(|| event.aggregate_id.clone())
}

#[async_trait]
impl EventPublisher for PostgresEventOutbox {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
        let envelope = serde_json::to_value(&event).map_err(|e| {
            DomainError::new(
                ErrorCode::InternalError,
                format!("Failed to serialize event envelope: {}", e),
            )
        })?;

        sqlx::query(
            r#"
            INSERT INTO event_outbox (
                event_id, event_type, aggregate_id, payload, status, created_at, partition_key
            ) VALUES ($1, $2, $3, $4, 'pending', NOW(), $5)
            ON CONFLICT (event_id) DO NOTHING
            "#,
        )
        .bind(event.event_id.as_str())
        .bind(&event.event_type)
        .bind(&event.aggregate_id)
        .bind(envelope)
        .bind(partition_key(&event))
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to write event to outbox: {}", e)))?;

        tracing::debug!(
            event_id = %event.event_id.as_str(),
            event_type = %event.event_type,
            "event written to outbox"
        );
        Ok(())
    }
}
