//! PostgreSQL adapters - Database implementations for the persistence ports.
//!
//! - `PostgresResponseRepository` - response versions, conditional version creation
//! - `PostgresAnswerRepository` - per-question answers
//! - `PostgresLockStore` - edit locks via a conditional upsert
//! - `PostgresMapDirectory` - read access to maps and their reviewers
//! - `PostgresEventOutbox` - events written to an outbox table for delivery
//!
//! The schema is provisioned by the surrounding application. Expected tables:
//!
//! ```sql
//! response_maps   (id UUID PK, assignment_id UUID, reviewer_id UUID, reviewee_id UUID,
//!                  reviewer_is_team BOOLEAN, kind TEXT)
//! participants    (id UUID PK, user_id TEXT)
//! teams           (id UUID PK)
//! team_members    (team_id UUID, user_id TEXT, PK (team_id, user_id))
//! responses       (id UUID PK, map_id UUID, round INTEGER NULL, version_num TEXT NULL,
//!                  is_submitted BOOLEAN, additional_comment TEXT, visibility TEXT,
//!                  created_at TIMESTAMPTZ, updated_at TIMESTAMPTZ)
//! answers         (response_id UUID, question_id UUID, score INTEGER NULL, comment TEXT,
//!                  PK (response_id, question_id))
//! response_locks  (response_id UUID PK, holder TEXT, acquired_at TIMESTAMPTZ, timeout_ms BIGINT)
//! event_outbox    (event_id TEXT PK, event_type TEXT, aggregate_id TEXT, payload JSONB,
//!                  status TEXT, created_at TIMESTAMPTZ, partition_key TEXT)
//! ```

mod answer_repository;
mod event_outbox;
mod lock_store;
mod map_directory;
mod response_repository;

pub use answer_repository::PostgresAnswerRepository;
pub use event_outbox::PostgresEventOutbox;
pub use lock_store::PostgresLockStore;
pub use map_directory::PostgresMapDirectory;
pub use response_repository::PostgresResponseRepository;

use sqlx::postgres::PgRow;
use sqlx::{Postgres, Row};

use crate::domain::foundation::DomainError;

/// Reads one column, converting decode failures into `DatabaseError`.
fn column<'r, T>(row: &'r PgRow, name: &str) -> Result<T, DomainError>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get(name)
        .map_err(|e| DomainError::database(format!("Failed to get {}: {}", name, e)))
}
