//! PostgreSQL implementation of ResponseRepository.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::PgPool;

use super::column;
use crate::domain::foundation::{DomainError, ErrorCode, MapId, ResponseId, Timestamp};
use crate::domain::response::versioning;
use crate::domain::response::{Response, ResponseStatus, Visibility};
use crate::ports::{ResponseRepository, VersionInsert};

const SELECT_COLUMNS: &str = "id, map_id, round, version_num, is_submitted, additional_comment, \
                              visibility, created_at, updated_at";

#[derive(Clone)]
pub struct PostgresResponseRepository {
    pool: PgPool,
}

impl PostgresResponseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Tells a guarded update that matched nothing apart from a missing row.
    async fn ensure_exists(&self, id: &ResponseId) -> Result<(), DomainError> {
        let row = sqlx::query("SELECT 1 FROM responses WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to fetch response: {}", e)))?;
        match row {
            Some(_) => Ok(()),
            None => Err(not_found(id)),
        }
    }
}

fn not_found(id: &ResponseId) -> DomainError {
    DomainError::new(ErrorCode::ResponseNotFound, format!("Response not found: {}", id))
}

#[async_trait]
impl ResponseRepository for PostgresResponseRepository {
    async fn insert_version(
        &self,
        candidate: &Response,
        expected_latest: Option<ResponseId>,
    ) -> Result<VersionInsert, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::database(format!("Failed to begin transaction: {}", e)))?;

        // Row lock on the map serializes version creation per map.
        sqlx::query("SELECT id FROM response_maps WHERE id = $1 FOR UPDATE")
            .bind(candidate.map_id().as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| DomainError::database(format!("Failed to lock response map: {}", e)))?;

        let rows = sqlx::query(&format!(
            "SELECT {} FROM responses WHERE map_id = $1 AND round IS NOT DISTINCT FROM $2",
            SELECT_COLUMNS
        ))
        .bind(candidate.map_id().as_uuid())
        .bind(candidate.round().map(|r| r as i32))
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch response versions: {}", e)))?;

        let versions = rows.iter().map(row_to_response).collect::<Result<Vec<_>, _>>()?;
        if let Some(current) = versioning::current_version(&versions) {
            if Some(*current.id()) != expected_latest {
                return Ok(VersionInsert::Superseded(current.clone()));
            }
        }

        sqlx::query(
            r#"
            INSERT INTO responses (
                id, map_id, round, version_num, is_submitted, additional_comment,
                visibility, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(candidate.id().as_uuid())
        .bind(candidate.map_id().as_uuid())
        .bind(candidate.round().map(|r| r as i32))
        .bind(candidate.version_num())
        .bind(candidate.is_submitted())
        .bind(candidate.additional_comment())
        .bind(candidate.visibility().as_str())
        .bind(candidate.created_at().as_datetime())
        .bind(candidate.updated_at().as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::database(format!("Failed to insert response: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| DomainError::database(format!("Failed to commit response version: {}", e)))?;

        Ok(VersionInsert::Inserted(candidate.clone()))
    }

    async fn save_comment(&self, response: &Response) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE responses SET
                additional_comment = $2,
                updated_at = $3
            WHERE id = $1 AND is_submitted = false
            "#,
        )
        .bind(response.id().as_uuid())
        .bind(response.additional_comment())
        .bind(response.updated_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to save response comment: {}", e)))?;

        if result.rows_affected() == 0 {
            self.ensure_exists(response.id()).await?;
            return Ok(false);
        }
        Ok(true)
    }

    async fn mark_submitted(&self, response: &Response) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE responses SET
                is_submitted = true,
                additional_comment = $2,
                updated_at = $3
            WHERE id = $1 AND is_submitted = false
            "#,
        )
        .bind(response.id().as_uuid())
        .bind(response.additional_comment())
        .bind(response.updated_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to submit response: {}", e)))?;

        if result.rows_affected() == 0 {
            self.ensure_exists(response.id()).await?;
            return Ok(false);
        }
        Ok(true)
    }

    async fn set_visibility(
        &self,
        id: &ResponseId,
        visibility: Visibility,
        updated_at: Timestamp,
    ) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE responses SET visibility = $2, updated_at = $3 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(visibility.as_str())
            .bind(updated_at.as_datetime())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to update response visibility: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &ResponseId) -> Result<Option<Response>, DomainError> {
        let row = sqlx::query(&format!("SELECT {} FROM responses WHERE id = $1", SELECT_COLUMNS))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to fetch response: {}", e)))?;

        row.as_ref().map(row_to_response).transpose()
    }

    async fn find_by_map_and_round(&self, map_id: &MapId, round: Option<u32>) -> Result<Vec<Response>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM responses WHERE map_id = $1 AND round IS NOT DISTINCT FROM $2",
            SELECT_COLUMNS
        ))
        .bind(map_id.as_uuid())
        .bind(round.map(|r| r as i32))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch response versions: {}", e)))?;

        // Ordinals are stored as text; ordering happens in the domain.
        let mut versions = rows.iter().map(row_to_response).collect::<Result<Vec<_>, _>>()?;
        versioning::sort_most_recent_first(&mut versions);
        Ok(versions)
    }

    async fn delete(&self, id: &ResponseId) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM responses WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to delete response: {}", e)))?;
        Ok(())
    }
}

fn row_to_response(row: &PgRow) -> Result<Response, DomainError> {
    let round: Option<i32> = column(row, "round")?;
    let round = round
        .map(u32::try_from)
        .transpose()
        .map_err(|_| DomainError::database("Negative round number in responses table"))?;

    let visibility: String = column(row, "visibility")?;
    let visibility: Visibility = visibility.parse().map_err(DomainError::from)?;

    let is_submitted: bool = column(row, "is_submitted")?;
    let status = if is_submitted {
        ResponseStatus::Submitted
    } else {
        ResponseStatus::Draft
    };

    let created_at: chrono::DateTime<chrono::Utc> = column(row, "created_at")?;
    let updated_at: chrono::DateTime<chrono::Utc> = column(row, "updated_at")?;

    Ok(Response::reconstitute(
        ResponseId::from_uuid(column(row, "id")?),
        MapId::from_uuid(column(row, "map_id")?),
        round,
        column(row, "version_num")?,
        status,
        column(row, "additional_comment")?,
        visibility,
        Timestamp::from_datetime(created_at),
        Timestamp::from_datetime(updated_at),
    ))
}
