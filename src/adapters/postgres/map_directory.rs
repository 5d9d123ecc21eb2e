//! PostgreSQL read access to response maps and the reviewers behind them.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use uuid::Uuid;

use super::column;
use crate::domain::foundation::{
    AssignmentId, DomainError, MapId, RevieweeId, ReviewerId, TeamId, UserId,
};
use crate::domain::review_map::{MapKind, ResponseMap, ReviewerOfRecord};
use crate::ports::{ResponseMapReader, ReviewerDirectory};

const MAP_COLUMNS: &str = "id, assignment_id, reviewer_id, reviewee_id, reviewer_is_team, kind";

#[derive(Clone)]
pub struct PostgresMapDirectory {
    pool: PgPool,
}

impl PostgresMapDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn resolve_team(&self, team_id: &Uuid) -> Result<ReviewerOfRecord, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT t.id, m.user_id
            FROM teams t
            LEFT JOIN team_members m ON m.team_id = t.id
            WHERE t.id = $1
            ORDER BY m.user_id
            "#,
        )
        .bind(team_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to resolve team: {}", e)))?;

        if rows.is_empty() {
            return Ok(ReviewerOfRecord::Unassigned);
        }

        let mut members = Vec::with_capacity(rows.len());
        for row in &rows {
            let user_id: Option<String> = column(row, "user_id")?;
            if let Some(user_id) = user_id {
                members.push(UserId::new(user_id).map_err(DomainError::from)?);
            }
        }

        Ok(ReviewerOfRecord::Team {
            team_id: TeamId::from_uuid(*team_id),
            members,
        })
    }

    async fn resolve_participant(&self, participant_id: &Uuid) -> Result<ReviewerOfRecord, DomainError> {
        let row = sqlx::query("SELECT user_id FROM participants WHERE id = $1")
            .bind(participant_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to resolve participant: {}", e)))?;

        match row {
            Some(row) => {
                let user_id: String = column(&row, "user_id")?;
                Ok(ReviewerOfRecord::Individual {
                    user_id: UserId::new(user_id).map_err(DomainError::from)?,
                })
            }
            None => Ok(ReviewerOfRecord::Unassigned),
        }
    }
}

#[async_trait]
impl ResponseMapReader for PostgresMapDirectory {
    async fn find_by_id(&self, id: &MapId) -> Result<Option<ResponseMap>, DomainError> {
        let row = sqlx::query(&format!("SELECT {} FROM response_maps WHERE id = $1", MAP_COLUMNS))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to fetch response map: {}", e)))?;

        row.as_ref().map(row_to_map).transpose()
    }

    async fn find_siblings(&self, map: &ResponseMap) -> Result<Vec<ResponseMap>, DomainError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM response_maps
            WHERE assignment_id = $1 AND reviewee_id = $2 AND kind = $3 AND id <> $4
            "#,
            MAP_COLUMNS
        ))
        .bind(map.assignment_id().as_uuid())
        .bind(map.reviewee_id().as_uuid())
        .bind(map.kind().as_str())
        .bind(map.id().as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch sibling maps: {}", e)))?;

        rows.iter().map(row_to_map).collect()
    }
}

#[async_trait]
impl ReviewerDirectory for PostgresMapDirectory {
    async fn resolve(&self, map: &ResponseMap) -> Result<ReviewerOfRecord, DomainError> {
        let reviewer = map.reviewer_id().as_uuid();
        if map.reviewer_is_team() {
            self.resolve_team(reviewer).await
        } else {
            self.resolve_participant(reviewer).await
        }
    }
}

fn row_to_map(row: &PgRow) -> Result<ResponseMap, DomainError> {
    let kind: String = column(row, "kind")?;
    let kind: MapKind = kind.parse().map_err(DomainError::from)?;

    Ok(ResponseMap::new(
        MapId::from_uuid(column(row, "id")?),
        AssignmentId::from_uuid(column(row, "assignment_id")?),
        ReviewerId::from_uuid(column(row, "reviewer_id")?),
        RevieweeId::from_uuid(column(row, "reviewee_id")?),
        column(row, "reviewer_is_team")?,
        kind,
    ))
}
