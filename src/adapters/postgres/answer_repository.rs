//! PostgreSQL implementation of AnswerRepository.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::PgPool;

use super::column;
use crate::domain::answer::Answer;
use crate::domain::foundation::{DomainError, QuestionId, ResponseId};
use crate::ports::AnswerRepository;

#[derive(Clone)]
pub struct PostgresAnswerRepository {
    pool: PgPool,
}

impl PostgresAnswerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnswerRepository for PostgresAnswerRepository {
    async fn find(&self, response_id: &ResponseId, question_id: &QuestionId) -> Result<Option<Answer>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT response_id, question_id, score, comment
            FROM answers
            WHERE response_id = $1 AND question_id = $2
            "#,
        )
        .bind(response_id.as_uuid())
        .bind(question_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch answer: {}", e)))?;

        row.as_ref().map(row_to_answer).transpose()
    }

    async fn find_by_response(&self, response_id: &ResponseId) -> Result<Vec<Answer>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT response_id, question_id, score, comment
            FROM answers
            WHERE response_id = $1
            ORDER BY question_id
            "#,
        )
        .bind(response_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch answers: {}", e)))?;

        rows.iter().map(row_to_answer).collect()
    }

    async fn upsert(&self, answer: &Answer) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO answers (response_id, question_id, score, comment)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (response_id, question_id) DO UPDATE SET
                score = EXCLUDED.score,
                comment = EXCLUDED.comment
            "#,
        )
        .bind(answer.response_id.as_uuid())
        .bind(answer.question_id.as_uuid())
        .bind(answer.score)
        .bind(&answer.comment)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to upsert answer: {}", e)))?;

        Ok(())
    }

    async fn insert_if_absent(&self, answer: &Answer) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO answers (response_id, question_id, score, comment)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (response_id, question_id) DO NOTHING
            "#,
        )
        .bind(answer.response_id.as_uuid())
        .bind(answer.question_id.as_uuid())
        .bind(answer.score)
        .bind(&answer.comment)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to insert answer: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_response(&self, response_id: &ResponseId) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM answers WHERE response_id = $1")
            .bind(response_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to delete answers: {}", e)))?;
        Ok(())
    }
}

fn row_to_answer(row: &PgRow) -> Result<Answer, DomainError> {
    Ok(Answer {
        response_id: ResponseId::from_uuid(column(row, "response_id")?),
        question_id: QuestionId::from_uuid(column(row, "question_id")?),
        score: column(row, "score")?,
        comment: column(row, "comment")?,
    })
}
