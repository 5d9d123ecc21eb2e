//! Answer repository port.
//!
//! Writes are keyed by (response, question). Implementations serialize
//! writes per key; the last committed write wins.

use async_trait::async_trait;

use crate::domain::answer::Answer;
use crate::domain::foundation::{DomainError, QuestionId, ResponseId};

#[async_trait]
pub trait AnswerRepository: Send + Sync {
    /// Find the answer for one question of a response.
    async fn find(
        &self,
        response_id: &ResponseId,
        question_id: &QuestionId,
    ) -> Result<Option<Answer>, DomainError>;

    /// All answers of a response, ordered by question id.
    async fn find_by_response(&self, response_id: &ResponseId) -> Result<Vec<Answer>, DomainError>;

    /// Create the row if absent, otherwise overwrite score and comment.
    async fn upsert(&self, answer: &Answer) -> Result<(), DomainError>;

    /// Create the row only if absent. Returns true if it was created.
    async fn insert_if_absent(&self, answer: &Answer) -> Result<bool, DomainError>;

    /// Remove every answer of a response.
    async fn delete_by_response(&self, response_id: &ResponseId) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn AnswerRepository) {}
    }
}
