//! In-memory AnswerRepository.

use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::domain::answer::Answer;
use crate::domain::foundation::{DomainError, QuestionId, ResponseId};
use crate::ports::AnswerRepository;

/// Keyed by (response, question); the BTreeMap keeps answers of one
/// response contiguous and ordered by question id.
#[derive(Debug, Default)]
pub struct InMemoryAnswerRepository {
    answers: RwLock<BTreeMap<(ResponseId, QuestionId), Answer>>,
}

impl InMemoryAnswerRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AnswerRepository for InMemoryAnswerRepository {
    async fn find(&self, response_id: &ResponseId, question_id: &QuestionId) -> Result<Option<Answer>, DomainError> {
        Ok(self.answers.read().await.get(&(*response_id, *question_id)).cloned())
    }

    async fn find_by_response(&self, response_id: &ResponseId) -> Result<Vec<Answer>, DomainError> {
        Ok(self
            .answers
            .read()
            .await
            .iter()
            .filter(|((r, _), _)| r == response_id)
            .map(|(_, answer)| answer.clone())
            .collect())
    }

    async fn upsert(&self, answer: &Answer) -> Result<(), DomainError> {
        self.answers
            .write()
            .await
            .insert((answer.response_id, answer.question_id), answer.clone());
        Ok(())
    }

    async fn insert_if_absent(&self, answer: &Answer) -> Result<bool, DomainError> {
        let mut answers = self.answers.write().await;
        let key = (answer.response_id, answer.question_id);
        if answers.contains_key(&key) {
            return Ok(false);
        }
        answers.insert(key, answer.clone());
        Ok(true)
    }

    async fn delete_by_response(&self, response_id: &ResponseId) -> Result<(), DomainError> {
        self.answers.write().await.retain(|(r, _), _| r != response_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delete_by_response_leaves_other_responses() {
        let repo = InMemoryAnswerRepository::new();
        let keep = ResponseId::new();
        let gone = ResponseId::new();
        repo.upsert(&Answer::blank(keep, QuestionId::new())).await.unwrap();
        repo.upsert(&Answer::blank(gone, QuestionId::new())).await.unwrap();

        repo.delete_by_response(&gone).await.unwrap();

        assert_eq!(repo.find_by_response(&keep).await.unwrap().len(), 1);
        assert!(repo.find_by_response(&gone).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn insert_if_absent_never_overwrites() {
        let repo = InMemoryAnswerRepository::new();
        let response = ResponseId::new();
        let question = QuestionId::new();
        let mut scored = Answer::blank(response, question);
        scored.score = Some(3);
        repo.upsert(&scored).await.unwrap();

        assert!(!repo.insert_if_absent(&Answer::blank(response, question)).await.unwrap());
        assert_eq!(repo.find(&response, &question).await.unwrap().unwrap().score, Some(3));
    }
}
