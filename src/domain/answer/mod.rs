//! Answer domain module.
//!
//! One scored rubric item per (response, question), plus the per-call
//! report the answer ledger hands back after a batch of upserts.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{QuestionId, ResponseId};

/// A scored rubric item attached to a response version.
///
/// Unique per `(response_id, question_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub response_id: ResponseId,
    pub question_id: QuestionId,
    pub score: Option<i32>,
    pub comment: String,
}

impl Answer {
    /// An unanswered placeholder row.
    pub fn blank(response_id: ResponseId, question_id: QuestionId) -> Self {
        Self {
            response_id,
            question_id,
            score: None,
            comment: String::new(),
        }
    }

    pub fn from_entry(response_id: ResponseId, entry: AnswerEntry) -> Self {
        Self {
            response_id,
            question_id: entry.question_id,
            score: entry.score,
            comment: entry.comment,
        }
    }
}

/// Raw answer payload as submitted by the reviewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerEntry {
    pub question_id: QuestionId,
    pub score: Option<i32>,
    #[serde(default)]
    pub comment: String,
}

impl AnswerEntry {
    pub fn new(question_id: QuestionId, score: Option<i32>, comment: impl Into<String>) -> Self {
        Self {
            question_id,
            score,
            comment: comment.into(),
        }
    }
}

/// One entry that could not be stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryFailure {
    pub question_id: QuestionId,
    pub reason: String,
}

/// Aggregate outcome of a ledger call. Entries fail independently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LedgerReport {
    /// Questions whose row was written.
    pub applied: Vec<QuestionId>,
    /// Questions that already had a row and were left alone.
    pub skipped: Vec<QuestionId>,
    /// Questions whose write failed.
    pub failed: Vec<EntryFailure>,
}

impl LedgerReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Number of entries the call handled, whatever the outcome.
    pub fn total(&self) -> usize {
        self.applied.len() + self.skipped.len() + self.failed.len()
    }
}

/// Mean of the scored answers, ignoring unscored ones.
pub fn mean_score(answers: &[Answer]) -> Option<f64> {
    let scores: Vec<f64> = answers
        .iter()
        .filter_map(|a| a.score)
        .map(f64::from)
        .collect();
    if scores.is_empty() {
        None
    } else {
        Some(scores.iter().sum::<f64>() / scores.len() as f64)
    }
}
