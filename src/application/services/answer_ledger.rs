//! Answer Ledger - per-question scores and comments of a response version.
//!
//! Entries are independent: they are written concurrently and a failure on
//! one entry is reported without stopping the rest.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;

use crate::domain::answer::{Answer, AnswerEntry, EntryFailure, LedgerReport};
use crate::domain::foundation::{DomainError, QuestionId, ResponseId};
use crate::ports::AnswerRepository;

pub struct AnswerLedger {
    answers: Arc<dyn AnswerRepository>,
}

/// What happened to one entry.
enum Outcome {
    Applied(QuestionId),
    Skipped(QuestionId),
    Failed(QuestionId, DomainError),
}

impl AnswerLedger {
    pub fn new(answers: Arc<dyn AnswerRepository>) -> Self {
        Self { answers }
    }

    /// Create-or-overwrite each entry.
    ///
    /// When a question appears more than once, the last entry wins and the
    /// earlier ones are reported as skipped.
    pub async fn upsert_answers(&self, response_id: ResponseId, entries: Vec<AnswerEntry>) -> LedgerReport {
        let (entries, superseded) = collapse_duplicates(entries);

        let writes = entries.into_iter().map(|entry| {
            let answer = Answer::from_entry(response_id, entry);
            async move {
                match self.answers.upsert(&answer).await {
                    Ok(()) => Outcome::Applied(answer.question_id),
                    Err(e) => Outcome::Failed(answer.question_id, e),
                }
            }
        });

        let mut report = collect(response_id, join_all(writes).await);
        report.skipped.extend(superseded);
        report
    }

    /// Create blank rows for questions that have none yet. Existing rows are
    /// left untouched and reported as skipped.
    pub async fn initialize_blank(&self, response_id: ResponseId, question_ids: &[QuestionId]) -> LedgerReport {
        let mut seen = std::collections::HashSet::new();
        let inserts = question_ids
            .iter()
            .filter(|q| seen.insert(**q))
            .map(|question_id| {
                let answer = Answer::blank(response_id, *question_id);
                async move {
                    match self.answers.insert_if_absent(&answer).await {
                        Ok(true) => Outcome::Applied(answer.question_id),
                        Ok(false) => Outcome::Skipped(answer.question_id),
                        Err(e) => Outcome::Failed(answer.question_id, e),
                    }
                }
            });

        collect(response_id, join_all(inserts).await)
    }

    /// All answers of a response, ordered by question id.
    pub async fn answers_for(&self, response_id: &ResponseId) -> Result<Vec<Answer>, DomainError> {
        self.answers.find_by_response(response_id).await
    }

    pub async fn discard(&self, response_id: &ResponseId) -> Result<(), DomainError> {
        self.answers.delete_by_response(response_id).await
    }
}

/// Keeps the last entry per question, preserving first-seen order.
fn collapse_duplicates(entries: Vec<AnswerEntry>) -> (Vec<AnswerEntry>, Vec<QuestionId>) {
    let mut position: HashMap<QuestionId, usize> = HashMap::new();
    let mut kept: Vec<AnswerEntry> = Vec::with_capacity(entries.len());
    let mut superseded = Vec::new();

    for entry in entries {
        match position.get(&entry.question_id) {
            Some(&idx) => {
                superseded.push(entry.question_id);
                kept[idx] = entry;
            }
            None => {
                position.insert(entry.question_id, kept.len());
                kept.push(entry);
            }
        }
    }

    (kept, superseded)
}

fn collect(response_id: ResponseId, outcomes: Vec<Outcome>) -> LedgerReport {
    let mut report = LedgerReport::default();
    for outcome in outcomes {
        match outcome {
            Outcome::Applied(q) => report.applied.push(q),
            Outcome::Skipped(q) => report.skipped.push(q),
            Outcome::Failed(q, error) => {
                tracing::warn!(
                    response_id = %response_id,
                    question_id = %q,
                    error = %error,
                    "answer write failed"
                );
                report.failed.push(EntryFailure {
                    question_id: q,
                    reason: error.to_string(),
                });
            }
        }
    }
    report
}
