//! Response lifecycle status.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// Submission state of a response version.
///
/// `Draft` → `Submitted` is the only transition; `Submitted` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    #[default]
    Draft,
    Submitted,
}

impl ResponseStatus {
    pub fn is_submitted(&self) -> bool {
        matches!(self, ResponseStatus::Submitted)
    }

    /// Content (comment, answers) may only change while drafting.
    pub fn accepts_edits(&self) -> bool {
        matches!(self, ResponseStatus::Draft)
    }
}

impl StateMachine for ResponseStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        matches!(
            (self, target),
            (ResponseStatus::Draft, ResponseStatus::Submitted)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        match self {
            ResponseStatus::Draft => vec![ResponseStatus::Submitted],
            ResponseStatus::Submitted => vec![],
        }
    }
}
