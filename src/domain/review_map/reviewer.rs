//! Resolved reviewer of record.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{TeamId, UserId};

/// Who is accountable for the responses filed under a map.
///
/// Resolution may legitimately find nobody (the participant left, the team
/// was disbanded); that case is explicit rather than an absent value, and it
/// never grants access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReviewerOfRecord {
    /// The reviewer reference no longer resolves to anyone.
    Unassigned,
    /// A single participant reviews.
    Individual { user_id: UserId },
    /// A team reviews; any member may act on its behalf.
    Team { team_id: TeamId, members: Vec<UserId> },
}

impl ReviewerOfRecord {
    /// Returns true if `caller` may act as this reviewer.
    pub fn includes(&self, caller: &UserId) -> bool {
        match self {
            ReviewerOfRecord::Unassigned => false,
            ReviewerOfRecord::Individual { user_id } => user_id == caller,
            ReviewerOfRecord::Team { members, .. } => members.contains(caller),
        }
    }

    pub fn is_team(&self) -> bool {
        matches!(self, ReviewerOfRecord::Team { .. })
    }
}
