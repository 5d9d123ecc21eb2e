//! Response map: the reviewer ↔ reviewee pairing responses are filed under.

use serde::{Deserialize, Serialize};

use super::MapKind;
use crate::domain::foundation::{AssignmentId, MapId, RevieweeId, ReviewerId};

/// Reviewer ↔ reviewee relationship record.
///
/// Owned by the assignment subsystem; this crate only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMap {
    id: MapId,
    assignment_id: AssignmentId,
    reviewer_id: ReviewerId,
    reviewee_id: RevieweeId,
    reviewer_is_team: bool,
    kind: MapKind,
}

impl ResponseMap {
    pub fn new(
        id: MapId,
        assignment_id: AssignmentId,
        reviewer_id: ReviewerId,
        reviewee_id: RevieweeId,
        reviewer_is_team: bool,
        kind: MapKind,
    ) -> Self {
        Self {
            id,
            assignment_id,
            reviewer_id,
            reviewee_id,
            reviewer_is_team,
            kind,
        }
    }

    pub fn id(&self) -> &MapId {
        &self.id
    }

    pub fn assignment_id(&self) -> &AssignmentId {
        &self.assignment_id
    }

    pub fn reviewer_id(&self) -> &ReviewerId {
        &self.reviewer_id
    }

    pub fn reviewee_id(&self) -> &RevieweeId {
        &self.reviewee_id
    }

    /// True when several people share this review and edits must be locked.
    pub fn reviewer_is_team(&self) -> bool {
        self.reviewer_is_team
    }

    pub fn kind(&self) -> MapKind {
        self.kind
    }

    /// Returns true if `other` reviews the same reviewee in the same way.
    pub fn is_sibling_of(&self, other: &ResponseMap) -> bool {
        self.id != other.id
            && self.assignment_id == other.assignment_id
            && self.reviewee_id == other.reviewee_id
            && self.kind == other.kind
    }
}
