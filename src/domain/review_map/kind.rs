//! Map kinds and their capability table.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// The kind of evaluation relationship a map represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapKind {
    /// Peer review of another team's submission.
    Review,
    /// A participant reviewing their own work.
    SelfReview,
    /// Review of a review.
    MetaReview,
    /// Teammate evaluation.
    Teammate,
    /// Author feedback on a review they received.
    Feedback,
    /// Course, assignment or global survey.
    Survey,
    /// Rating of a bookmarked resource.
    Bookmark,
}

/// What a map kind is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindCapabilities {
    /// Submissions are compared against sibling reviews of the same reviewee.
    pub triggers_deviation_check: bool,
    /// The rubric may be chosen by the reviewee's duty on duty-based assignments.
    pub uses_duty_questionnaire: bool,
}

impl MapKind {
    /// All kinds, in declaration order.
    pub const ALL: [MapKind; 7] = [
        MapKind::Review,
        MapKind::SelfReview,
        MapKind::MetaReview,
        MapKind::Teammate,
        MapKind::Feedback,
        MapKind::Survey,
        MapKind::Bookmark,
    ];

    /// Returns the capability row for this kind.
    pub fn capabilities(&self) -> KindCapabilities {
        match self {
            MapKind::Review => KindCapabilities {
                triggers_deviation_check: true,
                uses_duty_questionnaire: false,
            },
            MapKind::SelfReview => KindCapabilities {
                triggers_deviation_check: false,
                uses_duty_questionnaire: false,
            },
            MapKind::MetaReview
            | MapKind::Teammate
            | MapKind::Feedback
            | MapKind::Survey
            | MapKind::Bookmark => KindCapabilities {
                triggers_deviation_check: false,
                uses_duty_questionnaire: true,
            },
        }
    }

    pub fn triggers_deviation_check(&self) -> bool {
        self.capabilities().triggers_deviation_check
    }

    pub fn uses_duty_questionnaire(&self) -> bool {
        self.capabilities().uses_duty_questionnaire
    }

    /// Stable storage name.
    pub fn as_str(&self) -> &'static str {
        match self {
            MapKind::Review => "review",
            MapKind::SelfReview => "self_review",
            MapKind::MetaReview => "meta_review",
            MapKind::Teammate => "teammate",
            MapKind::Feedback => "feedback",
            MapKind::Survey => "survey",
            MapKind::Bookmark => "bookmark",
        }
    }
}

impl fmt::Display for MapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MapKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MapKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ValidationError::invalid_format("map_kind", format!("unknown kind '{}'", s)))
    }
}
