//! Response aggregate: one submittable artifact for a map and round.
//!
//! # Ownership
//!
//! Responses reference their map by ID; answers reference the response by
//! ID and live in the answer ledger.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{ResponseError, ResponseStatus};
use crate::domain::foundation::{MapId, ResponseId, StateMachine, Timestamp, ValidationError};

/// Maximum length of the reviewer's free-text comment.
pub const MAX_COMMENT_LENGTH: usize = 20_000;

/// Who may see a response besides its reviewers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Private,
    InReview,
    Public,
    Published,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Private => "private",
            Visibility::InReview => "in_review",
            Visibility::Public => "public",
            Visibility::Published => "published",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "private" => Ok(Visibility::Private),
            "in_review" => Ok(Visibility::InReview),
            "public" => Ok(Visibility::Public),
            "published" => Ok(Visibility::Published),
            other => Err(ValidationError::invalid_format(
                "visibility",
                format!("unknown visibility '{}'", other),
            )),
        }
    }
}

/// Outcome of asking a response to submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitTransition {
    /// Draft became Submitted just now.
    Submitted,
    /// Already submitted; nothing changed.
    AlreadySubmitted,
}

/// Response aggregate.
///
/// # Invariants
///
/// - `status` only moves Draft → Submitted
/// - comment changes are rejected once submitted
/// - visibility can change in any status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    id: ResponseId,
    map_id: MapId,
    /// `None` means the response is not tied to a round.
    round: Option<u32>,
    /// Version ordinal as stored; legacy rows may hold non-numeric text or nothing.
    version_num: Option<String>,
    status: ResponseStatus,
    additional_comment: String,
    visibility: Visibility,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Response {
    /// Creates a fresh draft with an empty comment.
    pub fn new_draft(
        id: ResponseId,
        map_id: MapId,
        round: Option<u32>,
        ordinal: u32,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            map_id,
            round,
            version_num: Some(ordinal.to_string()),
            status: ResponseStatus::Draft,
            additional_comment: String::new(),
            visibility: Visibility::default(),
            created_at,
            updated_at: created_at,
        }
    }

    /// Reconstitute a response from persistence (no validation).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: ResponseId,
        map_id: MapId,
        round: Option<u32>,
        version_num: Option<String>,
        status: ResponseStatus,
        additional_comment: String,
        visibility: Visibility,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id,
            map_id,
            round,
            version_num,
            status,
            additional_comment,
            visibility,
            created_at,
            updated_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &ResponseId {
        &self.id
    }

    pub fn map_id(&self) -> &MapId {
        &self.map_id
    }

    pub fn round(&self) -> Option<u32> {
        self.round
    }

    pub fn version_num(&self) -> Option<&str> {
        self.version_num.as_deref()
    }

    /// The version ordinal, if the stored value parses as a number.
    pub fn version_ordinal(&self) -> Option<u32> {
        self.version_num
            .as_deref()
            .and_then(|raw| raw.trim().parse::<u32>().ok())
    }

    pub fn status(&self) -> ResponseStatus {
        self.status
    }

    pub fn is_submitted(&self) -> bool {
        self.status.is_submitted()
    }

    pub fn additional_comment(&self) -> &str {
        &self.additional_comment
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Fails with `AlreadySubmitted` unless the response is still a draft.
    pub fn ensure_editable(&self) -> Result<(), ResponseError> {
        if self.status.accepts_edits() {
            Ok(())
        } else {
            Err(ResponseError::AlreadySubmitted)
        }
    }

    /// Replace the reviewer's comment.
    ///
    /// # Errors
    ///
    /// - `AlreadySubmitted` if the response was submitted
    /// - `ValidationFailed` if the comment is too long
    pub fn edit_comment(&mut self, comment: String, now: Timestamp) -> Result<(), ResponseError> {
        self.ensure_editable()?;
        if comment.chars().count() > MAX_COMMENT_LENGTH {
            return Err(ResponseError::validation(
                "additional_comment",
                format!("must be at most {} characters", MAX_COMMENT_LENGTH),
            ));
        }
        self.additional_comment = comment;
        self.updated_at = now;
        Ok(())
    }

    /// Move to `Submitted`. Idempotent: a submitted response stays as is.
    pub fn submit(&mut self, now: Timestamp) -> SubmitTransition {
        match self.status.transition_to(ResponseStatus::Submitted) {
            Ok(next) => {
                self.status = next;
                self.updated_at = now;
                SubmitTransition::Submitted
            }
            Err(_) => SubmitTransition::AlreadySubmitted,
        }
    }

    /// Change visibility; allowed regardless of submission state.
    ///
    /// Returns the previous visibility.
    pub fn set_visibility(&mut self, visibility: Visibility, now: Timestamp) -> Visibility {
        let previous = std::mem::replace(&mut self.visibility, visibility);
        if previous != visibility {
            self.updated_at = now;
        }
        previous
    }
}
