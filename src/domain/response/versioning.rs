//! Round-scoped version resolution.
//!
//! Pure decision logic for the version store: which of the versions filed for
//! a (map, round) pair is current, and whether an edit continues it or must
//! start a new version.

use std::cmp::Ordering;

use super::Response;
use crate::domain::foundation::ResponseId;

/// Orders versions most-recent first.
///
/// Higher numeric ordinals come first. A version whose ordinal is missing or
/// does not parse sorts after every version that has one. Remaining ties go
/// to the most recently created.
pub fn recency_order(a: &Response, b: &Response) -> Ordering {
    let by_creation = || b.created_at().cmp(a.created_at());
    match (a.version_ordinal(), b.version_ordinal()) {
        (Some(x), Some(y)) => y.cmp(&x).then_with(by_creation),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => by_creation(),
    }
}

/// Sorts in place, most recent first.
pub fn sort_most_recent_first(versions: &mut [Response]) {
    versions.sort_by(recency_order);
}

/// Returns the current version, if any exist.
pub fn current_version(versions: &[Response]) -> Option<&Response> {
    versions.iter().min_by(|a, b| recency_order(a, b))
}

/// Ordinal to give a version created after `versions`.
pub fn next_ordinal(versions: &[Response]) -> u32 {
    versions
        .iter()
        .filter_map(Response::version_ordinal)
        .max()
        .map(|max| max.saturating_add(1))
        .unwrap_or_else(|| u32::try_from(versions.len()).unwrap_or(u32::MAX).saturating_add(1))
}

/// What the caller is asking the version store for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VersionRequest {
    /// The round permits more than one submission.
    pub resubmission_allowed: bool,
    /// The caller explicitly wants to start over after a submission.
    pub new_attempt: bool,
}

/// Resolution of a version request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionDecision<'a> {
    /// Continue with this existing version.
    UseExisting(&'a Response),
    /// Nothing exists yet for the (map, round); create version 1.
    CreateFirst,
    /// Chain a new version after the submitted `after`.
    CreateNext { ordinal: u32, after: ResponseId },
}

/// Decides how to satisfy `request` given the versions already on file.
pub fn decide(versions: &[Response], request: VersionRequest) -> VersionDecision<'_> {
    match current_version(versions) {
        None => VersionDecision::CreateFirst,
        Some(latest)
            if request.resubmission_allowed && request.new_attempt && latest.is_submitted() =>
        {
            VersionDecision::CreateNext {
                ordinal: next_ordinal(versions),
                after: *latest.id(),
            }
        }
        Some(latest) => VersionDecision::UseExisting(latest),
    }
}
