//! Response repository port (write side).
//!
//! # Design
//!
//! - **Conditional creation**: new versions are inserted only if the caller's
//!   view of the latest version is still accurate, so racing creators
//!   converge on one version instead of each creating their own.
//! - **Map-scoped**: versions are always looked up by map and round.
//! - **Column-scoped writes**: there is no whole-row update. The submitted
//!   flag only moves through `mark_submitted`, a compare-and-set, so a
//!   caller holding a stale copy can never write a draft back.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, MapId, ResponseId, Timestamp};
use crate::domain::response::{Response, Visibility};

/// Outcome of a conditional version insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionInsert {
    /// The candidate was stored.
    Inserted(Response),
    /// Another caller created a version first; this is the current one.
    Superseded(Response),
}

/// Repository port for Response persistence.
#[async_trait]
pub trait ResponseRepository: Send + Sync {
    /// Insert `candidate` as a new version of its (map, round) unless the
    /// current version is no longer `expected_latest`.
    ///
    /// Implementations must perform the check and the insert atomically with
    /// respect to other inserts for the same map.
    async fn insert_version(
        &self,
        candidate: &Response,
        expected_latest: Option<ResponseId>,
    ) -> Result<VersionInsert, DomainError>;

    /// Write the draft comment and `updated_at` of `response`.
    ///
    /// Touches no other column and only applies while the stored response is
    /// still a draft. Returns `false` when it was already submitted.
    ///
    /// # Errors
    ///
    /// - `ResponseNotFound` if the response doesn't exist
    async fn save_comment(&self, response: &Response) -> Result<bool, DomainError>;

    /// Flip the stored response from draft to submitted, writing the final
    /// comment and `updated_at` of `response` in the same step.
    ///
    /// Returns `true` only for the caller whose write performed the
    /// transition; every later or concurrent caller gets `false`.
    ///
    /// # Errors
    ///
    /// - `ResponseNotFound` if the response doesn't exist
    async fn mark_submitted(&self, response: &Response) -> Result<bool, DomainError>;

    /// Change only the visibility column.
    ///
    /// # Errors
    ///
    /// - `ResponseNotFound` if the response doesn't exist
    async fn set_visibility(
        &self,
        id: &ResponseId,
        visibility: Visibility,
        updated_at: Timestamp,
    ) -> Result<(), DomainError>;

    /// Find a response by its ID.
    async fn find_by_id(&self, id: &ResponseId) -> Result<Option<Response>, DomainError>;

    /// All versions filed for a map in a round (`None` = not round-scoped).
    async fn find_by_map_and_round(
        &self,
        map_id: &MapId,
        round: Option<u32>,
    ) -> Result<Vec<Response>, DomainError>;

    /// Physically delete a response. Deleting a missing response is not an error.
    async fn delete(&self, id: &ResponseId) -> Result<(), DomainError>;
}
