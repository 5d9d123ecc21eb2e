//! Response map ports (read side).
//!
//! Maps and the people behind a reviewer reference are owned by the
//! assignment subsystem. The core only reads them.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, MapId};
use crate::domain::review_map::{ResponseMap, ReviewerOfRecord};

/// Read access to response maps.
#[async_trait]
pub trait ResponseMapReader: Send + Sync {
    /// Find a map by its ID. Returns `None` if not found.
    async fn find_by_id(&self, id: &MapId) -> Result<Option<ResponseMap>, DomainError>;

    /// Maps reviewing the same reviewee, in the same assignment, with the
    /// same kind as `map` (excluding `map` itself).
    async fn find_siblings(&self, map: &ResponseMap) -> Result<Vec<ResponseMap>, DomainError>;
}

/// Resolves a map's reviewer reference to the people who may act for it.
///
/// This is the outward capability check: "is the caller the reviewer, or a
/// member of the reviewing team?" is answered from what this returns.
#[async_trait]
pub trait ReviewerDirectory: Send + Sync {
    /// Resolve the reviewer of record. A dangling reference resolves to
    /// `ReviewerOfRecord::Unassigned`, never to an error.
    async fn resolve(&self, map: &ResponseMap) -> Result<ReviewerOfRecord, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_map_reader_is_object_safe() {
        fn _accepts_dyn(_reader: &dyn ResponseMapReader) {}
    }

    #[test]
    fn reviewer_directory_is_object_safe() {
        fn _accepts_dyn(_directory: &dyn ReviewerDirectory) {}
    }
}
