//! Deviation scoring port.
//!
//! Owns the statistics: how a submission is aggregated, what it is compared
//! against, and what counts as significant.

use async_trait::async_trait;

use crate::domain::answer::Answer;
use crate::domain::deviation::DeviationAssessment;
use crate::domain::foundation::DomainError;
use crate::domain::response::Response;
use crate::domain::review_map::ResponseMap;

#[async_trait]
pub trait DeviationScorer: Send + Sync {
    /// Compare a just-submitted response with its reference aggregate.
    ///
    /// Returns `None` when there is nothing to compare against (no scored
    /// answers, or no peers yet).
    async fn assess(
        &self,
        map: &ResponseMap,
        response: &Response,
        answers: &[Answer],
    ) -> Result<Option<DeviationAssessment>, DomainError>;
}
