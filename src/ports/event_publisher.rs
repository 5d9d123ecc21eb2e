//! EventPublisher port - Interface to the notification collaborator.
//!
//! Lifecycle events and deviation notifications leave the core through this
//! port without the core knowing how they are delivered (mail, queue, log).

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EventEnvelope};

/// Port for publishing domain events.
///
/// Publishing is best-effort from the core's point of view: callers log
/// failures and never roll back the state change that produced the event.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish a single event.
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError>;
}
