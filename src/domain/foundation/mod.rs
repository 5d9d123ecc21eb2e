//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, errors and event plumbing
//! that form the vocabulary of the review domain.

mod command;
mod errors;
mod events;
mod ids;
mod state_machine;
mod timestamp;

pub use command::CommandMetadata;
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use events::{DomainEvent, EventEnvelope, EventId, EventMetadata, SerializableDomainEvent};
pub use ids::{
    AssignmentId, MapId, QuestionId, ResponseId, RevieweeId, ReviewerId, TeamId, UserId,
};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
