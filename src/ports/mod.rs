//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the review core and the outside world. Adapters implement these ports.
//!
//! ## Persistence Ports
//!
//! - `ResponseRepository` - Response versions, with conditional version creation
//! - `AnswerRepository` - Per-question answers keyed by (response, question)
//! - `LockStore` - Atomic check-and-set storage for edit locks
//!
//! ## Collaborator Ports
//!
//! - `ResponseMapReader` - Maps owned by the assignment subsystem
//! - `ReviewerDirectory` - Reviewer-of-record resolution (capability check)
//! - `DeviationScorer` - Significance test and reference aggregate
//! - `EventPublisher` - Notification delivery
//! - `Clock` - Current time

mod answer_repository;
mod clock;
mod deviation_scorer;
mod event_publisher;
mod lock_store;
mod response_map_reader;
mod response_repository;

pub use answer_repository::AnswerRepository;
pub use clock::{Clock, SystemClock};
pub use deviation_scorer::DeviationScorer;
pub use event_publisher::EventPublisher;
pub use lock_store::LockStore;
pub use response_map_reader::{ResponseMapReader, ReviewerDirectory};
pub use response_repository::{ResponseRepository, VersionInsert};
