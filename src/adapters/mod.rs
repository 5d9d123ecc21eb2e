//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `memory` - In-process stores for tests and single-node runs
//! - `postgres` - PostgreSQL persistence and the event outbox
//! - `redis` - Shared edit locks across servers
//! - `events` - In-memory event bus
//! - `scoring` - Peer-average deviation scorer
//! - `clock` - System and manual clocks

pub mod clock;
pub mod events;
pub mod memory;
pub mod postgres;
pub mod redis;
pub mod scoring;

pub use clock::{ManualClock, SystemClock};
pub use events::InMemoryEventBus;
