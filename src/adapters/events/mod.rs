//! Event bus adapters.
//!
//! - `InMemoryEventBus` - in-process capture for tests and the memory backend
//!
//! The PostgreSQL outbox lives with the other PostgreSQL adapters.

mod in_memory;

pub use in_memory::InMemoryEventBus;
