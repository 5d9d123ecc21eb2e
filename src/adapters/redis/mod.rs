//! Redis adapters.

mod lock_store;

pub use lock_store::{RedisLockStore, DEFAULT_KEY_PREFIX};
