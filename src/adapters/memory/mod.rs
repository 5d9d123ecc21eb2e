//! In-memory adapters for tests and single-process deployments.

mod answer_repository;
mod lock_store;
mod map_directory;
mod response_repository;

pub use answer_repository::InMemoryAnswerRepository;
pub use lock_store::InMemoryLockStore;
pub use map_directory::InMemoryMapDirectory;
pub use response_repository::InMemoryResponseRepository;
