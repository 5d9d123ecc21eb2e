//! Application services composed by the response handlers.

mod answer_ledger;
mod deviation_notifier;
mod lock_manager;
mod review_access;
mod version_store;

pub use answer_ledger::AnswerLedger;
pub use deviation_notifier::{DeviationNotifier, DeviationReport};
pub use lock_manager::LockManager;
pub use review_access::{ReviewAccess, ReviewContext};
pub use version_store::VersionStore;
