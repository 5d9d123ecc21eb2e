//! Application layer - Commands, Queries, Handlers and the services they compose.
//!
//! Handlers orchestrate domain operations and coordinate between ports.
//! Services hold the reusable pieces: version resolution, the answer ledger,
//! the lock manager, the deviation notifier and the reviewer check.

pub mod handlers;
pub mod services;

pub use handlers::response::{
    DeleteResponseCommand, DeleteResponseHandler, DeleteResponseResult, GetResponseHandler, GetResponseQuery,
    LockState, OpenForEditCommand, OpenForEditHandler, OpenForEditResult, ReleaseLockCommand, ReleaseLockHandler,
    ReleaseLockResult, ResponseView, SaveDraftCommand, SaveDraftHandler, SaveDraftResult, SubmitResponseCommand,
    SubmitResponseHandler, SubmitResponseResult, ToggleVisibilityCommand, ToggleVisibilityHandler,
    ToggleVisibilityResult,
};
