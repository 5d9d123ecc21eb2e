//! Response command and query handlers.

mod delete_response;
mod get_response;
mod open_for_edit;
mod release_lock;
mod save_draft;
mod submit_response;
mod toggle_visibility;

#[cfg(test)]
mod testing;

pub use delete_response::{DeleteResponseCommand, DeleteResponseHandler, DeleteResponseResult};
pub use get_response::{GetResponseHandler, GetResponseQuery, ResponseView};
pub use open_for_edit::{LockState, OpenForEditCommand, OpenForEditHandler, OpenForEditResult};
pub use release_lock::{ReleaseLockCommand, ReleaseLockHandler, ReleaseLockResult};
pub use save_draft::{SaveDraftCommand, SaveDraftHandler, SaveDraftResult};
pub use submit_response::{SubmitResponseCommand, SubmitResponseHandler, SubmitResponseResult};
pub use toggle_visibility::{ToggleVisibilityCommand, ToggleVisibilityHandler, ToggleVisibilityResult};
