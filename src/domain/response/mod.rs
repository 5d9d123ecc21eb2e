//! Response domain module.
//!
//! A response is one version of a reviewer's filled-in rubric for a map and
//! round. This module holds the aggregate, its Draft → Submitted lifecycle,
//! the version resolution rules and the typed errors every response
//! operation reports.
//!
//! # Events
//!
//! - `ResponseSubmitted` - Published on the Draft → Submitted edge
//! - `ResponseDeleted` - Published when a version is deleted

mod aggregate;
mod errors;
mod events;
mod status;
pub mod versioning;

pub use aggregate::{Response, SubmitTransition, Visibility, MAX_COMMENT_LENGTH};
pub use errors::ResponseError;
pub use events::{ResponseDeleted, ResponseSubmitted};
pub use status::ResponseStatus;
pub use versioning::{VersionDecision, VersionRequest};
