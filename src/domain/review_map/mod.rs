//! Review map domain module.
//!
//! Maps pair a reviewer of record with the entity under review. They are
//! created elsewhere; this module models what the response core needs to
//! know about them: the kind (and its capabilities) and whether the reviewer
//! is a team.

mod kind;
mod map;
mod reviewer;

pub use kind::{KindCapabilities, MapKind};
pub use map::ResponseMap;
pub use reviewer::ReviewerOfRecord;
