//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, events)
//! - `review_map` - Reviewer ↔ reviewee pairings and map kinds
//! - `response` - Response versions, submission lifecycle, version resolution
//! - `answer` - Per-question scores and ledger reports
//! - `lock` - Timeout-bounded edit locks
//! - `deviation` - Deviation guard and notification event

pub mod answer;
pub mod deviation;
pub mod foundation;
pub mod lock;
pub mod response;
pub mod review_map;
