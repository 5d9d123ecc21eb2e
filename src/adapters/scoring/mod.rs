//! Deviation scoring adapters.

mod peer_average;

pub use peer_average::{DeviationPolicy, PeerAverageScorer};
