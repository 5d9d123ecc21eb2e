//! Peer Review Core - Collaborative review responses
//!
//! Team-safe editing of review responses: exclusive edit locks with passive
//! expiry, per-round versioning, a draft/submitted lifecycle and a deviation
//! check that notifies instructors when a submission strays from its peers.

pub mod adapters;
pub mod application;
pub mod bootstrap;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;

pub use bootstrap::{Adapters, BootstrapError, InMemoryAdapters, ReviewCore};
