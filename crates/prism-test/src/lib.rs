//! PRISM Test Harness - simulated ledger and end-to-end scenarios
//!
//! This crate provides:
//! - A seeded in-memory ledger that resolves indices and accepts commands
//! - Scenario runs of the viewer with rendered-tree invariant checks

pub mod ledger;
pub mod scenario;

pub use ledger::*;
pub use scenario::*;
