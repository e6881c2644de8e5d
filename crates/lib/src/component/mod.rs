//! Component descriptors and the catalog they are collected into.
//!
//! A descriptor is one distributable unit (skill, command, agent, hook or MCP
//! server). Descriptors are built once per run from the repository scan and are
//! never persisted themselves; only their fingerprints end up in the tracker.

pub mod scan;
mod types;

pub use scan::{ScanError, scan};
pub use types::*;
