//! Installed-state tracker.
//!
//! A per-project record of which descriptors agentkit installed and the
//! fingerprint each had at install time. It is advisory: it never decides
//! whether a file exists, only why an existing one differs from the catalog.
//!
//! # Storage Layout
//!
//! ```text
//! <project>/.agentkit/
//! └── installed.json      # TrackerRecord, whole-document replace on save
//! ```

mod storage;
mod types;

pub use storage::*;
pub use types::*;
