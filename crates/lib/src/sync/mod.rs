//! Sync orchestration.
//!
//! A sync brings a project in line with a selection of catalog descriptors:
//!
//! 1. Expand the direct selection to its dependency closure
//! 2. Classify every descriptor against the tracker and the project files
//! 3. Plan installs, updates, removals and orphans (pure, no side effects)
//! 4. Apply the plan sequentially, category by category, to every target tool
//! 5. Record fingerprints in the tracker and return a [`SyncReport`]
//!
//! Failures of single descriptors are reported and the run continues. Only an
//! unusable tracker location aborts, and it is checked before any mutation.

mod apply;
mod files;
mod plan;
mod status;
mod types;

pub use apply::apply_sync;
pub use files::{backup_path, install_path, remove_path};
pub use plan::{ChangeKind, PlannedChange, SyncPlan, plan_sync};
pub use status::{Classification, ComponentStatus, InstallState, Status, classify, is_present, status};
pub use types::{Project, SyncError, SyncFailure, SyncOptions, SyncReport};
