use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::component::ComponentId;
use crate::document::DocumentError;
use crate::tools::{Tool, detect_targets};
use crate::tracker::{Tracker, TrackerError};

/// A target project and the tools a sync writes for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
  pub root: PathBuf,
  pub tools: BTreeSet<Tool>,
}

impl Project {
  pub fn new(root: impl Into<PathBuf>, tools: impl IntoIterator<Item = Tool>) -> Self {
    Self {
      root: root.into(),
      tools: tools.into_iter().collect(),
    }
  }

  /// Target the tools detected under `root`, or `fallback` when none is.
  pub fn detect(root: &Path, fallback: &[Tool]) -> Self {
    let mut tools = detect_targets(root);
    if tools.is_empty() {
      debug!(root = %root.display(), fallback = ?fallback, "no tool detected, using defaults");
      tools.extend(fallback.iter().copied());
    }
    Self {
      root: root.to_path_buf(),
      tools,
    }
  }

  pub fn tracker(&self) -> Tracker {
    Tracker::for_project(&self.root)
  }
}

/// Options for applying a sync plan.
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
  /// Descriptors to install even though they reference unset environment.
  pub env_overrides: BTreeSet<ComponentId>,

  /// Remove orphaned dependencies instead of keeping them.
  pub remove_orphans: bool,

  /// Compute the report without touching the project.
  pub dry_run: bool,
}

/// A descriptor whose install, update or removal failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncFailure {
  pub id: ComponentId,
  pub message: String,
}

/// Outcome of a sync.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
  pub installed: Vec<ComponentId>,
  pub updated: Vec<ComponentId>,
  pub removed: Vec<ComponentId>,
  pub failed: Vec<SyncFailure>,

  /// Not installed because of missing environment and no override.
  pub skipped_env: Vec<ComponentId>,

  /// Pre-existing files moved aside before being overwritten.
  pub backups: Vec<PathBuf>,

  pub dry_run: bool,
}

impl SyncReport {
  /// Returns true if nothing was (or would be) changed.
  pub fn is_empty(&self) -> bool {
    self.installed.is_empty() && self.updated.is_empty() && self.removed.is_empty()
  }

  pub fn has_failures(&self) -> bool {
    !self.failed.is_empty()
  }
}

#[derive(Debug, Error)]
pub enum SyncError {
  /// The tracker directory cannot be created; nothing was changed.
  #[error("cannot use tracker location: {0}")]
  TrackerLocation(#[source] TrackerError),

  #[error("source missing: {}", path.display())]
  MissingSource { path: PathBuf },

  #[error("component not in catalog: {0}")]
  UnknownComponent(ComponentId),

  #[error("failed to {action} {}: {source}", path.display())]
  Io {
    action: &'static str,
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error(transparent)]
  Document(#[from] DocumentError),

  #[error(transparent)]
  Tracker(#[from] TrackerError),
}
