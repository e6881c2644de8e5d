use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, warn};

use super::types::{InstalledEntry, TrackerError, TrackerRecord};
use crate::component::{ComponentId, Descriptor};
use crate::consts::{STATE_DIR, TRACKER_FILENAME, TRACKER_VERSION};
use crate::util::hash::ContentHash;

/// Reads and writes the tracker record of one project.
#[derive(Debug, Clone)]
pub struct Tracker {
  /// Directory holding the record (`<project>/.agentkit`).
  base_path: PathBuf,
}

impl Tracker {
  pub fn new(base_path: PathBuf) -> Self {
    Self { base_path }
  }

  /// Tracker for the project rooted at `project_root`.
  pub fn for_project(project_root: &Path) -> Self {
    Self::new(project_root.join(STATE_DIR))
  }

  pub fn base_path(&self) -> &Path {
    &self.base_path
  }

  pub fn path(&self) -> PathBuf {
    self.base_path.join(TRACKER_FILENAME)
  }

  /// Create the tracker directory.
  ///
  /// This is the only tracker failure that aborts a sync, and it must be
  /// checked before anything is mutated.
  pub fn ensure_location(&self) -> Result<(), TrackerError> {
    fs::create_dir_all(&self.base_path).map_err(|e| TrackerError::CreateDir {
      path: self.base_path.clone(),
      source: e,
    })
  }

  /// Load the record.
  ///
  /// A missing, unreadable, corrupt, or unknown-version file yields an empty
  /// record. The next write replaces it.
  pub fn read(&self) -> TrackerRecord {
    let path = self.path();

    let content = match fs::read_to_string(&path) {
      Ok(content) => content,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return TrackerRecord::new(),
      Err(e) => {
        warn!(path = %path.display(), error = %e, "tracker unreadable, starting empty");
        return TrackerRecord::new();
      }
    };

    let record: TrackerRecord = match serde_json::from_str(&content) {
      Ok(record) => record,
      Err(e) => {
        warn!(path = %path.display(), error = %e, "tracker corrupt, starting empty");
        return TrackerRecord::new();
      }
    };

    if record.version != TRACKER_VERSION {
      warn!(
        path = %path.display(),
        version = record.version,
        expected = TRACKER_VERSION,
        "unsupported tracker version, starting empty"
      );
      return TrackerRecord::new();
    }

    record
  }

  /// Replace the record on disk.
  ///
  /// Uses atomic write (write to temp, then rename) to prevent corruption.
  pub fn write(&self, record: &TrackerRecord) -> Result<(), TrackerError> {
    self.ensure_location()?;

    let path = self.path();
    let temp_path = self.base_path.join(format!("{TRACKER_FILENAME}.tmp"));

    let mut content = serde_json::to_string_pretty(record).map_err(TrackerError::Serialize)?;
    content.push('\n');
    fs::write(&temp_path, &content).map_err(|e| TrackerError::Write {
      path: temp_path.clone(),
      source: e,
    })?;
    fs::rename(&temp_path, &path).map_err(|e| TrackerError::Write {
      path: path.clone(),
      source: e,
    })?;

    debug!(path = %path.display(), "tracker written");
    Ok(())
  }

  pub fn lookup(&self, id: &ComponentId) -> Option<InstalledEntry> {
    self.read().lookup(id).cloned()
  }

  /// Record a successful install or update of `descriptor`.
  pub fn record_install(
    &self,
    descriptor: &Descriptor,
    fingerprint: ContentHash,
    dependency: bool,
  ) -> Result<InstalledEntry, TrackerError> {
    let entry = InstalledEntry {
      fingerprint,
      installed_at: Utc::now(),
      source_reference: descriptor.source_reference.clone(),
      dependency,
    };

    let mut record = self.read();
    record.insert(&descriptor.id, entry.clone());
    self.write(&record)?;

    debug!(id = %descriptor.id, fingerprint = %entry.fingerprint, "recorded install");
    Ok(entry)
  }

  /// Change only the dependency flag of an already tracked entry.
  pub fn record_dependency_flag(&self, id: &ComponentId, dependency: bool) -> Result<(), TrackerError> {
    let mut record = self.read();
    let Some(entry) = record.lookup_mut(id) else {
      return Ok(());
    };
    if entry.dependency == dependency {
      return Ok(());
    }
    entry.dependency = dependency;
    self.write(&record)
  }

  /// Forget `id`. Returns whether it was tracked.
  pub fn record_removal(&self, id: &ComponentId) -> Result<bool, TrackerError> {
    let mut record = self.read();
    if record.remove(id).is_none() {
      return Ok(false);
    }
    self.write(&record)?;

    debug!(id = %id, "recorded removal");
    Ok(true)
  }
}
