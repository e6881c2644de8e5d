//! Status classification.
//!
//! | installed record | present in every tool | fingerprint | state     |
//! |------------------|-----------------------|-------------|-----------|
//! | none             | any                   | any         | available |
//! | some             | no                    | any         | available |
//! | some             | yes                   | equal       | installed |
//! | some             | yes                   | differs     | outdated  |
//!
//! A descriptor referencing unset environment is displayed as
//! `missingEnvironment` whatever its state; the state is still computed and
//! used once the operator overrides the warning.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::types::Project;
use crate::component::{Catalog, ComponentId, Descriptor, Payload};
use crate::document::{events, keyed};
use crate::env::{EnvProbe, missing_for};
use crate::hooks::translate;
use crate::tracker::TrackerRecord;
use crate::util::hash::fingerprint;

/// Install state derived from tracker, project files and fingerprints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum InstallState {
  Available,
  Installed,
  Outdated,
}

/// Displayed status of a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Status {
  Available,
  Installed,
  Outdated,
  MissingEnvironment,
}

impl Status {
  pub fn as_str(self) -> &'static str {
    match self {
      Status::Available => "available",
      Status::Installed => "installed",
      Status::Outdated => "outdated",
      Status::MissingEnvironment => "missingEnvironment",
    }
  }
}

impl std::fmt::Display for Status {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
  pub state: InstallState,
  /// Required environment variables that are unset.
  pub missing_env: BTreeSet<String>,
}

impl Classification {
  pub fn status(&self) -> Status {
    if !self.missing_env.is_empty() {
      return Status::MissingEnvironment;
    }
    match self.state {
      InstallState::Available => Status::Available,
      InstallState::Installed => Status::Installed,
      InstallState::Outdated => Status::Outdated,
    }
  }
}

/// Whether `descriptor` is materialized in every target tool of `project`.
///
/// A hook that translates to nothing for a tool is trivially present there.
pub fn is_present(descriptor: &Descriptor, project: &Project) -> bool {
  if project.tools.is_empty() {
    return false;
  }

  let name = descriptor.name();
  project.tools.iter().all(|&tool| match &descriptor.payload {
    Payload::File { .. } => tool
      .file_target(&project.root, descriptor.category(), name)
      .is_some_and(|target| target.exists()),
    Payload::Hook(config) => {
      translate(config, tool).is_empty() || events::has(&tool.hooks_document(&project.root).read_section(), name)
    }
    Payload::McpServer(_) => keyed::has(&tool.mcp_document(&project.root).read_section(), name),
  })
}

/// Classify one descriptor.
pub fn classify(descriptor: &Descriptor, record: &TrackerRecord, project: &Project, env: &dyn EnvProbe) -> Classification {
  let missing_env = missing_for(descriptor, env);

  let state = match record.lookup(&descriptor.id) {
    Some(entry) if is_present(descriptor, project) => match fingerprint(&descriptor.payload) {
      Some(current) if current == entry.fingerprint => InstallState::Installed,
      // An unreadable source cannot be confirmed, treat it as changed
      _ => InstallState::Outdated,
    },
    _ => InstallState::Available,
  };

  Classification { state, missing_env }
}

/// One row of a status listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentStatus {
  pub id: ComponentId,
  pub status: Status,
  pub state: InstallState,
  #[serde(skip_serializing_if = "BTreeSet::is_empty")]
  pub missing_env: BTreeSet<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub installed_at: Option<DateTime<Utc>>,
  pub dependency: bool,
}

/// Status of every catalog descriptor, in category then catalog order.
pub fn status(catalog: &Catalog, project: &Project, env: &dyn EnvProbe) -> Vec<ComponentStatus> {
  let record = project.tracker().read();

  let mut rows: Vec<ComponentStatus> = catalog
    .iter()
    .map(|descriptor| {
      let classification = classify(descriptor, &record, project, env);
      let entry = record.lookup(&descriptor.id);
      ComponentStatus {
        id: descriptor.id.clone(),
        status: classification.status(),
        state: classification.state,
        missing_env: classification.missing_env,
        installed_at: entry.map(|e| e.installed_at),
        dependency: entry.is_some_and(|e| e.dependency),
      }
    })
    .collect();

  rows.sort_by_key(|row| row.id.category);
  rows
}
