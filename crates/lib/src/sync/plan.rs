//! Sync planning.
//!
//! Planning is pure: it reads the tracker record and the project files but
//! changes nothing, so the whole plan is known before the first write.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, warn};

use super::status::{InstallState, classify};
use super::types::Project;
use crate::component::{Catalog, ComponentId};
use crate::env::EnvProbe;
use crate::resolve::{compute_orphans, expand_selection};
use crate::tracker::TrackerRecord;

/// What a sync does to one descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeKind {
  Install,
  Update,
  Unchanged,
  /// Tracked but no longer selected, or gone from the catalog.
  Remove,
  /// A former dependency nothing selected needs anymore. Removed on request only.
  Orphan,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedChange {
  pub id: ComponentId,
  pub kind: ChangeKind,

  /// Selected only as part of the dependency closure.
  pub dependency: bool,

  #[serde(skip_serializing_if = "BTreeSet::is_empty")]
  pub missing_env: BTreeSet<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPlan {
  /// The direct selection.
  pub selection: BTreeSet<ComponentId>,

  /// The selection's dependency closure.
  pub expanded: BTreeSet<ComponentId>,

  /// Every change in application order.
  pub changes: Vec<PlannedChange>,

  /// Selected ids missing from the catalog.
  pub unknown: Vec<ComponentId>,
}

impl SyncPlan {
  pub fn of_kind(&self, kind: ChangeKind) -> impl Iterator<Item = &PlannedChange> {
    self.changes.iter().filter(move |c| c.kind == kind)
  }

  pub fn orphans(&self) -> impl Iterator<Item = &ComponentId> {
    self.of_kind(ChangeKind::Orphan).map(|c| &c.id)
  }

  /// Changes that would install or update despite missing environment.
  pub fn needs_env_override(&self) -> impl Iterator<Item = &PlannedChange> {
    self
      .changes
      .iter()
      .filter(|c| matches!(c.kind, ChangeKind::Install | ChangeKind::Update) && !c.missing_env.is_empty())
  }

  /// Returns true if applying the plan would change nothing.
  pub fn is_empty(&self) -> bool {
    self.changes.iter().all(|c| c.kind == ChangeKind::Unchanged)
  }
}

/// Plan a sync of `selection` against the current project state.
pub fn plan_sync(
  catalog: &Catalog,
  selection: &BTreeSet<ComponentId>,
  record: &TrackerRecord,
  project: &Project,
  env: &dyn EnvProbe,
) -> SyncPlan {
  let unknown: Vec<ComponentId> = selection.iter().filter(|id| !catalog.contains(id)).cloned().collect();
  for id in &unknown {
    warn!(id = %id, "selected component is not in the catalog");
  }

  let expanded = expand_selection(selection, catalog);
  let tracked = record.tracked_ids();
  let orphans = compute_orphans(&tracked, &expanded, &record.direct_selection());

  let mut changes = Vec::new();

  for id in &expanded {
    let Some(descriptor) = catalog.get(id) else {
      continue;
    };
    let classification = classify(descriptor, record, project, env);
    let kind = match classification.state {
      InstallState::Available => ChangeKind::Install,
      InstallState::Outdated => ChangeKind::Update,
      InstallState::Installed => ChangeKind::Unchanged,
    };
    changes.push(PlannedChange {
      id: id.clone(),
      kind,
      dependency: !selection.contains(id),
      missing_env: classification.missing_env,
    });
  }

  for id in tracked.difference(&expanded) {
    // Vanished descriptors cannot be kept around as orphans
    let kind = if orphans.contains(id) && catalog.contains(id) {
      ChangeKind::Orphan
    } else {
      ChangeKind::Remove
    };
    changes.push(PlannedChange {
      id: id.clone(),
      kind,
      dependency: record.lookup(id).is_some_and(|e| e.dependency),
      missing_env: BTreeSet::new(),
    });
  }

  changes.sort_by_key(|c| (c.id.category, catalog.position(&c.id).unwrap_or(usize::MAX), c.id.name.clone()));

  debug!(
    install = changes.iter().filter(|c| c.kind == ChangeKind::Install).count(),
    update = changes.iter().filter(|c| c.kind == ChangeKind::Update).count(),
    remove = changes.iter().filter(|c| c.kind == ChangeKind::Remove).count(),
    orphan = changes.iter().filter(|c| c.kind == ChangeKind::Orphan).count(),
    "sync planned"
  );

  SyncPlan {
    selection: selection.clone(),
    expanded,
    changes,
    unknown,
  }
}
