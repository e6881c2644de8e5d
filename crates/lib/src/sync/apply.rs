//! Plan application.
//!
//! Changes are applied one at a time in plan order. Each document update is
//! its own read-modify-write; nothing is held open between descriptors. A
//! failing descriptor is logged at the point of failure and the run moves on;
//! writes already made for it are not rolled back.

use std::path::PathBuf;

use tracing::{debug, error, info, warn};

use super::files::{install_path, remove_path};
use super::plan::{ChangeKind, PlannedChange, SyncPlan};
use super::types::{Project, SyncError, SyncFailure, SyncOptions, SyncReport};
use crate::component::{Catalog, Category, ComponentId, Payload};
use crate::document::{events, keyed};
use crate::hooks::translate;
use crate::tracker::Tracker;
use crate::util::hash::fingerprint;

/// Apply `plan` to `project`.
///
/// # Errors
///
/// Only [`SyncError::TrackerLocation`] is returned, before anything is
/// written. Every other failure ends up in [`SyncReport::failed`].
pub async fn apply_sync(
  plan: &SyncPlan,
  catalog: &Catalog,
  project: &Project,
  options: &SyncOptions,
) -> Result<SyncReport, SyncError> {
  info!(
    root = %project.root.display(),
    tools = ?project.tools,
    changes = plan.changes.len(),
    dry_run = options.dry_run,
    "starting sync"
  );

  let tracker = project.tracker();
  if !options.dry_run {
    tracker.ensure_location().map_err(SyncError::TrackerLocation)?;
  }

  let mut report = SyncReport {
    dry_run: options.dry_run,
    ..Default::default()
  };

  for change in &plan.changes {
    let id = &change.id;
    match change.kind {
      ChangeKind::Install | ChangeKind::Update => {
        if !change.missing_env.is_empty() && !options.env_overrides.contains(id) {
          warn!(id = %id, missing = ?change.missing_env, "environment not set, skipping");
          report.skipped_env.push(id.clone());
          continue;
        }

        let outcome = if options.dry_run {
          Ok(Vec::new())
        } else {
          install(change, catalog, project, &tracker).await
        };

        match outcome {
          Ok(backups) => {
            info!(id = %id, kind = ?change.kind, "component installed");
            report.backups.extend(backups);
            if change.kind == ChangeKind::Install {
              report.installed.push(id.clone());
            } else {
              report.updated.push(id.clone());
            }
          }
          Err(e) => fail(&mut report, id, e),
        }
      }
      ChangeKind::Unchanged => {
        if options.dry_run {
          continue;
        }
        if let Err(e) = tracker.record_dependency_flag(id, change.dependency) {
          fail(&mut report, id, e.into());
        }
      }
      ChangeKind::Orphan if !options.remove_orphans => {
        debug!(id = %id, "keeping orphaned dependency");
      }
      ChangeKind::Remove | ChangeKind::Orphan => {
        let outcome = if options.dry_run {
          Ok(())
        } else {
          remove(id, project, &tracker).await
        };

        match outcome {
          Ok(()) => {
            info!(id = %id, "component removed");
            report.removed.push(id.clone());
          }
          Err(e) => fail(&mut report, id, e),
        }
      }
    }
  }

  info!(
    installed = report.installed.len(),
    updated = report.updated.len(),
    removed = report.removed.len(),
    failed = report.failed.len(),
    skipped_env = report.skipped_env.len(),
    "sync finished"
  );

  Ok(report)
}

fn fail(report: &mut SyncReport, id: &ComponentId, e: SyncError) {
  error!(id = %id, error = %e, "component failed");
  report.failed.push(SyncFailure {
    id: id.clone(),
    message: e.to_string(),
  });
}

/// Install or update one descriptor in every target tool, then track it.
async fn install(
  change: &PlannedChange,
  catalog: &Catalog,
  project: &Project,
  tracker: &Tracker,
) -> Result<Vec<PathBuf>, SyncError> {
  let descriptor = catalog
    .get(&change.id)
    .ok_or_else(|| SyncError::UnknownComponent(change.id.clone()))?;

  let Some(digest) = fingerprint(&descriptor.payload) else {
    let path = match &descriptor.payload {
      Payload::File { source } => source.clone(),
      Payload::Hook(_) | Payload::McpServer(_) => PathBuf::from(&descriptor.source_reference),
    };
    return Err(SyncError::MissingSource { path });
  };

  let name = descriptor.name();
  let recorded = tracker.lookup(&descriptor.id).map(|entry| entry.fingerprint);
  let mut backups = Vec::new();

  for &tool in &project.tools {
    match &descriptor.payload {
      Payload::File { source } => {
        let Some(target) = tool.file_target(&project.root, descriptor.category(), name) else {
          continue;
        };
        backups.extend(install_path(source, &target, recorded.as_ref()).await?);
      }
      Payload::Hook(config) => {
        let native = translate(config, tool);
        tool.hooks_document(&project.root).update(|section| {
          events::replace_owner(section, name, &native);
          Ok(())
        })?;
      }
      Payload::McpServer(spec) => {
        tool
          .mcp_document(&project.root)
          .update(|section| keyed::upsert(section, name, name, spec.clone()))?;
      }
    }
    debug!(id = %descriptor.id, tool = %tool, "written for tool");
  }

  tracker.record_install(descriptor, digest, change.dependency)?;
  Ok(backups)
}

/// Remove one descriptor from every target tool, then forget it.
///
/// Works from the id alone so descriptors gone from the catalog can still be
/// cleaned up.
async fn remove(id: &ComponentId, project: &Project, tracker: &Tracker) -> Result<(), SyncError> {
  for &tool in &project.tools {
    match id.category {
      Category::Hook => {
        tool
          .hooks_document(&project.root)
          .update(|section| Ok(events::remove(section, &id.name)))?;
      }
      Category::McpServer => {
        tool
          .mcp_document(&project.root)
          .update(|section| Ok(keyed::remove(section, &id.name)))?;
      }
      Category::Skill | Category::Command | Category::Agent => {
        if let Some(target) = tool.file_target(&project.root, id.category, &id.name) {
          remove_path(&target).await?;
        }
      }
    }
  }

  tracker.record_removal(id)?;
  Ok(())
}
