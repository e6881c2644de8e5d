//! Implementation of `agentkit sync`, `install` and `remove`.
//!
//! All three compute a new direct selection and sync the project to it:
//! - `sync`: exactly the given components (or the current selection again)
//! - `install`: the current selection plus the given components
//! - `remove`: the current selection minus the given components

use std::collections::BTreeSet;

use anyhow::{Context, Result, bail};

use agentkit_lib::component::ComponentId;
use agentkit_lib::env::ProcessEnv;
use agentkit_lib::sync::{SyncOptions, SyncReport, apply_sync, plan_sync};

use super::plan::print_plan;
use super::{GlobalArgs, SyncFlags, Workspace};
use crate::output::{print_error, print_info, print_json, print_success, print_warning};
use crate::prompts::offer;

pub fn cmd_sync(global: &GlobalArgs, components: &[String], flags: &SyncFlags) -> Result<()> {
  let ws = Workspace::load(global)?;
  let current = ws.current_selection();
  let selection = if components.is_empty() {
    current
  } else {
    ws.resolve(components, &current)?
  };
  run(&ws, global, selection, flags)
}

pub fn cmd_install(global: &GlobalArgs, components: &[String], flags: &SyncFlags) -> Result<()> {
  let ws = Workspace::load(global)?;
  let mut selection = ws.current_selection();
  selection.extend(ws.resolve(components, &BTreeSet::new())?);
  run(&ws, global, selection, flags)
}

pub fn cmd_remove(global: &GlobalArgs, components: &[String], flags: &SyncFlags) -> Result<()> {
  let ws = Workspace::load(global)?;
  let tracked = ws.project.tracker().read().tracked_ids();
  let mut selection = ws.current_selection();
  for id in ws.resolve(components, &tracked)? {
    if !selection.remove(&id) {
      print_warning(&format!("{id} is not selected"));
    }
  }
  run(&ws, global, selection, flags)
}

fn run(ws: &Workspace, global: &GlobalArgs, selection: BTreeSet<ComponentId>, flags: &SyncFlags) -> Result<()> {
  let record = ws.project.tracker().read();
  let plan = plan_sync(&ws.catalog, &selection, &record, &ws.project, &ProcessEnv);

  if !global.json {
    print_plan(&plan, global.verbose);
  }

  let mut env_overrides = BTreeSet::new();
  for change in plan.needs_env_override() {
    let names: Vec<&str> = change.missing_env.iter().map(String::as_str).collect();
    let message = format!("{} needs unset {}. Install anyway?", change.id, names.join(", "));
    if flags.allow_missing_env || offer(&message, flags.yes)? {
      env_overrides.insert(change.id.clone());
    }
  }

  let orphans = plan.orphans().count();
  let remove_orphans = flags.remove_orphans
    || (orphans > 0 && offer(&format!("Remove {orphans} dependencies nothing needs anymore?"), flags.yes)?);
  if orphans > 0 && !remove_orphans && !global.json {
    print_info("Keeping orphaned dependencies. Use --remove-orphans to remove them.");
  }

  let options = SyncOptions {
    env_overrides,
    remove_orphans,
    dry_run: flags.dry_run,
  };

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let report = rt
    .block_on(apply_sync(&plan, &ws.catalog, &ws.project, &options))
    .context("Sync failed")?;

  if global.json {
    print_json(&report)?;
  } else {
    print_report(&report);
  }

  if report.has_failures() {
    bail!("{} component(s) failed", report.failed.len());
  }
  Ok(())
}

fn print_report(report: &SyncReport) {
  println!();
  if report.is_empty() && report.failed.is_empty() && report.skipped_env.is_empty() {
    print_info("Project is up to date.");
    return;
  }

  let (installed, updated, removed) = if report.dry_run {
    ("Would install", "Would update", "Would remove")
  } else {
    ("Installed", "Updated", "Removed")
  };
  for (verb, ids) in [
    (installed, &report.installed),
    (updated, &report.updated),
    (removed, &report.removed),
  ] {
    if !ids.is_empty() {
      print_success(&format!("{verb} {} component(s)", ids.len()));
    }
  }

  for id in &report.skipped_env {
    print_warning(&format!("Skipped {id}: environment not set"));
  }
  for backup in &report.backups {
    print_info(&format!("Backed up {}", backup.display()));
  }
  for failure in &report.failed {
    print_error(&format!("{}: {}", failure.id, failure.message));
  }
}
