//! Implementation of the `agentkit plan` command.
//!
//! Computes the changes a sync of the given selection would make, without
//! touching the project.

use anyhow::Result;
use owo_colors::{OwoColorize, Stream};

use agentkit_lib::env::ProcessEnv;
use agentkit_lib::sync::{ChangeKind, SyncPlan, plan_sync};

use super::{GlobalArgs, Workspace};
use crate::output::{print_info, print_json, print_warning, symbols};

pub fn cmd_plan(global: &GlobalArgs, components: &[String]) -> Result<()> {
  let ws = Workspace::load(global)?;
  let selection = if components.is_empty() {
    ws.current_selection()
  } else {
    ws.resolve(components, &ws.current_selection())?
  };

  let record = ws.project.tracker().read();
  let plan = plan_sync(&ws.catalog, &selection, &record, &ws.project, &ProcessEnv);

  if global.json {
    return print_json(&plan);
  }

  print_plan(&plan, global.verbose);
  Ok(())
}

/// Print one line per change; unchanged components only when verbose.
pub(super) fn print_plan(plan: &SyncPlan, verbose: bool) {
  for id in &plan.unknown {
    print_warning(&format!("{id} is not in the repository"));
  }

  if plan.is_empty() {
    print_info("Nothing to change.");
    return;
  }

  for change in &plan.changes {
    let (symbol, note) = match change.kind {
      ChangeKind::Install => (symbols::ADD.if_supports_color(Stream::Stdout, |s| s.green()).to_string(), "install"),
      ChangeKind::Update => (symbols::MODIFY.if_supports_color(Stream::Stdout, |s| s.yellow()).to_string(), "update"),
      ChangeKind::Remove => (symbols::REMOVE.if_supports_color(Stream::Stdout, |s| s.red()).to_string(), "remove"),
      ChangeKind::Orphan => (symbols::ORPHAN.if_supports_color(Stream::Stdout, |s| s.yellow()).to_string(), "orphan"),
      ChangeKind::Unchanged if verbose => (" ".to_string(), "unchanged"),
      ChangeKind::Unchanged => continue,
    };

    let mut line = format!("  {symbol} {} ({note}", change.id);
    if change.dependency {
      line.push_str(", dependency");
    }
    if !change.missing_env.is_empty() {
      let names: Vec<&str> = change.missing_env.iter().map(String::as_str).collect();
      line.push_str(&format!(", needs {}", names.join(", ")));
    }
    line.push(')');
    println!("{line}");
  }
}
