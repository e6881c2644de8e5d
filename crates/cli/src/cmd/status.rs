//! Status command implementation.
//!
//! Lists every catalog component with its status in the project.

use anyhow::Result;
use chrono::Utc;
use owo_colors::{OwoColorize, Stream};

use agentkit_lib::env::ProcessEnv;
use agentkit_lib::sync::{Status, status};

use super::{GlobalArgs, Workspace};
use crate::output::{format_age, print_info, print_json, print_stat, symbols};

pub fn cmd_status(global: &GlobalArgs) -> Result<()> {
  let ws = Workspace::load(global)?;
  let rows = status(&ws.catalog, &ws.project, &ProcessEnv);

  if global.json {
    return print_json(&rows);
  }

  print_stat("Repository", &ws.repository.display().to_string());
  print_stat("Project", &ws.project.root.display().to_string());
  println!();

  if rows.is_empty() {
    print_info("No components found in the repository.");
    return Ok(());
  }

  let now = Utc::now();
  let width = rows.iter().map(|row| row.id.to_string().len()).max().unwrap_or(0);

  for row in &rows {
    let symbol = match row.status {
      Status::Installed => symbols::SUCCESS,
      Status::Outdated => symbols::MODIFY,
      Status::MissingEnvironment => symbols::WARNING,
      Status::Available => symbols::INFO,
    };
    let label = row.status.as_str();
    let colored = match row.status {
      Status::Installed => label.if_supports_color(Stream::Stdout, |s| s.green()).to_string(),
      Status::Outdated => label.if_supports_color(Stream::Stdout, |s| s.yellow()).to_string(),
      Status::MissingEnvironment => label.if_supports_color(Stream::Stdout, |s| s.red()).to_string(),
      Status::Available => label.if_supports_color(Stream::Stdout, |s| s.dimmed()).to_string(),
    };

    let mut details = Vec::new();
    if let Some(installed_at) = row.installed_at {
      details.push(format!("installed {} ago", format_age(installed_at, now)));
    }
    if row.dependency {
      details.push("dependency".to_string());
    }
    if !row.missing_env.is_empty() {
      let names: Vec<&str> = row.missing_env.iter().map(String::as_str).collect();
      details.push(format!("needs {}", names.join(", ")));
    }

    let id = row.id.to_string();
    if details.is_empty() {
      println!("  {symbol} {id:<width$}  {colored}");
    } else {
      println!("  {symbol} {id:<width$}  {colored} ({})", details.join("; "));
    }
  }

  if global.verbose {
    let record = ws.project.tracker().read();
    println!();
    print_stat("Tracker", &ws.project.tracker().path().display().to_string());
    for (id, entry) in record.iter() {
      println!(
        "  {} {} {} {}",
        symbols::INFO,
        id,
        crate::output::truncate_hash(&entry.fingerprint.0),
        entry.source_reference
      );
    }
  }

  Ok(())
}
