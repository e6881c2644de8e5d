//! Command implementations and the state they share.
//!
//! Every command loads a [`Workspace`]: the user config, the scanned component
//! catalog and the target project.

mod plan;
mod status;
mod sync;
mod targets;

use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use tracing::debug;

use agentkit_lib::component::{Catalog, ComponentId, scan};
use agentkit_lib::config::Config;
use agentkit_lib::sync::Project;

pub use plan::cmd_plan;
pub use status::cmd_status;
pub use sync::{cmd_install, cmd_remove, cmd_sync};
pub use targets::cmd_targets;

/// Flags shared by every command.
pub struct GlobalArgs {
  pub repo: Option<PathBuf>,
  pub project: PathBuf,
  pub json: bool,
  pub verbose: bool,
}

/// Flags of the commands that change a project.
#[derive(Args, Debug, Clone, Default)]
pub struct SyncFlags {
  /// Show what would change without writing anything
  #[arg(long)]
  pub dry_run: bool,

  /// Also remove dependencies nothing selected needs anymore
  #[arg(long)]
  pub remove_orphans: bool,

  /// Install components even if they reference unset environment variables
  #[arg(long)]
  pub allow_missing_env: bool,

  /// Answer yes to every prompt
  #[arg(short, long)]
  pub yes: bool,
}

/// The target project with its tools detected (or defaulted from `config`).
pub fn load_project(global: &GlobalArgs, config: &Config) -> Result<Project> {
  let root = dunce::canonicalize(&global.project)
    .with_context(|| format!("Project directory not found: {}", global.project.display()))?;
  Ok(Project::detect(&root, &config.default_tools))
}

pub struct Workspace {
  pub repository: PathBuf,
  pub catalog: Catalog,
  pub project: Project,
}

impl Workspace {
  pub fn load(global: &GlobalArgs) -> Result<Self> {
    let config = Config::load().context("Failed to load configuration")?;

    let repository = match global.repo.clone().or_else(|| config.repository.clone()) {
      Some(repository) => repository,
      None => bail!("No component repository configured. Pass --repo or set AGENTKIT_REPOSITORY."),
    };
    let repository = dunce::canonicalize(&repository)
      .with_context(|| format!("Component repository not found: {}", repository.display()))?;

    let project = load_project(global, &config)?;
    let catalog = scan(&repository).context("Failed to scan component repository")?;
    debug!(repository = %repository.display(), project = %project.root.display(), "workspace loaded");

    Ok(Self {
      repository,
      catalog,
      project,
    })
  }

  /// The selection recorded by the last sync.
  pub fn current_selection(&self) -> BTreeSet<ComponentId> {
    self.project.tracker().read().direct_selection()
  }

  /// Resolve command-line component names.
  ///
  /// Accepts `category:name`, or a bare name when it is unique across the
  /// catalog and `extra` (ids known from elsewhere, e.g. the tracker).
  pub fn resolve(&self, names: &[String], extra: &BTreeSet<ComponentId>) -> Result<BTreeSet<ComponentId>> {
    let mut ids = BTreeSet::new();

    for name in names {
      if name.contains(':') {
        let id: ComponentId = name.parse().with_context(|| format!("Invalid component: {name}"))?;
        ids.insert(id);
        continue;
      }

      let mut matches: BTreeSet<ComponentId> = self.catalog.find_by_name(name).map(|d| d.id.clone()).collect();
      matches.extend(extra.iter().filter(|id| id.name == *name).cloned());

      let mut iter = matches.into_iter();
      match (iter.next(), iter.next()) {
        (Some(id), None) => {
          ids.insert(id);
        }
        (None, _) => bail!("Unknown component: {name}"),
        (Some(first), Some(second)) => bail!(
          "Component name '{name}' is ambiguous ({first}, {second}, ...). Use category:name."
        ),
      }
    }

    Ok(ids)
  }
}
