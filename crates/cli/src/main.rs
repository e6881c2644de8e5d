mod cmd;
mod output;
mod prompts;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cmd::{GlobalArgs, SyncFlags};

/// agentkit - sync skills, agents, hooks and MCP servers into AI coding tools
#[derive(Parser)]
#[command(name = "agentkit")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Component repository (overrides config and AGENTKIT_REPOSITORY)
  #[arg(long, global = true, value_name = "DIR")]
  repo: Option<PathBuf>,

  /// Target project directory
  #[arg(long, global = true, value_name = "DIR", default_value = ".")]
  project: PathBuf,

  /// Print machine-readable JSON
  #[arg(long, global = true)]
  json: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Show the status of every component in the repository
  Status,

  /// Show what a sync would change
  Plan {
    /// Components to select (category:name or unique name); defaults to the current selection
    components: Vec<String>,
  },

  /// Make the project's components match exactly the given selection
  Sync {
    /// Components to select; defaults to the current selection
    components: Vec<String>,

    #[command(flatten)]
    flags: SyncFlags,
  },

  /// Add components to the current selection
  Install {
    /// Components to add
    #[arg(required = true)]
    components: Vec<String>,

    #[command(flatten)]
    flags: SyncFlags,
  },

  /// Drop components from the current selection
  Remove {
    /// Components to drop
    #[arg(required = true)]
    components: Vec<String>,

    #[command(flatten)]
    flags: SyncFlags,
  },

  /// Show the tools detected in the project and the files agentkit manages for them
  Targets,
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let global = GlobalArgs {
    repo: cli.repo,
    project: cli.project,
    json: cli.json,
    verbose: cli.verbose,
  };

  match cli.command {
    Commands::Status => cmd::cmd_status(&global),
    Commands::Plan { components } => cmd::cmd_plan(&global, &components),
    Commands::Sync { components, flags } => cmd::cmd_sync(&global, &components, &flags),
    Commands::Install { components, flags } => cmd::cmd_install(&global, &components, &flags),
    Commands::Remove { components, flags } => cmd::cmd_remove(&global, &components, &flags),
    Commands::Targets => cmd::cmd_targets(&global),
  }
}
