//! User configuration.
//!
//! Loaded from `$XDG_CONFIG_HOME/agentkit/config.toml` (or the file named by
//! `AGENTKIT_CONFIG`), then overridden by environment variables. Command-line
//! flags are applied last by the CLI.
//!
//! ```toml
//! repository = "/home/me/agent-components"
//! default_tools = ["claude", "cursor"]
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::consts::APP_NAME;
use crate::tools::Tool;

/// Names an explicit config file.
pub const CONFIG_ENV: &str = "AGENTKIT_CONFIG";

/// Overrides `repository`.
pub const REPOSITORY_ENV: &str = "AGENTKIT_REPOSITORY";

const CONFIG_FILENAME: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config {}: {source}", path.display())]
  Read { path: PathBuf, source: io::Error },

  #[error("invalid config {}: {source}", path.display())]
  Parse { path: PathBuf, source: toml::de::Error },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
  /// Component repository to scan.
  pub repository: Option<PathBuf>,

  /// Tools to target when a project has no tool marker directory yet.
  pub default_tools: Vec<Tool>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      repository: None,
      default_tools: vec![Tool::Claude],
    }
  }
}

impl Config {
  /// Load the user configuration with environment overrides applied.
  ///
  /// A missing default config file is an empty config; a missing file named
  /// by `AGENTKIT_CONFIG` is an error.
  pub fn load() -> Result<Self, ConfigError> {
    let mut config = match std::env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
      Some(path) => Self::load_from(Path::new(&path))?,
      None => match config_path() {
        Some(path) if path.exists() => Self::load_from(&path)?,
        _ => Self::default(),
      },
    };

    config.apply_env();
    Ok(config)
  }

  pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
      path: path.to_path_buf(),
      source: e,
    })?;
    let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
      path: path.to_path_buf(),
      source: e,
    })?;

    debug!(path = %path.display(), "loaded config");
    Ok(config)
  }

  fn apply_env(&mut self) {
    if let Some(repository) = std::env::var_os(REPOSITORY_ENV).filter(|v| !v.is_empty()) {
      debug!(repository = ?repository, "repository overridden from environment");
      self.repository = Some(PathBuf::from(repository));
    }
  }
}

/// Returns the directory for configuration files for the application
#[cfg(windows)]
pub fn config_dir() -> Option<PathBuf> {
  std::env::var_os("APPDATA").map(|appdata| PathBuf::from(appdata).join(APP_NAME))
}

/// Returns the directory for configuration files for the application
#[cfg(not(windows))]
pub fn config_dir() -> Option<PathBuf> {
  let config_home = std::env::var_os("XDG_CONFIG_HOME")
    .filter(|v| !v.is_empty())
    .map(PathBuf::from)
    .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))?;
  Some(config_home.join(APP_NAME))
}

/// Default config file location.
pub fn config_path() -> Option<PathBuf> {
  config_dir().map(|dir| dir.join(CONFIG_FILENAME))
}
