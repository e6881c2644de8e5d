//! Shared test helpers for CLI integration tests.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::Value;
use tempfile::TempDir;

/// Isolated test environment.
///
/// Each test gets its own component repository, target project and config
/// directory under one temporary directory.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  /// Empty repository and a project using Claude.
  pub fn new() -> Self {
    let env = Self {
      temp: TempDir::new().unwrap(),
    };
    std::fs::create_dir_all(env.repo_path()).unwrap();
    std::fs::create_dir_all(env.project_path().join(".claude")).unwrap();
    std::fs::create_dir_all(env.config_path()).unwrap();
    env
  }

  /// Repository with one skill requiring an agent, a standalone command and
  /// an MCP server that needs `GITHUB_TOKEN`.
  pub fn with_catalog() -> Self {
    let env = Self::new();
    env.write_repo(
      "skills/review/SKILL.md",
      "---\nname: review\nrequires:\n  agents: [reviewer]\n---\n# Review\n",
    );
    env.write_repo("agents/reviewer.md", "# Reviewer\n");
    env.write_repo("commands/deploy.md", "# Deploy\n");
    env.write_repo(
      "mcp/github.json",
      r#"{ "command": "gh-mcp", "env": { "TOKEN": "${GITHUB_TOKEN}" } }"#,
    );
    env
  }

  pub fn repo_path(&self) -> PathBuf {
    self.temp.path().join("repo")
  }

  pub fn project_path(&self) -> PathBuf {
    self.temp.path().join("project")
  }

  pub fn config_path(&self) -> PathBuf {
    self.temp.path().join("config")
  }

  /// Write a file relative to the repository.
  pub fn write_repo(&self, relative_path: &str, content: &str) {
    write_file(&self.repo_path(), relative_path, content);
  }

  /// Write a file relative to the project.
  pub fn write_project(&self, relative_path: &str, content: &str) {
    write_file(&self.project_path(), relative_path, content);
  }

  pub fn project_file(&self, relative_path: &str) -> PathBuf {
    self.project_path().join(relative_path)
  }

  pub fn read_project_json(&self, relative_path: &str) -> Value {
    let content = std::fs::read_to_string(self.project_file(relative_path)).unwrap();
    serde_json::from_str(&content).unwrap()
  }

  /// Get a pre-configured Command for the agentkit binary.
  ///
  /// Sets environment variables for isolated testing:
  /// - `AGENTKIT_REPOSITORY`: The test repository
  /// - `XDG_CONFIG_HOME`: Isolated config directory (no user config leaks in)
  /// - `APPDATA`: Same, for Windows
  /// - `GITHUB_TOKEN`: Removed so environment gating is deterministic
  pub fn agentkit_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("agentkit");
    cmd.env("AGENTKIT_REPOSITORY", self.repo_path());
    cmd.env("XDG_CONFIG_HOME", self.config_path());
    cmd.env("APPDATA", self.config_path());
    cmd.env_remove("AGENTKIT_CONFIG");
    cmd.env_remove("GITHUB_TOKEN");
    cmd.env_remove("RUST_LOG");
    cmd.arg("--project").arg(self.project_path());
    cmd
  }

  /// Run `agentkit --json status` and return the parsed rows.
  pub fn status_json(&self) -> Vec<Value> {
    let output = self
      .agentkit_cmd()
      .arg("--json")
      .arg("status")
      .output()
      .unwrap();
    assert!(output.status.success(), "status failed: {}", String::from_utf8_lossy(&output.stderr));
    match serde_json::from_slice(&output.stdout).unwrap() {
      Value::Array(rows) => rows,
      other => panic!("expected array, got {other}"),
    }
  }

  /// Status string of one component, as reported by `status --json`.
  pub fn status_of(&self, id: &str) -> String {
    self
      .status_json()
      .into_iter()
      .find(|row| row["id"] == id)
      .and_then(|row| row["status"].as_str().map(str::to_string))
      .unwrap_or_else(|| panic!("{id} missing from status"))
  }
}

fn write_file(root: &Path, relative_path: &str, content: &str) {
  let path = root.join(relative_path);
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent).unwrap();
  }
  std::fs::write(&path, content).unwrap();
}
