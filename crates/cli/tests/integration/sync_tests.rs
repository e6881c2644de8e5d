//! Sync, install and remove integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn install_copies_skill_with_its_dependencies() {
  let env = TestEnv::with_catalog();

  env
    .agentkit_cmd()
    .args(["install", "review"])
    .assert()
    .success()
    .stdout(predicate::str::contains("skill:review"))
    .stdout(predicate::str::contains("agent:reviewer (install, dependency)"));

  assert!(env.project_file(".claude/skills/review/SKILL.md").is_file());
  assert!(env.project_file(".claude/agents/reviewer.md").is_file());
  assert!(!env.project_file(".claude/commands/deploy.md").exists());

  let tracker = env.read_project_json(".agentkit/installed.json");
  assert_eq!(tracker["version"], 1);
  assert_eq!(tracker["components"]["agent"]["reviewer"]["dependency"], true);
  assert!(tracker["components"]["skill"]["review"].get("dependency").is_none());

  assert_eq!(env.status_of("skill:review"), "installed");
  assert_eq!(env.status_of("agent:reviewer"), "installed");
  assert_eq!(env.status_of("command:deploy"), "available");
}

#[test]
fn second_sync_reports_up_to_date() {
  let env = TestEnv::with_catalog();
  env.agentkit_cmd().args(["install", "command:deploy"]).assert().success();

  env
    .agentkit_cmd()
    .arg("sync")
    .assert()
    .success()
    .stdout(predicate::str::contains("Nothing to change."))
    .stdout(predicate::str::contains("Project is up to date."));
}

#[test]
fn dry_run_writes_nothing() {
  let env = TestEnv::with_catalog();

  env
    .agentkit_cmd()
    .args(["install", "--dry-run", "deploy"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Would install 1 component(s)"));

  assert!(!env.project_file(".claude/commands/deploy.md").exists());
  assert!(!env.project_file(".agentkit").exists());
}

#[test]
fn missing_env_is_skipped_without_yes() {
  let env = TestEnv::with_catalog();

  env
    .agentkit_cmd()
    .args(["install", "github"])
    .assert()
    .success()
    .stderr(predicate::str::contains("Skipped mcpServer:github: environment not set"));

  assert!(!env.project_file(".mcp.json").exists());
  assert_eq!(env.status_of("mcpServer:github"), "missingEnvironment");
}

#[test]
fn allow_missing_env_installs_anyway() {
  let env = TestEnv::with_catalog();

  env
    .agentkit_cmd()
    .args(["install", "--allow-missing-env", "mcpServer:github"])
    .assert()
    .success();

  let mcp = env.read_project_json(".mcp.json");
  assert_eq!(mcp["mcpServers"]["github"]["command"], "gh-mcp");
  assert_eq!(mcp["mcpServers"]["github"]["_agentkit"], "github");
}

#[test]
fn remove_deletes_files_and_orphans_with_flag() {
  let env = TestEnv::with_catalog();
  env.agentkit_cmd().args(["install", "review"]).assert().success();

  env
    .agentkit_cmd()
    .args(["remove", "--remove-orphans", "review"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Removed 2 component(s)"));

  assert!(!env.project_file(".claude/skills/review").exists());
  assert!(!env.project_file(".claude/agents/reviewer.md").exists());
  assert_eq!(env.status_of("agent:reviewer"), "available");
}

#[test]
fn remove_keeps_orphans_by_default() {
  let env = TestEnv::with_catalog();
  env.agentkit_cmd().args(["install", "review"]).assert().success();

  env
    .agentkit_cmd()
    .args(["remove", "review"])
    .assert()
    .success()
    .stdout(predicate::str::contains("agent:reviewer (orphan"))
    .stdout(predicate::str::contains("Keeping orphaned dependencies"));

  assert!(env.project_file(".claude/agents/reviewer.md").is_file());
  assert!(!env.project_file(".claude/skills/review").exists());
}

#[test]
fn existing_user_file_is_backed_up() {
  let env = TestEnv::with_catalog();
  env.write_project(".claude/commands/deploy.md", "my own deploy\n");

  env
    .agentkit_cmd()
    .args(["install", "deploy"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Backed up"));

  let backup = env.project_file(".claude/commands/deploy.md.bak");
  assert_eq!(std::fs::read_to_string(backup).unwrap(), "my own deploy\n");
  assert_eq!(
    std::fs::read_to_string(env.project_file(".claude/commands/deploy.md")).unwrap(),
    "# Deploy\n"
  );
}

#[test]
fn hooks_merge_into_settings_without_touching_user_content() {
  let env = TestEnv::with_catalog();
  env.write_repo(
    "hooks/notify.json",
    r#"{ "stop": [{ "matcher": "*", "command": "notify-send done" }] }"#,
  );
  env.write_project(".claude/settings.json", r#"{ "model": "opus" }"#);

  env.agentkit_cmd().args(["install", "hook:notify"]).assert().success();

  let settings = env.read_project_json(".claude/settings.json");
  assert_eq!(settings["model"], "opus");
  assert_eq!(settings["hooks"]["Stop"][0]["_agentkit"], "notify");
  assert_eq!(settings["hooks"]["Stop"][0]["hooks"][0]["command"], "notify-send done");

  env.agentkit_cmd().args(["remove", "notify"]).assert().success();

  assert_eq!(env.read_project_json(".claude/settings.json"), serde_json::json!({ "model": "opus" }));
}

#[test]
fn unknown_component_fails() {
  let env = TestEnv::with_catalog();

  env
    .agentkit_cmd()
    .args(["install", "nope"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Unknown component: nope"));
}

#[test]
fn json_report_lists_installed_ids() {
  let env = TestEnv::with_catalog();

  let output = env
    .agentkit_cmd()
    .args(["--json", "install", "deploy"])
    .output()
    .unwrap();
  assert!(output.status.success());

  let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(report["installed"], serde_json::json!(["command:deploy"]));
  assert_eq!(report["dryRun"], false);
}
