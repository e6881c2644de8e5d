use std::collections::BTreeSet;
use std::fs;

use agentkit_lib::component::ComponentId;
use agentkit_lib::sync::{ChangeKind, Status, SyncError, SyncOptions, apply_sync, plan_sync};
use agentkit_lib::tools::Tool;
use serde_json::json;

use super::common::{Fixture, all_set, ids};

#[tokio::test]
async fn file_component_round_trip() {
  let fx = Fixture::with_tools(&[Tool::Claude]);
  fx.write_repo("commands/deploy.md", "# Deploy v1\n");
  let target = fx.project.join(".claude/commands/deploy.md");

  assert_eq!(fx.status_of("command:deploy", &all_set), Status::Available);

  let report = fx.sync(&["command:deploy"], &SyncOptions::default()).await;
  assert_eq!(report.installed, vec!["command:deploy".parse::<ComponentId>().unwrap()]);
  assert_eq!(fs::read_to_string(&target).unwrap(), "# Deploy v1\n");
  assert_eq!(fx.status_of("command:deploy", &all_set), Status::Installed);

  fx.write_repo("commands/deploy.md", "# Deploy v2\n");
  assert_eq!(fx.status_of("command:deploy", &all_set), Status::Outdated);

  let report = fx.sync(&["command:deploy"], &SyncOptions::default()).await;
  assert_eq!(report.updated.len(), 1);
  assert!(report.backups.is_empty(), "unexpected backups: {:?}", report.backups);
  assert_eq!(fs::read_to_string(&target).unwrap(), "# Deploy v2\n");
  assert!(!fx.project.join(".claude/commands/deploy.md.bak").exists());

  let report = fx.sync(&[], &SyncOptions::default()).await;
  assert_eq!(report.removed.len(), 1);
  assert!(!target.exists());
  assert_eq!(fx.status_of("command:deploy", &all_set), Status::Available);
}

#[tokio::test]
async fn user_file_in_the_way_is_backed_up() {
  let fx = Fixture::with_tools(&[Tool::Claude]);
  fx.write_repo("agents/reviewer.md", "# Reviewer\n");
  fx.write_project(".claude/agents/reviewer.md", "# my own reviewer\n");

  let report = fx.sync(&["agent:reviewer"], &SyncOptions::default()).await;

  let backup = fx.project.join(".claude/agents/reviewer.md.bak");
  assert_eq!(report.backups, vec![backup.clone()]);
  assert_eq!(fs::read_to_string(backup).unwrap(), "# my own reviewer\n");
}

#[tokio::test]
async fn skill_update_replaces_untouched_copy_without_backup() {
  let fx = Fixture::with_tools(&[Tool::Claude]);
  fx.write_repo("skills/review/SKILL.md", "# Review v1\n");
  fx.sync(&["skill:review"], &SyncOptions::default()).await;

  fx.write_repo("skills/review/SKILL.md", "# Review v2\n");
  let report = fx.sync(&["skill:review"], &SyncOptions::default()).await;

  assert_eq!(report.updated, vec!["skill:review".parse::<ComponentId>().unwrap()]);
  assert!(report.backups.is_empty());
  assert!(!fx.project.join(".claude/skills/review.bak").exists());
  assert_eq!(
    fs::read_to_string(fx.project.join(".claude/skills/review/SKILL.md")).unwrap(),
    "# Review v2\n"
  );
}

#[tokio::test]
async fn user_edited_install_is_backed_up_on_update() {
  let fx = Fixture::with_tools(&[Tool::Claude]);
  fx.write_repo("commands/deploy.md", "# Deploy v1\n");
  fx.sync(&["command:deploy"], &SyncOptions::default()).await;

  fx.write_project(".claude/commands/deploy.md", "# Deploy v1 plus my notes\n");
  fx.write_repo("commands/deploy.md", "# Deploy v2\n");
  let report = fx.sync(&["command:deploy"], &SyncOptions::default()).await;

  let backup = fx.project.join(".claude/commands/deploy.md.bak");
  assert_eq!(report.backups, vec![backup.clone()]);
  assert_eq!(fs::read_to_string(backup).unwrap(), "# Deploy v1 plus my notes\n");
}

#[tokio::test]
async fn second_sync_is_a_no_op() {
  let fx = Fixture::with_tools(&[Tool::Claude, Tool::Cursor]);
  fx.write_repo("skills/review/SKILL.md", "# Review\n");
  fx.write_repo("hooks/notify.json", r#"{"stop":[{"command":"notify-send done"}]}"#);
  let selection = ["skill:review", "hook:notify"];

  let first = fx.sync(&selection, &SyncOptions::default()).await;
  assert_eq!(first.installed.len(), 2);
  assert!(fx.project.join(".cursor/skills/review/SKILL.md").exists());

  let claude_before = fs::read_to_string(fx.project.join(".claude/settings.json")).unwrap();
  let plan = fx.plan(&selection, &all_set);
  assert!(plan.is_empty(), "unexpected changes: {:?}", plan.changes);

  let second = fx.sync(&selection, &SyncOptions::default()).await;
  assert!(second.is_empty());
  assert_eq!(fs::read_to_string(fx.project.join(".claude/settings.json")).unwrap(), claude_before);
}

#[tokio::test]
async fn missing_environment_gates_install_until_set_or_overridden() {
  let fx = Fixture::with_tools(&[Tool::Claude]);
  fx.write_repo(
    "mcp/github.json",
    r#"{"command":"gh-mcp","env":{"GITHUB_TOKEN":"${AGENTKIT_IT_TOKEN}"}}"#,
  );
  let unset = |_: &str| false;

  assert_eq!(fx.status_of("mcpServer:github", &unset), Status::MissingEnvironment);
  assert_eq!(fx.status_of("mcpServer:github", &all_set), Status::Available);

  let skipped = fx.sync_with_env(&["mcpServer:github"], &SyncOptions::default(), &unset).await;
  assert_eq!(skipped.skipped_env.len(), 1);
  assert!(!fx.project.join(".mcp.json").exists());

  let options = SyncOptions {
    env_overrides: ids(&["mcpServer:github"]),
    ..Default::default()
  };
  let report = fx.sync_with_env(&["mcpServer:github"], &options, &unset).await;
  assert_eq!(report.installed.len(), 1);
  assert_eq!(
    fx.read_project_json(".mcp.json")["mcpServers"]["github"],
    json!({ "command": "gh-mcp", "env": { "GITHUB_TOKEN": "${AGENTKIT_IT_TOKEN}" }, "_agentkit": "github" })
  );

  // Once installed, the variable being set turns the status into plain installed
  assert_eq!(fx.status_of("mcpServer:github", &unset), Status::MissingEnvironment);
  assert_eq!(fx.status_of("mcpServer:github", &all_set), Status::Installed);
}

#[tokio::test]
async fn user_owned_server_conflict_fails_only_that_component() {
  let fx = Fixture::with_tools(&[Tool::Claude]);
  fx.write_repo("mcp/github.json", r#"{"command":"gh-mcp"}"#);
  fx.write_repo("commands/deploy.md", "# Deploy\n");
  fx.write_project(".mcp.json", r#"{"mcpServers":{"github":{"command":"mine"}}}"#);

  let report = fx.sync(&["mcpServer:github", "command:deploy"], &SyncOptions::default()).await;

  assert_eq!(report.installed, vec!["command:deploy".parse::<ComponentId>().unwrap()]);
  assert_eq!(report.failed.len(), 1);
  assert_eq!(report.failed[0].id.to_string(), "mcpServer:github");
  assert_eq!(
    fx.read_project_json(".mcp.json")["mcpServers"]["github"],
    json!({ "command": "mine" })
  );
  assert!(fx.target().tracker().read().lookup(&report.failed[0].id).is_none());
}

#[tokio::test]
async fn dry_run_writes_nothing() {
  let fx = Fixture::with_tools(&[Tool::Claude]);
  fx.write_repo("commands/deploy.md", "# Deploy\n");

  let options = SyncOptions {
    dry_run: true,
    ..Default::default()
  };
  let report = fx.sync(&["command:deploy"], &options).await;

  assert!(report.dry_run);
  assert_eq!(report.installed.len(), 1);
  assert!(!fx.project.join(".claude/commands").exists());
  assert!(!fx.project.join(".agentkit").exists());
}

#[tokio::test]
async fn unusable_tracker_location_aborts_before_any_write() {
  let fx = Fixture::with_tools(&[Tool::Claude]);
  fx.write_repo("commands/deploy.md", "# Deploy\n");
  fx.write_project(".agentkit", "blocking file");

  let catalog = fx.catalog();
  let project = fx.target();
  let plan = plan_sync(&catalog, &ids(&["command:deploy"]), &project.tracker().read(), &project, &all_set);
  let result = apply_sync(&plan, &catalog, &project, &SyncOptions::default()).await;

  assert!(matches!(result, Err(SyncError::TrackerLocation(_))));
  assert!(!fx.project.join(".claude/commands/deploy.md").exists());
}

#[tokio::test]
async fn default_tool_is_used_when_none_detected() {
  let fx = Fixture::new();
  fx.write_repo("commands/deploy.md", "# Deploy\n");

  fx.sync(&["command:deploy"], &SyncOptions::default()).await;
  assert!(fx.project.join(".claude/commands/deploy.md").exists());
}

#[tokio::test]
async fn descriptor_removed_from_catalog_is_cleaned_up() {
  let fx = Fixture::with_tools(&[Tool::Claude]);
  fx.write_repo("mcp/github.json", r#"{"command":"gh-mcp"}"#);
  fx.sync(&["mcpServer:github"], &SyncOptions::default()).await;

  fs::remove_file(fx.repo.join("mcp/github.json")).unwrap();
  let plan = fx.plan(&["mcpServer:github"], &all_set);
  assert_eq!(plan.unknown.len(), 1);
  assert_eq!(
    plan.changes.iter().map(|c| c.kind).collect::<Vec<_>>(),
    vec![ChangeKind::Remove]
  );

  let report = fx.sync(&["mcpServer:github"], &SyncOptions::default()).await;
  assert_eq!(report.removed.len(), 1);
  assert_eq!(fx.read_project_json(".mcp.json"), json!({}));
  assert_eq!(fx.target().tracker().read().tracked_ids(), BTreeSet::new());
}
