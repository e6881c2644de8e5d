use agentkit_lib::component::ComponentId;
use agentkit_lib::sync::{ChangeKind, SyncOptions};
use agentkit_lib::tools::Tool;

use super::common::{Fixture, all_set};

fn repo_with_review_skill() -> Fixture {
  let fx = Fixture::with_tools(&[Tool::Claude]);
  fx.write_repo(
    "skills/review/SKILL.md",
    "---\nrequires:\n  agents: [reviewer]\n  mcpServers: [github]\n---\n# Review\n",
  );
  fx.write_repo("agents/reviewer.md", "# Reviewer\n");
  fx.write_repo("mcp/github.json", r#"{"command":"gh-mcp"}"#);
  fx.write_repo("commands/deploy.md", "# Deploy\n");
  fx
}

fn id(s: &str) -> ComponentId {
  s.parse().unwrap()
}

#[tokio::test]
async fn selection_installs_dependency_closure() {
  let fx = repo_with_review_skill();

  let report = fx.sync(&["skill:review"], &SyncOptions::default()).await;
  assert_eq!(
    report.installed,
    vec![id("skill:review"), id("agent:reviewer"), id("mcpServer:github")]
  );

  let record = fx.target().tracker().read();
  assert!(!record.lookup(&id("skill:review")).unwrap().dependency);
  assert!(record.lookup(&id("agent:reviewer")).unwrap().dependency);
}

#[tokio::test]
async fn orphans_are_offered_not_forced() {
  let fx = repo_with_review_skill();
  fx.sync(&["skill:review"], &SyncOptions::default()).await;

  let plan = fx.plan(&["command:deploy"], &all_set);
  let orphans: Vec<&ComponentId> = plan.orphans().collect();
  assert_eq!(orphans, vec![&id("agent:reviewer"), &id("mcpServer:github")]);
  assert_eq!(plan.of_kind(ChangeKind::Remove).count(), 1);

  let report = fx.sync(&["command:deploy"], &SyncOptions::default()).await;
  assert_eq!(report.removed, vec![id("skill:review")]);
  assert!(fx.project.join(".claude/agents/reviewer.md").exists());

  // Orphans stay orphans on the next run until removed
  let options = SyncOptions {
    remove_orphans: true,
    ..Default::default()
  };
  let report = fx.sync(&["command:deploy"], &options).await;
  assert_eq!(report.removed, vec![id("agent:reviewer"), id("mcpServer:github")]);
  assert!(!fx.project.join(".claude/agents/reviewer.md").exists());
}

#[tokio::test]
async fn dependency_selected_directly_is_promoted() {
  let fx = repo_with_review_skill();
  fx.sync(&["skill:review"], &SyncOptions::default()).await;

  fx.sync(&["skill:review", "agent:reviewer"], &SyncOptions::default()).await;
  fx.sync(&["agent:reviewer"], &SyncOptions::default()).await;

  let record = fx.target().tracker().read();
  assert!(record.lookup(&id("agent:reviewer")).is_some());
  assert!(!record.lookup(&id("agent:reviewer")).unwrap().dependency);
  assert!(record.lookup(&id("skill:review")).is_none());
}
