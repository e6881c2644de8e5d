use agentkit_lib::sync::SyncOptions;
use agentkit_lib::tools::Tool;
use serde_json::json;

use super::common::Fixture;

const USER_SETTINGS: &str = r#"{
  "permissions": { "allow": ["Bash(ls)"] },
  "hooks": {
    "Stop": [{ "matcher": "*", "hooks": [{ "type": "command", "command": "say bye" }] }]
  }
}"#;

#[tokio::test]
async fn hook_materializes_in_every_detected_tool() {
  let fx = Fixture::with_tools(&[Tool::Claude, Tool::Cursor]);
  fx.write_repo(
    "hooks/notify.json",
    r#"{"stop":[{"matcher":"*","command":"notify-send done"}],"notification":[{"command":"beep"}]}"#,
  );

  let report = fx.sync(&["hook:notify"], &SyncOptions::default()).await;
  assert_eq!(report.installed.len(), 1);

  assert_eq!(
    fx.read_project_json(".claude/settings.json"),
    json!({
      "hooks": {
        "Stop": [{
          "matcher": "*",
          "hooks": [{ "type": "command", "command": "notify-send done" }],
          "_agentkit": "notify"
        }],
        "Notification": [{
          "matcher": "*",
          "hooks": [{ "type": "command", "command": "beep" }],
          "_agentkit": "notify"
        }]
      }
    })
  );

  // No notification event for this tool, and the default matcher is omitted
  assert_eq!(
    fx.read_project_json(".cursor/hooks.json"),
    json!({
      "version": 1,
      "hooks": { "stop": [{ "command": "notify-send done", "_agentkit": "notify" }] }
    })
  );
}

#[tokio::test]
async fn matcher_change_replaces_instead_of_duplicating() {
  let fx = Fixture::with_tools(&[Tool::Claude]);
  fx.write_project(".claude/settings.json", USER_SETTINGS);
  fx.write_repo("hooks/guard.json", r#"{"stop":[{"matcher":"*","command":"check"}]}"#);
  fx.sync(&["hook:guard"], &SyncOptions::default()).await;

  fx.write_repo("hooks/guard.json", r#"{"stop":[{"matcher":"Bash","command":"check"}]}"#);
  let report = fx.sync(&["hook:guard"], &SyncOptions::default()).await;
  assert_eq!(report.updated.len(), 1);

  let settings = fx.read_project_json(".claude/settings.json");
  let stop = settings["hooks"]["Stop"].as_array().unwrap();
  let owned: Vec<_> = stop.iter().filter(|group| group["_agentkit"] == "guard").collect();
  assert_eq!(owned.len(), 1);
  assert_eq!(owned[0]["matcher"], "Bash");
  assert_eq!(stop[0]["hooks"][0]["command"], "say bye");
}

#[tokio::test]
async fn event_change_leaves_no_stale_entry() {
  let fx = Fixture::with_tools(&[Tool::Claude]);
  fx.write_repo("hooks/fmt.json", r#"{"postToolUse":[{"matcher":"Edit","command":"fmt"}]}"#);
  fx.sync(&["hook:fmt"], &SyncOptions::default()).await;

  fx.write_repo("hooks/fmt.json", r#"{"stop":[{"command":"fmt --all"}]}"#);
  fx.sync(&["hook:fmt"], &SyncOptions::default()).await;

  let hooks = &fx.read_project_json(".claude/settings.json")["hooks"];
  assert!(hooks.get("PostToolUse").is_none());
  assert_eq!(hooks["Stop"][0]["hooks"][0]["command"], "fmt --all");
}

#[tokio::test]
async fn removal_keeps_user_content() {
  let fx = Fixture::with_tools(&[Tool::Claude]);
  fx.write_project(".claude/settings.json", USER_SETTINGS);
  fx.write_repo("hooks/notify.json", r#"{"stop":[{"command":"notify-send done"}]}"#);
  fx.sync(&["hook:notify"], &SyncOptions::default()).await;

  let report = fx.sync(&[], &SyncOptions::default()).await;
  assert_eq!(report.removed.len(), 1);

  let original: serde_json::Value = serde_json::from_str(USER_SETTINGS).unwrap();
  assert_eq!(fx.read_project_json(".claude/settings.json"), original);
}
