use anyhow::{Context, Result};
use serde::Serialize;

use agentkit_lib::component::Category;
use agentkit_lib::config::Config;
use agentkit_lib::tools::{Tool, detect_targets};

use super::{GlobalArgs, load_project};
use crate::output::{print_info, print_json, print_stat, print_success};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TargetInfo {
  tool: Tool,
  detected: bool,
  hooks_document: String,
  mcp_document: String,
  skills_dir: String,
}

pub fn cmd_targets(global: &GlobalArgs) -> Result<()> {
  let config = Config::load().context("Failed to load configuration")?;
  let project = load_project(global, &config)?;
  let root = &project.root;
  let detected = detect_targets(root);

  let targets: Vec<TargetInfo> = project
    .tools
    .iter()
    .map(|&tool| TargetInfo {
      tool,
      detected: detected.contains(&tool),
      hooks_document: tool.hooks_document(root).path().display().to_string(),
      mcp_document: tool.mcp_document(root).path().display().to_string(),
      skills_dir: tool
        .file_target(root, Category::Skill, "")
        .map(|p| p.display().to_string())
        .unwrap_or_default(),
    })
    .collect();

  if global.json {
    return print_json(&targets);
  }

  if detected.is_empty() {
    print_info("No tool detected in the project, using configured defaults.");
  }
  for target in &targets {
    print_success(&format!("{}{}", target.tool, if target.detected { "" } else { " (default)" }));
    print_stat("Hooks", &target.hooks_document);
    print_stat("MCP servers", &target.mcp_document);
    print_stat("Skills", &target.skills_dir);
  }

  Ok(())
}
