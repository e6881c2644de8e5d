//! Supported target tools and where each keeps its configuration.
//!
//! Every tool is identified by a marker directory at the project root. Paths
//! and schemas here are fixed by the tools themselves.
//!
//! | Tool   | Marker     | Hooks document          | MCP document        |
//! |--------|------------|-------------------------|---------------------|
//! | claude | `.claude/` | `.claude/settings.json` | `.mcp.json`         |
//! | cursor | `.cursor/` | `.cursor/hooks.json`    | `.cursor/mcp.json`  |

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::component::Category;
use crate::document::JsonDocument;
use crate::hooks::HookEvent;

/// How a tool lays out hook entries under an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookLayout {
  /// `[{ "matcher": m, "hooks": [{ "type": "command", "command": c }] }]`
  Grouped,
  /// `[{ "command": c, "matcher": m }]`, matcher omitted when it is `*`.
  Flat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
  Claude,
  Cursor,
}

impl Tool {
  pub const ALL: [Tool; 2] = [Tool::Claude, Tool::Cursor];

  pub fn as_str(self) -> &'static str {
    match self {
      Tool::Claude => "claude",
      Tool::Cursor => "cursor",
    }
  }

  /// Directory whose presence at the project root means the tool is in use.
  pub fn marker_dir(self) -> &'static str {
    match self {
      Tool::Claude => ".claude",
      Tool::Cursor => ".cursor",
    }
  }

  pub fn hook_layout(self) -> HookLayout {
    match self {
      Tool::Claude => HookLayout::Grouped,
      Tool::Cursor => HookLayout::Flat,
    }
  }

  /// Native name of a canonical event, or `None` if the tool has no such event.
  pub fn native_event(self, event: HookEvent) -> Option<&'static str> {
    match self {
      Tool::Claude => Some(match event {
        HookEvent::Stop => "Stop",
        HookEvent::PreToolUse => "PreToolUse",
        HookEvent::PostToolUse => "PostToolUse",
        HookEvent::Notification => "Notification",
        HookEvent::SubagentStop => "SubagentStop",
        HookEvent::SessionStart => "SessionStart",
        HookEvent::SessionEnd => "SessionEnd",
      }),
      Tool::Cursor => match event {
        HookEvent::Notification => None,
        other => Some(other.as_str()),
      },
    }
  }

  /// Document holding this tool's hooks.
  pub fn hooks_document(self, project_root: &Path) -> JsonDocument {
    match self {
      Tool::Claude => JsonDocument::new(project_root.join(".claude").join("settings.json"), "hooks"),
      Tool::Cursor => JsonDocument::new(project_root.join(".cursor").join("hooks.json"), "hooks")
        .with_seed("version", serde_json::json!(1)),
    }
  }

  /// Document holding this tool's MCP server registry.
  pub fn mcp_document(self, project_root: &Path) -> JsonDocument {
    match self {
      Tool::Claude => JsonDocument::new(project_root.join(".mcp.json"), "mcpServers"),
      Tool::Cursor => JsonDocument::new(project_root.join(".cursor").join("mcp.json"), "mcpServers"),
    }
  }

  /// Document owning entries of a JSON-entry category.
  pub fn document_for(self, project_root: &Path, category: Category) -> Option<JsonDocument> {
    match category {
      Category::Hook => Some(self.hooks_document(project_root)),
      Category::McpServer => Some(self.mcp_document(project_root)),
      Category::Skill | Category::Command | Category::Agent => None,
    }
  }

  /// Install location of a file-based descriptor.
  pub fn file_target(self, project_root: &Path, category: Category, name: &str) -> Option<PathBuf> {
    let base = project_root.join(self.marker_dir());
    match category {
      Category::Skill => Some(base.join("skills").join(name)),
      Category::Command => Some(base.join("commands").join(format!("{name}.md"))),
      Category::Agent => Some(base.join("agents").join(format!("{name}.md"))),
      Category::McpServer | Category::Hook => None,
    }
  }
}

impl fmt::Display for Tool {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Tool {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "claude" => Ok(Tool::Claude),
      "cursor" => Ok(Tool::Cursor),
      other => Err(format!("unknown tool: {other}")),
    }
  }
}

/// Tools whose marker directory exists under `project_root`.
pub fn detect_targets(project_root: &Path) -> BTreeSet<Tool> {
  let detected: BTreeSet<Tool> = Tool::ALL
    .into_iter()
    .filter(|tool| project_root.join(tool.marker_dir()).is_dir())
    .collect();
  debug!(root = %project_root.display(), tools = ?detected, "detected target tools");
  detected
}
