//! Catalog discovery from a component repository.
//!
//! # Repository Layout
//!
//! ```text
//! <repository>/
//! ├── skills/<name>/SKILL.md   # skill directory, frontmatter may declare `requires`
//! ├── commands/<name>.md
//! ├── agents/<name>.md
//! ├── hooks/<name>.json        # canonical hook config
//! └── mcp/<name>.json          # MCP server spec
//! ```
//!
//! Skill frontmatter:
//!
//! ```text
//! ---
//! requires:
//!   skills: [git-basics]
//!   agents: [reviewer]
//!   mcpServers: [github]
//! ---
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::types::{Catalog, Category, ComponentId, Descriptor};
use crate::hooks::CanonicalHookConfig;

const SKILL_MANIFEST: &str = "SKILL.md";

#[derive(Debug, Error)]
pub enum ScanError {
  #[error("component repository not found: {}", path.display())]
  RepositoryNotFound { path: PathBuf },

  #[error("failed to read {}: {source}", path.display())]
  ReadDir { path: PathBuf, source: io::Error },
}

#[derive(Debug, Default, Deserialize)]
struct SkillFrontmatter {
  #[serde(default)]
  requires: Requires,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Requires {
  #[serde(default)]
  skills: Vec<String>,
  #[serde(default)]
  agents: Vec<String>,
  #[serde(default)]
  mcp_servers: Vec<String>,
}

impl Requires {
  fn into_ids(self) -> impl Iterator<Item = ComponentId> {
    let skills = self.skills.into_iter().map(|n| ComponentId::new(Category::Skill, n));
    let agents = self.agents.into_iter().map(|n| ComponentId::new(Category::Agent, n));
    let servers = self.mcp_servers.into_iter().map(|n| ComponentId::new(Category::McpServer, n));
    skills.chain(agents).chain(servers)
  }
}

/// Scan `repository` into a catalog.
///
/// Missing category directories are empty categories. Entries that cannot be
/// read or parsed are skipped with a warning.
pub fn scan(repository: &Path) -> Result<Catalog, ScanError> {
  if !repository.is_dir() {
    return Err(ScanError::RepositoryNotFound {
      path: repository.to_path_buf(),
    });
  }

  let mut descriptors = Vec::new();
  descriptors.extend(scan_skills(repository)?);
  descriptors.extend(scan_markdown(repository, "commands", Category::Command)?);
  descriptors.extend(scan_markdown(repository, "agents", Category::Agent)?);
  descriptors.extend(scan_json(repository, "mcp", Category::McpServer)?);
  descriptors.extend(scan_json(repository, "hooks", Category::Hook)?);

  let catalog = Catalog::new(descriptors);
  info!(repository = %repository.display(), components = catalog.len(), "scanned component repository");
  Ok(catalog)
}

/// Entries of `dir` sorted by file name, or nothing if it does not exist.
fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, ScanError> {
  let read_dir = match fs::read_dir(dir) {
    Ok(read_dir) => read_dir,
    Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
    Err(e) => {
      return Err(ScanError::ReadDir {
        path: dir.to_path_buf(),
        source: e,
      });
    }
  };

  let mut paths = Vec::new();
  for entry in read_dir {
    match entry {
      Ok(entry) => paths.push(entry.path()),
      Err(e) => warn!(dir = %dir.display(), error = %e, "skipping unreadable entry"),
    }
  }
  paths.sort();
  Ok(paths)
}

fn relative(repository: &Path, path: &Path) -> String {
  path
    .strip_prefix(repository)
    .unwrap_or(path)
    .to_string_lossy()
    .replace('\\', "/")
}

fn stem_with_extension(path: &Path, extension: &str) -> Option<String> {
  if path.extension().and_then(|e| e.to_str()) != Some(extension) || !path.is_file() {
    return None;
  }
  path.file_stem().and_then(|s| s.to_str()).map(str::to_string)
}

fn scan_skills(repository: &Path) -> Result<Vec<Descriptor>, ScanError> {
  let mut descriptors = Vec::new();

  for path in sorted_entries(&repository.join("skills"))? {
    if !path.is_dir() {
      continue;
    }
    let Some(name) = path.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
      continue;
    };

    let manifest = path.join(SKILL_MANIFEST);
    let content = match fs::read_to_string(&manifest) {
      Ok(content) => content,
      Err(e) => {
        warn!(skill = %name, path = %manifest.display(), error = %e, "skipping skill without readable manifest");
        continue;
      }
    };

    let requires = match parse_frontmatter(&content) {
      Ok(frontmatter) => frontmatter.requires,
      Err(e) => {
        warn!(skill = %name, error = %e, "invalid skill frontmatter, ignoring dependencies");
        Requires::default()
      }
    };

    let mut descriptor = Descriptor::file(Category::Skill, name, &path).with_dependencies(requires.into_ids());
    descriptor.source_reference = relative(repository, &path);
    debug!(id = %descriptor.id, dependencies = descriptor.dependencies.len(), "found skill");
    descriptors.push(descriptor);
  }

  Ok(descriptors)
}

/// Parse the YAML block between leading `---` fences. No frontmatter is not an error.
fn parse_frontmatter(content: &str) -> Result<SkillFrontmatter, serde_yaml::Error> {
  let Some(rest) = content.strip_prefix("---") else {
    return Ok(SkillFrontmatter::default());
  };
  let Some(end) = rest.find("\n---") else {
    return Ok(SkillFrontmatter::default());
  };

  let yaml = &rest[..end];
  if yaml.trim().is_empty() {
    return Ok(SkillFrontmatter::default());
  }
  serde_yaml::from_str(yaml)
}

fn scan_markdown(repository: &Path, dir: &str, category: Category) -> Result<Vec<Descriptor>, ScanError> {
  let mut descriptors = Vec::new();

  for path in sorted_entries(&repository.join(dir))? {
    let Some(name) = stem_with_extension(&path, "md") else {
      continue;
    };
    let mut descriptor = Descriptor::file(category, name, &path);
    descriptor.source_reference = relative(repository, &path);
    descriptors.push(descriptor);
  }

  Ok(descriptors)
}

fn scan_json(repository: &Path, dir: &str, category: Category) -> Result<Vec<Descriptor>, ScanError> {
  let mut descriptors = Vec::new();

  for path in sorted_entries(&repository.join(dir))? {
    let Some(name) = stem_with_extension(&path, "json") else {
      continue;
    };
    let source_reference = relative(repository, &path);

    let content = match fs::read_to_string(&path) {
      Ok(content) => content,
      Err(e) => {
        warn!(path = %path.display(), error = %e, "skipping unreadable component");
        continue;
      }
    };

    let descriptor = match category {
      Category::Hook => match serde_json::from_str::<CanonicalHookConfig>(&content) {
        Ok(config) => Descriptor::hook(name, config, source_reference),
        Err(e) => {
          warn!(path = %path.display(), error = %e, "skipping invalid hook config");
          continue;
        }
      },
      _ => match serde_json::from_str::<serde_json::Value>(&content) {
        Ok(spec) if spec.is_object() => Descriptor::mcp_server(name, spec, source_reference),
        Ok(_) => {
          warn!(path = %path.display(), "skipping MCP server spec that is not an object");
          continue;
        }
        Err(e) => {
          warn!(path = %path.display(), error = %e, "skipping invalid MCP server spec");
          continue;
        }
      },
    };
    descriptors.push(descriptor);
  }

  Ok(descriptors)
}
