use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::hooks::CanonicalHookConfig;

/// Component category.
///
/// Declaration order is the order in which a sync processes categories:
/// file-based categories first, then MCP servers, then hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
  Skill,
  Command,
  Agent,
  McpServer,
  Hook,
}

impl Category {
  /// All categories in sync order.
  pub const ALL: [Category; 5] = [
    Category::Skill,
    Category::Command,
    Category::Agent,
    Category::McpServer,
    Category::Hook,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      Category::Skill => "skill",
      Category::Command => "command",
      Category::Agent => "agent",
      Category::McpServer => "mcpServer",
      Category::Hook => "hook",
    }
  }

  /// How descriptors of this category materialize in a target project.
  pub fn storage_mode(self) -> StorageMode {
    match self {
      Category::Skill | Category::Command | Category::Agent => StorageMode::FileBased,
      Category::McpServer | Category::Hook => StorageMode::JsonEntry,
    }
  }
}

impl fmt::Display for Category {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Category {
  type Err = ComponentIdError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "skill" => Ok(Category::Skill),
      "command" => Ok(Category::Command),
      "agent" => Ok(Category::Agent),
      "mcpServer" | "mcp" => Ok(Category::McpServer),
      "hook" => Ok(Category::Hook),
      other => Err(ComponentIdError::UnknownCategory(other.to_string())),
    }
  }
}

/// Whether a descriptor is a whole file/directory or an entry inside a shared document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StorageMode {
  FileBased,
  JsonEntry,
}

/// Identity of a descriptor: names are unique within a category only.
///
/// Rendered as `category:name`, e.g. `skill:code-review`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ComponentId {
  pub category: Category,
  pub name: String,
}

impl ComponentId {
  pub fn new(category: Category, name: impl Into<String>) -> Self {
    Self {
      category,
      name: name.into(),
    }
  }
}

impl fmt::Display for ComponentId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{}", self.category, self.name)
  }
}

impl FromStr for ComponentId {
  type Err = ComponentIdError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let (category, name) = s
      .split_once(':')
      .ok_or_else(|| ComponentIdError::Malformed(s.to_string()))?;
    if name.is_empty() {
      return Err(ComponentIdError::Malformed(s.to_string()));
    }
    Ok(Self::new(category.parse()?, name))
  }
}

impl TryFrom<String> for ComponentId {
  type Error = ComponentIdError;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    value.parse()
  }
}

impl From<ComponentId> for String {
  fn from(id: ComponentId) -> Self {
    id.to_string()
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComponentIdError {
  #[error("unknown component category: {0}")]
  UnknownCategory(String),

  #[error("malformed component id '{0}', expected <category>:<name>")]
  Malformed(String),
}

/// What a descriptor installs.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
  /// A file or directory tree copied as a whole into each target.
  File { source: PathBuf },

  /// A canonical hook configuration, translated per target tool.
  Hook(CanonicalHookConfig),

  /// An MCP server connection spec, written as a keyed entry.
  McpServer(serde_json::Value),
}

impl Payload {
  pub fn storage_mode(&self) -> StorageMode {
    match self {
      Payload::File { .. } => StorageMode::FileBased,
      Payload::Hook(_) | Payload::McpServer(_) => StorageMode::JsonEntry,
    }
  }
}

/// One distributable component definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Descriptor {
  pub id: ComponentId,
  pub payload: Payload,

  /// Where the descriptor came from in the repository (recorded in the tracker).
  pub source_reference: String,

  /// Other descriptors this one requires. Only followed for skills.
  pub dependencies: BTreeSet<ComponentId>,
}

impl Descriptor {
  /// A file-based descriptor (skill, command or agent).
  pub fn file(category: Category, name: impl Into<String>, source: impl Into<PathBuf>) -> Self {
    let source = source.into();
    Self {
      id: ComponentId::new(category, name),
      source_reference: source.display().to_string(),
      payload: Payload::File { source },
      dependencies: BTreeSet::new(),
    }
  }

  pub fn hook(name: impl Into<String>, config: CanonicalHookConfig, source_reference: impl Into<String>) -> Self {
    Self {
      id: ComponentId::new(Category::Hook, name),
      payload: Payload::Hook(config),
      source_reference: source_reference.into(),
      dependencies: BTreeSet::new(),
    }
  }

  pub fn mcp_server(name: impl Into<String>, spec: serde_json::Value, source_reference: impl Into<String>) -> Self {
    Self {
      id: ComponentId::new(Category::McpServer, name),
      payload: Payload::McpServer(spec),
      source_reference: source_reference.into(),
      dependencies: BTreeSet::new(),
    }
  }

  pub fn with_dependencies(mut self, dependencies: impl IntoIterator<Item = ComponentId>) -> Self {
    self.dependencies.extend(dependencies);
    self
  }

  pub fn name(&self) -> &str {
    &self.id.name
  }

  pub fn category(&self) -> Category {
    self.id.category
  }

  pub fn storage_mode(&self) -> StorageMode {
    self.payload.storage_mode()
  }
}

/// The full set of descriptors available in the repository, in catalog order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
  descriptors: Vec<Descriptor>,
  index: HashMap<ComponentId, usize>,
}

impl Catalog {
  /// Build a catalog from scanned descriptors.
  ///
  /// A later descriptor with the same id replaces an earlier one, keeping the
  /// earlier position.
  pub fn new(descriptors: impl IntoIterator<Item = Descriptor>) -> Self {
    let mut catalog = Self::default();
    for descriptor in descriptors {
      catalog.insert(descriptor);
    }
    catalog
  }

  fn insert(&mut self, descriptor: Descriptor) {
    match self.index.get(&descriptor.id) {
      Some(&position) => {
        warn!(id = %descriptor.id, "duplicate descriptor in catalog, later definition wins");
        self.descriptors[position] = descriptor;
      }
      None => {
        self.index.insert(descriptor.id.clone(), self.descriptors.len());
        self.descriptors.push(descriptor);
      }
    }
  }

  pub fn get(&self, id: &ComponentId) -> Option<&Descriptor> {
    self.index.get(id).map(|&i| &self.descriptors[i])
  }

  pub fn contains(&self, id: &ComponentId) -> bool {
    self.index.contains_key(id)
  }

  /// Position of a descriptor in catalog order.
  pub fn position(&self, id: &ComponentId) -> Option<usize> {
    self.index.get(id).copied()
  }

  pub fn iter(&self) -> impl Iterator<Item = &Descriptor> {
    self.descriptors.iter()
  }

  pub fn by_category(&self, category: Category) -> impl Iterator<Item = &Descriptor> {
    self.descriptors.iter().filter(move |d| d.category() == category)
  }

  /// Find descriptors with the given name in any category.
  pub fn find_by_name<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Descriptor> {
    self.descriptors.iter().filter(move |d| d.name() == name)
  }

  pub fn len(&self) -> usize {
    self.descriptors.len()
  }

  pub fn is_empty(&self) -> bool {
    self.descriptors.is_empty()
  }
}
