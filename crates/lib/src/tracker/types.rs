use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::component::{Category, ComponentId};
use crate::consts::TRACKER_VERSION;
use crate::util::hash::ContentHash;

/// Errors from persisting the tracker record.
///
/// Reads never fail: a missing or corrupt record is an empty one.
#[derive(Debug, Error)]
pub enum TrackerError {
  #[error("failed to create tracker directory {}: {source}", path.display())]
  CreateDir { path: PathBuf, source: io::Error },

  #[error("failed to write tracker {}: {source}", path.display())]
  Write { path: PathBuf, source: io::Error },

  #[error("failed to serialize tracker: {0}")]
  Serialize(#[source] serde_json::Error),
}

/// One installed descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstalledEntry {
  pub fingerprint: ContentHash,
  pub installed_at: DateTime<Utc>,
  pub source_reference: String,

  /// Installed only because something selected depends on it.
  #[serde(default, skip_serializing_if = "std::ops::Not::not")]
  pub dependency: bool,
}

/// Installed entries, namespaced by category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentRecords {
  #[serde(default)]
  pub skill: BTreeMap<String, InstalledEntry>,
  #[serde(default)]
  pub command: BTreeMap<String, InstalledEntry>,
  #[serde(default)]
  pub agent: BTreeMap<String, InstalledEntry>,
  #[serde(default)]
  pub hook: BTreeMap<String, InstalledEntry>,
  #[serde(default, rename = "mcpServer")]
  pub mcp_server: BTreeMap<String, InstalledEntry>,
}

impl ComponentRecords {
  fn table(&self, category: Category) -> &BTreeMap<String, InstalledEntry> {
    match category {
      Category::Skill => &self.skill,
      Category::Command => &self.command,
      Category::Agent => &self.agent,
      Category::Hook => &self.hook,
      Category::McpServer => &self.mcp_server,
    }
  }

  fn table_mut(&mut self, category: Category) -> &mut BTreeMap<String, InstalledEntry> {
    match category {
      Category::Skill => &mut self.skill,
      Category::Command => &mut self.command,
      Category::Agent => &mut self.agent,
      Category::Hook => &mut self.hook,
      Category::McpServer => &mut self.mcp_server,
    }
  }
}

/// The persisted tracker document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerRecord {
  pub version: u32,
  #[serde(default)]
  pub components: ComponentRecords,
}

impl Default for TrackerRecord {
  fn default() -> Self {
    Self {
      version: TRACKER_VERSION,
      components: ComponentRecords::default(),
    }
  }
}

impl TrackerRecord {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn lookup(&self, id: &ComponentId) -> Option<&InstalledEntry> {
    self.components.table(id.category).get(&id.name)
  }

  pub fn lookup_mut(&mut self, id: &ComponentId) -> Option<&mut InstalledEntry> {
    self.components.table_mut(id.category).get_mut(&id.name)
  }

  /// Insert or overwrite the entry for `id`.
  pub fn insert(&mut self, id: &ComponentId, entry: InstalledEntry) {
    self.components.table_mut(id.category).insert(id.name.clone(), entry);
  }

  pub fn remove(&mut self, id: &ComponentId) -> Option<InstalledEntry> {
    self.components.table_mut(id.category).remove(&id.name)
  }

  /// All entries in category order, then by name.
  pub fn iter(&self) -> impl Iterator<Item = (ComponentId, &InstalledEntry)> {
    Category::ALL.into_iter().flat_map(move |category| {
      self
        .components
        .table(category)
        .iter()
        .map(move |(name, entry)| (ComponentId::new(category, name.clone()), entry))
    })
  }

  pub fn tracked_ids(&self) -> BTreeSet<ComponentId> {
    self.iter().map(|(id, _)| id).collect()
  }

  /// Descriptors that were selected directly rather than pulled in as dependencies.
  pub fn direct_selection(&self) -> BTreeSet<ComponentId> {
    self.iter().filter(|(_, entry)| !entry.dependency).map(|(id, _)| id).collect()
  }

  pub fn is_empty(&self) -> bool {
    self.iter().next().is_none()
  }
}
