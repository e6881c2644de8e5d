//! Ownership-aware merges into shared JSON documents.
//!
//! Tool configuration files (settings, hook registries, MCP registries) are
//! shared with the user and other tooling. agentkit only ever touches entries
//! that carry its ownership marker (`"_agentkit": "<descriptor name>"`); all
//! other content is preserved as read.
//!
//! A [`JsonDocument`] is a handle (path plus the section key agentkit writes
//! under). It holds no content: every [`JsonDocument::update`] reads the file,
//! applies one mutation to the section and writes the whole file back.
//!
//! Two section shapes are supported:
//! - [`events`]: event name to array of entries (hooks)
//! - [`keyed`]: entry key to entry object (MCP servers)

pub mod events;
pub mod keyed;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::consts::OWNER_FIELD;

/// Errors that can occur while merging into a document.
#[derive(Debug, Error)]
pub enum DocumentError {
  #[error("failed to read {}: {source}", path.display())]
  Read { path: PathBuf, source: io::Error },

  #[error("failed to write {}: {source}", path.display())]
  Write { path: PathBuf, source: io::Error },

  #[error("failed to create directory {}: {source}", path.display())]
  CreateDir { path: PathBuf, source: io::Error },

  #[error("failed to serialize document: {0}")]
  Serialize(#[source] serde_json::Error),

  /// The key is taken by an entry agentkit does not own.
  #[error("entry '{key}' already exists and is not owned by '{owner}'")]
  Conflict { key: String, owner: String },

  #[error("entry '{key}' must be a JSON object")]
  InvalidEntry { key: String },
}

/// Owner recorded on a document entry, if any.
pub fn owner_of(entry: &Value) -> Option<&str> {
  entry.get(OWNER_FIELD).and_then(Value::as_str)
}

/// Stamp the ownership marker on an entry. Returns `None` for non-objects.
pub(crate) fn stamp(entry: Value, owner: &str) -> Option<Value> {
  match entry {
    Value::Object(mut map) => {
      map.insert(OWNER_FIELD.to_string(), Value::String(owner.to_string()));
      Some(Value::Object(map))
    }
    _ => None,
  }
}

/// Handle to a JSON document and the section agentkit manages in it.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonDocument {
  path: PathBuf,
  section: String,
  /// Top-level fields written when the document is created.
  seed: Map<String, Value>,
}

impl JsonDocument {
  pub fn new(path: impl Into<PathBuf>, section: impl Into<String>) -> Self {
    Self {
      path: path.into(),
      section: section.into(),
      seed: Map::new(),
    }
  }

  pub fn with_seed(mut self, key: &str, value: Value) -> Self {
    self.seed.insert(key.to_string(), value);
    self
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  pub fn section(&self) -> &str {
    &self.section
  }

  /// Read the root object.
  ///
  /// Returns `Ok(None)` when the file is missing or does not hold a JSON
  /// object; a corrupt document is treated as absent and replaced on the next
  /// write.
  fn load_root(&self) -> Result<Option<Map<String, Value>>, DocumentError> {
    let content = match fs::read_to_string(&self.path) {
      Ok(content) => content,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
      Err(e) => {
        return Err(DocumentError::Read {
          path: self.path.clone(),
          source: e,
        });
      }
    };

    match serde_json::from_str::<Value>(&content) {
      Ok(Value::Object(root)) => Ok(Some(root)),
      Ok(_) => {
        warn!(path = %self.path.display(), "document root is not an object, treating as empty");
        Ok(None)
      }
      Err(e) => {
        warn!(path = %self.path.display(), error = %e, "document is not valid JSON, treating as empty");
        Ok(None)
      }
    }
  }

  /// Current content of the managed section (empty if absent or unreadable).
  pub fn read_section(&self) -> Map<String, Value> {
    let root = match self.load_root() {
      Ok(root) => root,
      Err(e) => {
        warn!(error = %e, "treating unreadable document as empty");
        None
      }
    };
    match root.and_then(|mut root| root.remove(&self.section)) {
      Some(Value::Object(section)) => section,
      _ => Map::new(),
    }
  }

  /// Read-modify-write the managed section.
  ///
  /// The file is only written when the section actually changed. A section
  /// left empty is removed from the document; the document itself is kept.
  pub fn update<T>(
    &self,
    mutate: impl FnOnce(&mut Map<String, Value>) -> Result<T, DocumentError>,
  ) -> Result<T, DocumentError> {
    let existing = self.load_root()?;
    let created = existing.is_none();
    let mut root = existing.unwrap_or_default();

    // Work on a copy so the section keeps its position among the user's keys.
    let mut section = match root.get(&self.section) {
      Some(Value::Object(section)) => section.clone(),
      Some(_) => {
        warn!(
          path = %self.path.display(),
          section = %self.section,
          "section is not an object, replacing it"
        );
        Map::new()
      }
      None => Map::new(),
    };
    let before = section.clone();

    let result = mutate(&mut section)?;

    if section == before {
      debug!(path = %self.path.display(), "document unchanged, skipping write");
      return Ok(result);
    }

    if section.is_empty() {
      root.shift_remove(&self.section);
    } else {
      root.insert(self.section.clone(), Value::Object(section));
    }
    if created {
      for (key, value) in &self.seed {
        root.entry(key.clone()).or_insert_with(|| value.clone());
      }
    }

    self.save(&Value::Object(root))?;
    Ok(result)
  }

  /// Write the whole document atomically (temp file, then rename).
  fn save(&self, root: &Value) -> Result<(), DocumentError> {
    if let Some(parent) = self.path.parent() {
      fs::create_dir_all(parent).map_err(|e| DocumentError::CreateDir {
        path: parent.to_path_buf(),
        source: e,
      })?;
    }

    let mut content = serde_json::to_string_pretty(root).map_err(DocumentError::Serialize)?;
    content.push('\n');

    let mut temp_name = self.path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".tmp");
    let temp_path = self.path.with_file_name(temp_name);

    fs::write(&temp_path, &content).map_err(|e| DocumentError::Write {
      path: temp_path.clone(),
      source: e,
    })?;
    fs::rename(&temp_path, &self.path).map_err(|e| DocumentError::Write {
      path: self.path.clone(),
      source: e,
    })?;

    debug!(path = %self.path.display(), bytes = content.len(), "document written");
    Ok(())
  }
}
