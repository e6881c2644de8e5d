//! Key-addressed sections: `{ "<key>": { ...entry } }`.
//!
//! Used for MCP server registries, where the key is the server name and there
//! is no grouping below it.

use serde_json::{Map, Value};

use super::{DocumentError, owner_of, stamp};

/// Set `section[key]` to `entry`, stamped with `owner`.
///
/// Fails with [`DocumentError::Conflict`] when the key already holds an entry
/// that `owner` does not own; user-defined entries are never overwritten.
pub fn upsert(section: &mut Map<String, Value>, key: &str, owner: &str, entry: Value) -> Result<(), DocumentError> {
  if let Some(existing) = section.get(key)
    && owner_of(existing) != Some(owner)
  {
    return Err(DocumentError::Conflict {
      key: key.to_string(),
      owner: owner.to_string(),
    });
  }

  let entry = stamp(entry, owner).ok_or_else(|| DocumentError::InvalidEntry { key: key.to_string() })?;
  section.insert(key.to_string(), entry);
  Ok(())
}

/// Remove every entry owned by `owner`. Returns whether anything was removed.
pub fn remove(section: &mut Map<String, Value>, owner: &str) -> bool {
  let before = section.len();
  section.retain(|_, entry| owner_of(entry) != Some(owner));
  section.len() != before
}

/// Whether any entry is owned by `owner`.
pub fn has(section: &Map<String, Value>, owner: &str) -> bool {
  section.values().any(|entry| owner_of(entry) == Some(owner))
}
