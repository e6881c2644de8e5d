//! Content fingerprints for drift detection.
//!
//! This module provides:
//! - `ContentHash`: a full 64-character SHA-256 hex digest
//! - `fingerprint()`: digest of a descriptor payload, or `None` if its source is gone
//! - `hash_directory()`: deterministic directory hashing
//! - `hash_file()`: single file hashing
//! - `hash_json()`: hashing of a JSON value independent of key order

use std::fs;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use tracing::debug;
use walkdir::WalkDir;

use crate::component::Payload;

/// A full 64-character SHA-256 hash of some content.
///
/// # Format
///
/// The hash is a lowercase hexadecimal string (64 characters).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(pub String);

impl std::fmt::Display for ContentHash {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Error during file or directory hashing.
#[derive(Debug, thiserror::Error)]
pub enum DirHashError {
  #[error("failed to walk directory: {message}")]
  WalkDir { message: String },

  #[error("failed to read file {path}: {message}")]
  ReadFile { path: String, message: String },

  #[error("failed to read symlink {path}: {message}")]
  ReadSymlink { path: String, message: String },

  #[error("failed to serialize value: {0}")]
  Serialize(#[from] serde_json::Error),
}

/// Fingerprint a descriptor payload.
///
/// File payloads hash the file bytes (or the directory tree); JSON payloads
/// hash a key-sorted serialization. Returns `None` when the source cannot be
/// read, which callers treat as "changed".
pub fn fingerprint(payload: &Payload) -> Option<ContentHash> {
  let result = match payload {
    Payload::File { source } => return fingerprint_path(source),
    Payload::Hook(config) => serde_json::to_value(config.normalized())
      .map(|value| hash_json(&value))
      .map_err(DirHashError::from),
    Payload::McpServer(spec) => Ok(hash_json(spec)),
  };

  match result {
    Ok(hash) => Some(hash),
    Err(e) => {
      debug!(error = %e, "payload could not be fingerprinted");
      None
    }
  }
}

/// Fingerprint a file or directory on disk, `None` if it is missing or unreadable.
pub fn fingerprint_path(path: &Path) -> Option<ContentHash> {
  let metadata = fs::metadata(path).ok()?;
  let result = if metadata.is_dir() {
    hash_directory(path)
  } else {
    hash_file(path)
  };

  match result {
    Ok(hash) => Some(hash),
    Err(e) => {
      debug!(path = %path.display(), error = %e, "path could not be fingerprinted");
      None
    }
  }
}

/// Compute a deterministic hash of a directory's contents.
///
/// The hash includes:
/// - File contents (not metadata like timestamps or permissions)
/// - Directory structure
/// - Symlink targets
///
/// Entries are sorted by path for determinism.
pub fn hash_directory(path: &Path) -> Result<ContentHash, DirHashError> {
  let mut entries: Vec<(String, String)> = Vec::new();

  for entry in WalkDir::new(path).sort_by_file_name() {
    let entry = entry.map_err(|e| DirHashError::WalkDir { message: e.to_string() })?;
    let entry_path = entry.path();

    // Use forward slashes so the hash does not depend on the platform
    let rel_path = entry_path
      .strip_prefix(path)
      .unwrap_or(entry_path)
      .to_string_lossy()
      .replace('\\', "/");

    // Skip the root directory itself
    if rel_path.is_empty() {
      continue;
    }

    let file_type = entry.file_type();
    let entry_hash = if file_type.is_file() {
      let content_hash = hash_file(entry_path)?;
      format!("F:{}:{}", rel_path, content_hash.0)
    } else if file_type.is_dir() {
      format!("D:{}", rel_path)
    } else if file_type.is_symlink() {
      let target = fs::read_link(entry_path).map_err(|e| DirHashError::ReadSymlink {
        path: entry_path.display().to_string(),
        message: e.to_string(),
      })?;
      let target_hash = hash_bytes(target.to_string_lossy().as_bytes());
      format!("L:{}:{}", rel_path, target_hash.0)
    } else {
      // Skip special files (sockets, devices, etc.)
      continue;
    };

    entries.push((rel_path, entry_hash));
  }

  entries.sort_by(|a, b| a.0.cmp(&b.0));

  let mut hasher = Sha256::new();
  for (_, entry_hash) in entries {
    hasher.update(entry_hash.as_bytes());
    hasher.update(b"\n");
  }

  Ok(ContentHash(format!("{:x}", hasher.finalize())))
}

/// Hash a file's contents.
pub fn hash_file(path: &Path) -> Result<ContentHash, DirHashError> {
  let mut file = fs::File::open(path).map_err(|e| DirHashError::ReadFile {
    path: path.display().to_string(),
    message: e.to_string(),
  })?;

  let mut hasher = Sha256::new();
  let mut buffer = [0u8; 8192];

  loop {
    let bytes_read = file.read(&mut buffer).map_err(|e| DirHashError::ReadFile {
      path: path.display().to_string(),
      message: e.to_string(),
    })?;
    if bytes_read == 0 {
      break;
    }
    hasher.update(&buffer[..bytes_read]);
  }

  Ok(ContentHash(format!("{:x}", hasher.finalize())))
}

/// Hash arbitrary bytes.
pub fn hash_bytes(data: &[u8]) -> ContentHash {
  let mut hasher = Sha256::new();
  hasher.update(data);
  ContentHash(format!("{:x}", hasher.finalize()))
}

/// Hash a JSON value so that objects differing only in key order hash equally.
pub fn hash_json(value: &Value) -> ContentHash {
  hash_bytes(canonicalize(value).to_string().as_bytes())
}

/// Rebuild `value` with object keys inserted in sorted order.
fn canonicalize(value: &Value) -> Value {
  match value {
    Value::Object(map) => {
      let mut keys: Vec<&String> = map.keys().collect();
      keys.sort();
      let sorted: Map<String, Value> = keys
        .into_iter()
        .map(|key| (key.clone(), canonicalize(&map[key])))
        .collect();
      Value::Object(sorted)
    }
    Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
    other => other.clone(),
  }
}
