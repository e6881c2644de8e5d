//! Event-keyed sections: `{ "<event>": [entry, ...] }`.
//!
//! Each owner has at most one logical entry set per event. Upserting replaces
//! the owner's previous entries for that event in place, so repeated upserts
//! with the same input leave the section unchanged.

use serde_json::{Map, Value};
use tracing::warn;

use crate::hooks::NativeHooks;

use super::{owner_of, stamp};

/// Replace `owner`'s entries under `event` with `entries`.
///
/// New entries take the position of the owner's first previous entry, or are
/// appended when the owner had none. Entries owned by others are untouched.
pub fn upsert(section: &mut Map<String, Value>, event: &str, owner: &str, entries: Vec<Value>) {
  let stamped: Vec<Value> = entries
    .into_iter()
    .filter_map(|entry| {
      let stamped = stamp(entry, owner);
      if stamped.is_none() {
        warn!(event, owner, "dropping non-object hook entry");
      }
      stamped
    })
    .collect();

  let slot = section
    .entry(event.to_string())
    .or_insert_with(|| Value::Array(Vec::new()));
  if !slot.is_array() {
    warn!(event, "event value is not an array, replacing it");
    *slot = Value::Array(Vec::new());
  }
  let Some(array) = slot.as_array_mut() else {
    return;
  };

  let position = array
    .iter()
    .position(|entry| owner_of(entry) == Some(owner))
    .unwrap_or(array.len());
  array.retain(|entry| owner_of(entry) != Some(owner));
  let position = position.min(array.len());
  array.splice(position..position, stamped);

  if array.is_empty() {
    section.shift_remove(event);
  }
}

/// Remove every entry owned by `owner` under every event.
///
/// Event arrays emptied by the removal are deleted. Returns whether anything
/// was removed.
pub fn remove(section: &mut Map<String, Value>, owner: &str) -> bool {
  let events: Vec<String> = section.keys().cloned().collect();
  let mut removed = false;
  for event in events {
    removed |= strip_event(section, &event, owner);
  }
  removed
}

/// Whether any event holds an entry owned by `owner`.
pub fn has(section: &Map<String, Value>, owner: &str) -> bool {
  section
    .values()
    .filter_map(Value::as_array)
    .flatten()
    .any(|entry| owner_of(entry) == Some(owner))
}

/// Make `owner`'s entries match `native` exactly.
///
/// Every native event is upserted; events the owner had entries under but
/// that no longer appear in `native` are stripped of them.
pub fn replace_owner(section: &mut Map<String, Value>, owner: &str, native: &NativeHooks) {
  for (event, entries) in &native.events {
    upsert(section, event, owner, entries.clone());
  }

  let stale: Vec<String> = section
    .keys()
    .filter(|event| !native.events.contains_key(*event))
    .cloned()
    .collect();
  for event in stale {
    strip_event(section, &event, owner);
  }
}

fn strip_event(section: &mut Map<String, Value>, event: &str, owner: &str) -> bool {
  let Some(Value::Array(array)) = section.get_mut(event) else {
    return false;
  };
  let before = array.len();
  array.retain(|entry| owner_of(entry) != Some(owner));
  let removed = array.len() != before;
  if removed && array.is_empty() {
    section.shift_remove(event);
  }
  removed
}
