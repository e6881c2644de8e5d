use std::collections::BTreeMap;

use serde_json::{Map, Value, json};

use crate::consts::DEFAULT_MATCHER;
use crate::tools::{HookLayout, Tool};

use super::types::{CanonicalHookConfig, HookTrigger};

/// Hook entries in one tool's native schema, keyed by native event name.
///
/// Entries carry no ownership marker; the document merge stamps it on write.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NativeHooks {
  pub events: BTreeMap<String, Vec<Value>>,
}

impl NativeHooks {
  pub fn is_empty(&self) -> bool {
    self.events.is_empty()
  }

  /// The event table as a JSON object.
  pub fn to_value(&self) -> Value {
    let map: Map<String, Value> = self
      .events
      .iter()
      .map(|(event, entries)| (event.clone(), Value::Array(entries.clone())))
      .collect();
    Value::Object(map)
  }
}

/// Translate a canonical config into `tool`'s native hook schema.
///
/// Events the tool does not support are dropped. The output depends only on
/// the input, so repeated translation yields identical entries.
pub fn translate(config: &CanonicalHookConfig, tool: Tool) -> NativeHooks {
  let mut native = NativeHooks::default();

  for (event, triggers) in config.events() {
    let Some(native_event) = tool.native_event(event) else {
      continue;
    };
    if triggers.is_empty() {
      continue;
    }

    let entries = match tool.hook_layout() {
      HookLayout::Grouped => grouped_entries(triggers),
      HookLayout::Flat => triggers.iter().map(flat_entry).collect(),
    };
    native.events.insert(native_event.to_string(), entries);
  }

  native
}

fn grouped_entries(triggers: &[HookTrigger]) -> Vec<Value> {
  // (matcher, commands) in first-appearance order
  let mut groups: Vec<(&str, Vec<Value>)> = Vec::new();
  for trigger in triggers {
    let command = json!({ "type": "command", "command": trigger.command });
    match groups.iter().position(|(matcher, _)| *matcher == trigger.matcher()) {
      Some(index) => groups[index].1.push(command),
      None => groups.push((trigger.matcher(), vec![command])),
    }
  }

  groups
    .into_iter()
    .map(|(matcher, hooks)| json!({ "matcher": matcher, "hooks": hooks }))
    .collect()
}

fn flat_entry(trigger: &HookTrigger) -> Value {
  let mut entry = Map::new();
  entry.insert("command".to_string(), Value::String(trigger.command.clone()));
  if trigger.matcher() != DEFAULT_MATCHER {
    entry.insert("matcher".to_string(), Value::String(trigger.matcher().to_string()));
  }
  Value::Object(entry)
}
