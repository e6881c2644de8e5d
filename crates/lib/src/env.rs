//! Environment references in JSON-entry payloads.
//!
//! Hook commands and MCP server specs may reference environment variables
//! that must be set for the component to work. A descriptor referencing an
//! unset variable is flagged as missing environment and only installed on
//! explicit override.
//!
//! # Reference Formats
//!
//! - `${NAME}` - required; missing when `NAME` is unset or empty
//! - `${NAME:-default}` - optional; never reported as missing
//!
//! A bare `$NAME` is left to the consuming tool's shell and is not a reference.
//!
//! # Example
//!
//! ```
//! use agentkit_lib::env::referenced_vars;
//! use serde_json::json;
//!
//! let spec = json!({ "env": { "TOKEN": "${GITHUB_TOKEN}", "HOST": "${GH_HOST:-github.com}" } });
//! let names: Vec<String> = referenced_vars(&spec).into_iter().collect();
//! assert_eq!(names, vec!["GITHUB_TOKEN".to_string()]);
//! ```

use std::collections::BTreeSet;

use serde_json::Value;
use tracing::debug;

use crate::component::{Descriptor, Payload};

/// One `${...}` reference found in a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvReference {
  pub name: String,
  /// The reference carries a `:-` fallback.
  pub has_default: bool,
}

impl EnvReference {
  pub fn is_required(&self) -> bool {
    !self.has_default
  }
}

/// Answers whether an environment variable is set.
pub trait EnvProbe {
  fn is_set(&self, name: &str) -> bool;
}

/// Probes the environment of the running process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvProbe for ProcessEnv {
  fn is_set(&self, name: &str) -> bool {
    std::env::var_os(name).is_some_and(|value| !value.is_empty())
  }
}

impl<F> EnvProbe for F
where
  F: Fn(&str) -> bool,
{
  fn is_set(&self, name: &str) -> bool {
    self(name)
  }
}

/// Parse every well-formed `${...}` reference in `input`.
///
/// Unclosed braces and invalid names are skipped, not errors: the string is
/// opaque configuration for another tool.
pub fn parse_references(input: &str) -> Vec<EnvReference> {
  let mut references = Vec::new();
  let mut chars = input.char_indices().peekable();

  while let Some((_, ch)) = chars.next() {
    if ch != '$' {
      continue;
    }
    let Some(&(open, '{')) = chars.peek() else {
      continue;
    };
    chars.next();

    let body_start = open + 1;
    let Some(close) = input[body_start..].find('}') else {
      break;
    };
    let body = &input[body_start..body_start + close];

    let (name, has_default) = match body.split_once(":-") {
      Some((name, _)) => (name, true),
      None => (body, false),
    };
    if is_valid_name(name) {
      references.push(EnvReference {
        name: name.to_string(),
        has_default,
      });
    }

    // Resume after the closing brace
    while let Some(&(pos, _)) = chars.peek() {
      if pos > body_start + close {
        break;
      }
      chars.next();
    }
  }

  references
}

fn is_valid_name(name: &str) -> bool {
  let mut chars = name.chars();
  match chars.next() {
    Some(first) if first.is_ascii_alphabetic() || first == '_' => {
      chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    }
    _ => false,
  }
}

/// Names of required variables referenced anywhere in `value`.
///
/// Walks nested objects and arrays with an explicit stack; object keys are
/// not scanned.
pub fn referenced_vars(value: &Value) -> BTreeSet<String> {
  let mut names = BTreeSet::new();
  let mut stack = vec![value];

  while let Some(current) = stack.pop() {
    match current {
      Value::String(s) => {
        names.extend(
          parse_references(s)
            .into_iter()
            .filter(EnvReference::is_required)
            .map(|r| r.name),
        );
      }
      Value::Array(items) => stack.extend(items.iter()),
      Value::Object(map) => stack.extend(map.values()),
      Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
  }

  names
}

/// Required variables referenced by `value` that `probe` reports unset.
pub fn missing_vars(value: &Value, probe: &dyn EnvProbe) -> BTreeSet<String> {
  referenced_vars(value)
    .into_iter()
    .filter(|name| !probe.is_set(name))
    .collect()
}

/// Missing variables for a descriptor. File-based descriptors never reference any.
pub fn missing_for(descriptor: &Descriptor, probe: &dyn EnvProbe) -> BTreeSet<String> {
  let value = match &descriptor.payload {
    Payload::File { .. } => return BTreeSet::new(),
    Payload::McpServer(spec) => spec.clone(),
    Payload::Hook(config) => match serde_json::to_value(config) {
      Ok(value) => value,
      Err(e) => {
        debug!(id = %descriptor.id, error = %e, "hook config not scannable for environment");
        return BTreeSet::new();
      }
    },
  };

  let missing = missing_vars(&value, probe);
  if !missing.is_empty() {
    debug!(id = %descriptor.id, missing = ?missing, "descriptor references unset environment");
  }
  missing
}
