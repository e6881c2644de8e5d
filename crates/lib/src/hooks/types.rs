use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::consts::DEFAULT_MATCHER;

/// Abstract hook events understood by the adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HookEvent {
  Stop,
  PreToolUse,
  PostToolUse,
  Notification,
  SubagentStop,
  SessionStart,
  SessionEnd,
}

impl HookEvent {
  pub const ALL: [HookEvent; 7] = [
    HookEvent::Stop,
    HookEvent::PreToolUse,
    HookEvent::PostToolUse,
    HookEvent::Notification,
    HookEvent::SubagentStop,
    HookEvent::SessionStart,
    HookEvent::SessionEnd,
  ];

  /// Canonical event name.
  pub fn as_str(self) -> &'static str {
    match self {
      HookEvent::Stop => "stop",
      HookEvent::PreToolUse => "preToolUse",
      HookEvent::PostToolUse => "postToolUse",
      HookEvent::Notification => "notification",
      HookEvent::SubagentStop => "subagentStop",
      HookEvent::SessionStart => "sessionStart",
      HookEvent::SessionEnd => "sessionEnd",
    }
  }
}

impl fmt::Display for HookEvent {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for HookEvent {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    HookEvent::ALL
      .into_iter()
      .find(|event| event.as_str() == s)
      .ok_or_else(|| s.to_string())
  }
}

/// One trigger: run `command` when the event fires and `matcher` matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookTrigger {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub matcher: Option<String>,
  pub command: String,
}

impl HookTrigger {
  pub fn new(command: impl Into<String>) -> Self {
    Self {
      matcher: None,
      command: command.into(),
    }
  }

  pub fn with_matcher(mut self, matcher: impl Into<String>) -> Self {
    self.matcher = Some(matcher.into());
    self
  }

  /// Effective matcher, `*` when none was given.
  pub fn matcher(&self) -> &str {
    self.matcher.as_deref().unwrap_or(DEFAULT_MATCHER)
  }
}

/// Tool-neutral hook configuration: event name to ordered triggers.
///
/// Event names are kept as written so that configs mentioning events this
/// version does not know about still parse; [`CanonicalHookConfig::events`]
/// skips them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalHookConfig(pub BTreeMap<String, Vec<HookTrigger>>);

impl CanonicalHookConfig {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_trigger(mut self, event: HookEvent, trigger: HookTrigger) -> Self {
    self.0.entry(event.as_str().to_string()).or_default().push(trigger);
    self
  }

  /// Known events with their triggers, in canonical event order.
  pub fn events(&self) -> impl Iterator<Item = (HookEvent, &[HookTrigger])> {
    for name in self.0.keys() {
      if name.parse::<HookEvent>().is_err() {
        debug!(event = %name, "ignoring unknown hook event");
      }
    }
    HookEvent::ALL
      .into_iter()
      .filter_map(|event| self.0.get(event.as_str()).map(|triggers| (event, triggers.as_slice())))
  }

  pub fn is_empty(&self) -> bool {
    self.0.values().all(Vec::is_empty)
  }

  /// The same config with explicit default matchers dropped.
  ///
  /// Both spellings translate identically, so this is the form that gets
  /// fingerprinted.
  pub fn normalized(&self) -> Self {
    let events = self
      .0
      .iter()
      .map(|(event, triggers)| {
        let triggers = triggers
          .iter()
          .map(|trigger| HookTrigger {
            matcher: trigger.matcher.clone().filter(|m| m != DEFAULT_MATCHER),
            command: trigger.command.clone(),
          })
          .collect();
        (event.clone(), triggers)
      })
      .collect();
    Self(events)
  }
}
