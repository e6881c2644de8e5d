//! CLI output formatting utilities.
//!
//! Provides consistent formatting for terminal output including colored status
//! messages, human-readable ages, and Unicode symbols.

use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, Utc};
use owo_colors::{OwoColorize, Stream};

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const ERROR: &str = "✗";
  pub const WARNING: &str = "⚠";
  pub const INFO: &str = "•";
  pub const ADD: &str = "+";
  pub const MODIFY: &str = "~";
  pub const REMOVE: &str = "-";
  pub const ORPHAN: &str = "?";
}

pub fn truncate_hash(hash: &str) -> &str {
  let len = hash.len().min(12);
  &hash[..len]
}

/// Age of a timestamp rounded down to its largest unit, e.g. `3days`, `2h`, `45s`.
pub fn format_age(since: DateTime<Utc>, now: DateTime<Utc>) -> String {
  let secs = (now - since).to_std().unwrap_or_default().as_secs();
  let rounded = match secs {
    s if s >= 86_400 => s - s % 86_400,
    s if s >= 3_600 => s - s % 3_600,
    s if s >= 60 => s - s % 60,
    s => s,
  };
  humantime::format_duration(Duration::from_secs(rounded)).to_string()
}

pub fn print_success(message: &str) {
  println!(
    "{} {}",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
    message
  );
}

pub fn print_error(message: &str) {
  eprintln!(
    "{} {}",
    symbols::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
    message.if_supports_color(Stream::Stderr, |s| s.red())
  );
}

pub fn print_warning(message: &str) {
  eprintln!(
    "{} {}",
    symbols::WARNING.if_supports_color(Stream::Stderr, |s| s.yellow()),
    message.if_supports_color(Stream::Stderr, |s| s.yellow())
  );
}

pub fn print_info(message: &str) {
  println!(
    "{} {}",
    symbols::INFO.if_supports_color(Stream::Stdout, |s| s.blue()),
    message
  );
}

pub fn print_stat(label: &str, value: &str) {
  println!(
    "  {}: {}",
    label.if_supports_color(Stream::Stdout, |s| s.dimmed()),
    value
  );
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{}", json);
  Ok(())
}
