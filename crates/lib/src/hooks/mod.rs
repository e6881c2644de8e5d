//! Canonical hook model and its translation into each tool's native schema.
//!
//! A hook descriptor is written once in a tool-neutral form:
//!
//! ```json
//! { "stop": [ { "matcher": "*", "command": "notify-send done" } ] }
//! ```
//!
//! and materializes as one native representation per detected tool. The
//! canonical form is never written to a project directly.

mod adapter;
mod types;

pub use adapter::{NativeHooks, translate};
pub use types::{CanonicalHookConfig, HookEvent, HookTrigger};
