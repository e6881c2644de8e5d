//! agentkit-lib: reconciliation engine for agentkit.
//!
//! This crate distributes components (skills, commands, agents, hooks and MCP
//! server definitions) from a repository catalog into the per-project
//! configuration of one or more AI coding tools:
//! - `component`: descriptor model and the repository catalog scan
//! - `util::hash`: content fingerprints used to detect drift
//! - `tracker`: per-project record of what agentkit installed
//! - `hooks` / `tools`: canonical hook model and per-tool translation
//! - `document`: ownership-aware merges into shared JSON documents
//! - `resolve`: dependency closure and orphan computation
//! - `sync`: status classification, planning and application

pub mod component;
pub mod config;
pub mod consts;
pub mod document;
pub mod env;
pub mod hooks;
pub mod resolve;
pub mod sync;
pub mod tools;
pub mod tracker;
pub mod util;
