//! hugo-deps - dependency graphs for Hugo templates
//!
//! Statically analyzes a Hugo project's templates (and the templates of its
//! imported modules), extracts `partial`/`template`/`include` calls and
//! `define`/`block` definitions, and builds a directed dependency graph that
//! can be queried for cycles and include chains or exported for tooling.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer
//! - `config`: Tool configuration file loading and parsing
//! - `core`: Analysis engine (discovery, extraction, graph)
//! - `issues`: Issue type definitions and reporting
//! - `output`: Graph formatters (tree, JSON, DOT, Mermaid)

pub mod cli;
pub mod config;
pub mod core;
pub mod issues;
pub mod output;
