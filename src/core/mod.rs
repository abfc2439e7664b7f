//! Core analysis engine.
//!
//! - `file_scanner` / `site_config` / `modules`: find the templates to analyze
//! - `parsers`: strip comments and extract dependency references
//! - `lookup`: map reference strings to templates
//! - `graph`: dependency graph, cycle detection and chains
//! - `context`: the pipeline tying these together

pub mod context;
pub mod file_scanner;
pub mod graph;
pub mod lookup;
pub mod modules;
pub mod parsers;
pub mod site_config;
pub mod template;

pub use context::{Analysis, AnalysisContext, AnalysisOptions, build_graph};
pub use graph::{Cycle, DependencyGraph, GraphEdge, GraphNode, NodeKind, Relationship};
pub use template::{Dependency, DependencyKind, Template, TemplateKind, TemplateSource};
