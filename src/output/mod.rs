//! Graph formatters.
//!
//! Every formatter is a pure function of the graph's public accessors and
//! returns the whole document as a string, newline-terminated.

pub mod dot;
pub mod json;
pub mod mermaid;
pub mod tree;

use std::path::Path;

use anyhow::Result;
use clap::ValueEnum;

use crate::core::graph::DependencyGraph;

/// Name written into generated documents.
pub const GENERATOR: &str = "hugo-deps";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable listing grouped by template kind
    #[default]
    Tree,
    /// Machine-readable nodes/edges document
    Json,
    /// Graphviz digraph
    Dot,
    /// Mermaid flowchart
    Mermaid,
}

/// Render `graph` in the requested format.
pub fn render(
    format: OutputFormat,
    graph: &DependencyGraph,
    project_root: &Path,
) -> Result<String> {
    let output = match format {
        OutputFormat::Tree => tree::render(graph, &project_name(project_root)),
        OutputFormat::Json => json::render(graph, project_root)?,
        OutputFormat::Dot => dot::render(graph),
        OutputFormat::Mermaid => mermaid::render(graph),
    };
    Ok(output)
}

/// Last path component of the project root, or the whole path.
pub fn project_name(project_root: &Path) -> String {
    project_root
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| project_root.display().to_string())
}

/// Join lines into a newline-terminated document.
fn finish(lines: Vec<String>) -> String {
    let mut output = lines.join("\n");
    output.push('\n');
    output
}
