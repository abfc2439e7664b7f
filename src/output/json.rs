//! Nodes/edges JSON document.

use std::{collections::BTreeMap, path::Path};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::core::{
    graph::{Cycle, DependencyGraph, NodeKind, Relationship},
    template::{DependencyKind, TemplateSource},
};

use super::GENERATOR;

pub const SCHEMA_VERSION: &str = "1.0";
pub const GRAPH_TYPE: &str = "hugo_template_dependencies";

#[derive(Debug, Serialize)]
pub struct JsonGraph<'a> {
    pub schema_version: &'static str,
    pub graph_type: &'static str,
    pub nodes: Vec<JsonNode<'a>>,
    pub edges: Vec<JsonEdge<'a>>,
    pub metadata: JsonMetadata,
    pub statistics: JsonStatistics,
}

#[derive(Debug, Serialize)]
pub struct JsonNode<'a> {
    pub id: &'a str,
    #[serde(rename = "type")]
    pub node_type: &'static str,
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<&'a TemplateSource>,
    pub metadata: &'a NodeKind,
}

#[derive(Debug, Serialize)]
pub struct JsonEdge<'a> {
    pub source: &'a str,
    pub target: &'a str,
    pub relationship: Relationship,
    pub metadata: JsonEdgeMetadata<'a>,
}

#[derive(Debug, Serialize)]
pub struct JsonEdgeMetadata<'a> {
    pub dependency_kind: DependencyKind,
    pub line_number: usize,
    pub context: &'a str,
    pub is_conditional: bool,
    pub resolved: bool,
}

#[derive(Debug, Serialize)]
pub struct JsonMetadata {
    pub generator: &'static str,
    #[serde(rename = "totalNodes")]
    pub total_nodes: usize,
    #[serde(rename = "totalEdges")]
    pub total_edges: usize,
    pub project_path: String,
}

#[derive(Debug, Serialize)]
pub struct JsonStatistics {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub has_cycles: bool,
    pub node_types: BTreeMap<&'static str, usize>,
    pub edge_relationships: BTreeMap<&'static str, usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycles: Option<Vec<Cycle>>,
}

/// Build the serializable view of `graph`.
pub fn document<'a>(graph: &'a DependencyGraph, project_root: &Path) -> JsonGraph<'a> {
    let nodes: Vec<JsonNode<'a>> = graph
        .nodes()
        .map(|node| JsonNode {
            id: &node.id,
            node_type: node.type_name(),
            name: &node.display_name,
            source: node.source(),
            metadata: &node.kind,
        })
        .collect();

    let edges: Vec<JsonEdge<'a>> = graph
        .edges()
        .map(|e| JsonEdge {
            source: &e.source.id,
            target: &e.target.id,
            relationship: e.edge.relationship,
            metadata: JsonEdgeMetadata {
                dependency_kind: e.edge.dependency_kind,
                line_number: e.edge.line,
                context: &e.edge.context,
                is_conditional: e.edge.is_conditional,
                resolved: !e.target.is_placeholder(),
            },
        })
        .collect();

    let mut node_types = BTreeMap::new();
    for node in &nodes {
        *node_types.entry(node.node_type).or_insert(0) += 1;
    }
    let edge_relationships: BTreeMap<&'static str, usize> = Relationship::all()
        .into_iter()
        .map(|relationship| (relationship.as_str(), graph.edge_count_by(relationship)))
        .filter(|(_, count)| *count > 0)
        .collect();

    let cycles = graph.detect_cycles();
    let has_cycles = !cycles.is_empty();

    JsonGraph {
        schema_version: SCHEMA_VERSION,
        graph_type: GRAPH_TYPE,
        metadata: JsonMetadata {
            generator: GENERATOR,
            total_nodes: nodes.len(),
            total_edges: edges.len(),
            project_path: project_root.display().to_string(),
        },
        statistics: JsonStatistics {
            total_nodes: nodes.len(),
            total_edges: edges.len(),
            has_cycles,
            node_types,
            edge_relationships,
            cycle_count: has_cycles.then_some(cycles.len()),
            cycles: has_cycles.then_some(cycles),
        },
        nodes,
        edges,
    }
}

pub fn render(graph: &DependencyGraph, project_root: &Path) -> Result<String> {
    let mut output = serde_json::to_string_pretty(&document(graph, project_root))
        .context("Failed to serialize dependency graph")?;
    output.push('\n');
    Ok(output)
}
