//! Graphviz output: one cluster per template source.

use crate::core::{
    graph::{DependencyGraph, EdgeRef, GraphNode, NodeKind},
    template::{TemplateKind, TemplateSource},
};

use super::finish;

const INDENT: &str = "    ";

pub fn render(graph: &DependencyGraph) -> String {
    let mut lines = vec![
        "digraph hugo_dependencies {".to_string(),
        format!("{INDENT}rankdir = TB;"),
        format!("{INDENT}node [shape=box, style=filled, fontname=\"Helvetica\"];"),
    ];

    let (clusters, loose) = group_by_source(graph);

    for (i, (source, nodes)) in clusters.iter().enumerate() {
        lines.push(String::new());
        lines.push(format!("{INDENT}subgraph cluster_{i} {{"));
        lines.push(format!("{INDENT}{INDENT}label = {};", quote(source.as_str())));
        for node in nodes {
            lines.push(format!("{INDENT}{INDENT}{}", node_statement(node)));
        }
        lines.push(format!("{INDENT}}}"));
    }

    if !loose.is_empty() {
        lines.push(String::new());
        for node in &loose {
            lines.push(format!("{INDENT}{}", node_statement(node)));
        }
    }

    let edges: Vec<EdgeRef<'_>> = graph.edges().collect();
    if !edges.is_empty() {
        lines.push(String::new());
        for edge in &edges {
            lines.push(format!("{INDENT}{}", edge_statement(edge)));
        }
    }

    lines.push("}".to_string());
    finish(lines)
}

type Cluster<'g> = (TemplateSource, Vec<&'g GraphNode>);

/// Split nodes into per-source clusters (local first, then modules in order
/// of first appearance) and the nodes belonging to no source.
fn group_by_source(graph: &DependencyGraph) -> (Vec<Cluster<'_>>, Vec<&GraphNode>) {
    let mut clusters: Vec<Cluster<'_>> = vec![(TemplateSource::Local, Vec::new())];
    let mut loose = Vec::new();

    for node in graph.nodes() {
        let source = match &node.kind {
            NodeKind::Template { source, .. } => source.clone(),
            NodeKind::Module { module_path, .. } => TemplateSource::Module(module_path.clone()),
            NodeKind::Block { .. } | NodeKind::Placeholder => {
                loose.push(node);
                continue;
            }
        };
        match clusters.iter_mut().find(|(s, _)| *s == source) {
            Some((_, nodes)) => nodes.push(node),
            None => clusters.push((source, vec![node])),
        }
    }

    clusters.retain(|(_, nodes)| !nodes.is_empty());
    (clusters, loose)
}

fn node_statement(node: &GraphNode) -> String {
    let mut attributes = vec![format!("label={}", quote(&node.display_name))];
    match &node.kind {
        NodeKind::Template { template_kind, .. } => {
            attributes.push(format!("fillcolor=\"{}\"", template_color(*template_kind)));
        }
        NodeKind::Module { .. } => {
            attributes.push("shape=folder".to_string());
            attributes.push("fillcolor=\"#fff3e0\"".to_string());
        }
        NodeKind::Block { .. } => {
            attributes.push("shape=ellipse".to_string());
            attributes.push("fillcolor=\"#e8f5e8\"".to_string());
        }
        NodeKind::Placeholder => {
            attributes.push("style=dashed".to_string());
            attributes.push("fillcolor=\"#ffffff\"".to_string());
        }
    }
    format!("{} [{}];", quote(&node.id), attributes.join(", "))
}

fn edge_statement(edge: &EdgeRef<'_>) -> String {
    let mut attributes = vec![format!("label={}", quote(edge.edge.relationship.as_str()))];
    if edge.edge.is_conditional {
        attributes.push("style=dashed".to_string());
    }
    if edge.target.is_placeholder() {
        attributes.push("color=red".to_string());
    }
    format!(
        "{} -> {} [{}];",
        quote(&edge.source.id),
        quote(&edge.target.id),
        attributes.join(", ")
    )
}

fn template_color(kind: TemplateKind) -> &'static str {
    match kind {
        TemplateKind::Template => "#e1f5fe",
        TemplateKind::Partial => "#f3e5f5",
        TemplateKind::Shortcode => "#e0f2f1",
    }
}

/// Quote a DOT identifier.
fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}
