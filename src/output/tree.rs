//! Plain-text listing: templates grouped by kind with their outgoing edges.

use crate::core::{
    graph::{DependencyGraph, EdgeRef, GraphNode, NodeKind, Relationship},
    template::{TemplateKind, TemplateSource},
};

use super::finish;

pub fn render(graph: &DependencyGraph, project_name: &str) -> String {
    let mut lines = vec![project_name.to_string()];

    for kind in TemplateKind::all() {
        let nodes: Vec<&GraphNode> = graph
            .nodes()
            .filter(|n| n.template_kind() == Some(kind))
            .collect();
        if nodes.is_empty() {
            continue;
        }

        lines.push(String::new());
        lines.push(format!("{} ({})", group_title(kind), nodes.len()));
        for (i, node) in nodes.iter().enumerate() {
            let last = i + 1 == nodes.len();
            lines.push(format!("{}{}", branch(last), node_label(node)));

            let indent = if last { "    " } else { "\u{2502}   " };
            let edges = graph.outgoing(&node.id);
            for (j, edge) in edges.iter().enumerate() {
                lines.push(format!(
                    "{}{}{}",
                    indent,
                    branch(j + 1 == edges.len()),
                    edge_label(edge)
                ));
            }
        }
    }

    let modules: Vec<&GraphNode> = graph
        .nodes()
        .filter(|n| matches!(n.kind, NodeKind::Module { .. }))
        .collect();
    push_flat_group(&mut lines, "Modules", &modules);

    let placeholders: Vec<&GraphNode> = graph.placeholders().collect();
    push_flat_group(&mut lines, "Unresolved", &placeholders);

    if lines.len() == 1 {
        lines.push("(no templates found)".to_string());
    }

    finish(lines)
}

fn push_flat_group(lines: &mut Vec<String>, title: &str, nodes: &[&GraphNode]) {
    if nodes.is_empty() {
        return;
    }
    lines.push(String::new());
    lines.push(format!("{} ({})", title, nodes.len()));
    for (i, node) in nodes.iter().enumerate() {
        lines.push(format!("{}{}", branch(i + 1 == nodes.len()), node.display_name));
    }
}

fn group_title(kind: TemplateKind) -> &'static str {
    match kind {
        TemplateKind::Template => "Templates",
        TemplateKind::Partial => "Partials",
        TemplateKind::Shortcode => "Shortcodes",
    }
}

fn branch(last: bool) -> &'static str {
    if last {
        "\u{2514}\u{2500}\u{2500} "
    } else {
        "\u{251c}\u{2500}\u{2500} "
    }
}

fn node_label(node: &GraphNode) -> String {
    match node.source() {
        Some(TemplateSource::Module(path)) => format!("{} [{}]", node.display_name, path),
        _ => node.display_name.clone(),
    }
}

fn edge_label(edge: &EdgeRef<'_>) -> String {
    let target = match edge.edge.relationship {
        Relationship::Includes => node_label(edge.target),
        Relationship::Defines | Relationship::Uses => format!("block {}", edge.target.display_name),
    };

    let mut notes = vec![format!("line {}", edge.edge.line)];
    if edge.edge.is_conditional {
        notes.push("conditional".to_string());
    }
    if edge.target.is_placeholder() {
        notes.push("unresolved".to_string());
    }

    format!(
        "{} {} ({})",
        edge.edge.relationship.as_str(),
        target,
        notes.join(", ")
    )
}
