//! Mermaid flowchart output.

use std::collections::{HashMap, HashSet};

use crate::core::graph::{DependencyGraph, GraphNode, NodeKind};

use super::finish;

const CLASS_DEFS: &[(&str, &str)] = &[
    ("template", "fill:#e1f5fe,stroke:#01579b,stroke-width:2px"),
    ("partial", "fill:#f3e5f5,stroke:#4a148c,stroke-width:2px"),
    ("shortcode", "fill:#e0f2f1,stroke:#004d40,stroke-width:2px"),
    ("block", "fill:#e8f5e8,stroke:#2e7d32,stroke-width:2px"),
    ("module", "fill:#fff3e0,stroke:#e65100,stroke-width:2px"),
    ("unresolved", "fill:#ffffff,stroke:#c62828,stroke-dasharray:5 5"),
];

pub fn render(graph: &DependencyGraph) -> String {
    let ids = MermaidIds::assign(graph);
    let mut lines = vec!["graph TD".to_string()];

    for node in graph.nodes() {
        let label = escape_label(&node.display_name);
        let shape = match node.kind {
            NodeKind::Module { .. } => format!("[[\"{label}\"]]"),
            NodeKind::Block { .. } => format!("([\"{label}\"])"),
            NodeKind::Template { .. } | NodeKind::Placeholder => format!("[\"{label}\"]"),
        };
        lines.push(format!("    {}{}:::{}", ids.get(&node.id), shape, class_of(node)));
    }

    for edge in graph.edges() {
        let arrow = if edge.edge.is_conditional { "-.->" } else { "-->" };
        lines.push(format!(
            "    {} {}|{}| {}",
            ids.get(&edge.source.id),
            arrow,
            edge.edge.relationship.as_str(),
            ids.get(&edge.target.id)
        ));
    }

    for (class, style) in CLASS_DEFS {
        lines.push(format!("    classDef {class} {style}"));
    }

    finish(lines)
}

fn class_of(node: &GraphNode) -> &'static str {
    match node.kind {
        NodeKind::Placeholder => "unresolved",
        _ => node.type_name(),
    }
}

/// Short unique Mermaid identifiers for graph node ids.
struct MermaidIds {
    by_node: HashMap<String, String>,
}

impl MermaidIds {
    fn assign(graph: &DependencyGraph) -> Self {
        let mut by_node = HashMap::new();
        let mut taken = HashSet::new();

        for node in graph.nodes() {
            let base = match &node.kind {
                NodeKind::Template { .. } => sanitize(&node.display_name),
                NodeKind::Module { module_path, .. } => format!("module_{}", sanitize(module_path)),
                NodeKind::Block { block_name } => format!("block_{}", sanitize(block_name)),
                NodeKind::Placeholder => format!("unresolved_{}", sanitize(&node.display_name)),
            };

            let mut id = base.clone();
            let mut n = 2;
            while !taken.insert(id.clone()) {
                id = format!("{base}_{n}");
                n += 1;
            }
            by_node.insert(node.id.clone(), id);
        }

        Self { by_node }
    }

    fn get<'a>(&'a self, node_id: &'a str) -> &'a str {
        self.by_node.get(node_id).map_or(node_id, String::as_str)
    }
}

/// Reduce a name to `[A-Za-z0-9_]`, never starting with a digit.
fn sanitize(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let trimmed = replaced.trim_matches('_');

    match trimmed.chars().next() {
        None => "node".to_string(),
        Some(c) if c.is_ascii_digit() => format!("n_{trimmed}"),
        Some(_) => trimmed.to_string(),
    }
}

fn escape_label(label: &str) -> String {
    label.replace('"', "#quot;")
}
