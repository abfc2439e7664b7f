//! Directed dependency graph over templates, blocks, modules and placeholders.
//!
//! Nodes are keyed by string id (a template's absolute path, `block:<name>`,
//! `module:<path>`, or the raw target of an unresolved include). Adding a node
//! twice is a no-op; every dependency added produces exactly one edge, so
//! repeated calls between the same pair show up as parallel edges.

mod cycles;
mod types;

pub use types::*;

use std::collections::HashMap;

use petgraph::{
    Direction,
    graph::{DiGraph, EdgeIndex, NodeIndex},
    visit::EdgeRef as _,
};

use crate::core::{
    modules::Module,
    template::{Dependency, DependencyKind, Template, TemplateKind},
};

#[derive(Debug, Default)]
pub struct DependencyGraph {
    graph: DiGraph<GraphNode, GraphEdge>,
    index: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node unless one with the same id exists; returns its index.
    pub fn add_node(&mut self, node: GraphNode) -> NodeIndex {
        if let Some(&existing) = self.index.get(&node.id) {
            return existing;
        }
        let id = node.id.clone();
        let idx = self.graph.add_node(node);
        self.index.insert(id, idx);
        idx
    }

    pub fn add_template(&mut self, template: &Template) -> NodeIndex {
        self.add_node(GraphNode {
            id: template.node_id(),
            display_name: template.display_name(),
            kind: NodeKind::Template {
                template_kind: template.kind,
                source: template.source.clone(),
            },
        })
    }

    pub fn add_module(&mut self, module: &Module) -> NodeIndex {
        self.add_node(GraphNode {
            id: module.node_id(),
            display_name: module.display_name(),
            kind: NodeKind::Module {
                module_path: module.path.clone(),
                version: module.version.clone(),
            },
        })
    }

    /// Add an `includes` edge for an include-like dependency.
    ///
    /// With no resolved target, the edge points at a placeholder node keyed by
    /// the raw target string.
    pub fn add_include_dependency(
        &mut self,
        source: &Template,
        target: Option<&Template>,
        dependency: &Dependency,
    ) -> EdgeIndex {
        let from = self.add_template(source);
        let to = match target {
            Some(target) => self.add_template(target),
            None => self.add_node(GraphNode::placeholder(&dependency.target)),
        };
        self.add_edge(from, to, Relationship::Includes, dependency)
    }

    /// Add a `defines` or `uses` edge from a template to its block node.
    ///
    /// Returns `None` for dependencies that are not block definitions or usages.
    pub fn add_block_dependency(
        &mut self,
        source: &Template,
        dependency: &Dependency,
    ) -> Option<EdgeIndex> {
        let relationship = match dependency.kind {
            DependencyKind::BlockDefinition => Relationship::Defines,
            DependencyKind::BlockUsage => Relationship::Uses,
            _ => return None,
        };
        let from = self.add_template(source);
        let to = self.add_node(GraphNode::block(&dependency.target));
        Some(self.add_edge(from, to, relationship, dependency))
    }

    /// Add a `uses` edge for a `template "name"` call to a block the caller
    /// defines itself.
    pub fn add_local_block_call(
        &mut self,
        source: &Template,
        dependency: &Dependency,
    ) -> EdgeIndex {
        let from = self.add_template(source);
        let to = self.add_node(GraphNode::block(&dependency.target));
        self.add_edge(from, to, Relationship::Uses, dependency)
    }

    fn add_edge(
        &mut self,
        from: NodeIndex,
        to: NodeIndex,
        relationship: Relationship,
        dependency: &Dependency,
    ) -> EdgeIndex {
        self.graph.add_edge(
            from,
            to,
            GraphEdge {
                relationship,
                dependency_kind: dependency.kind,
                line: dependency.line,
                context: dependency.context.clone(),
                is_conditional: dependency.is_conditional,
            },
        )
    }

    // ============================================================
    // Queries
    // ============================================================

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.index.get(id).map(|&idx| &self.graph[idx])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.graph.node_indices().map(|idx| &self.graph[idx])
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = EdgeRef<'_>> {
        self.graph.edge_indices().filter_map(|idx| {
            let (from, to) = self.graph.edge_endpoints(idx)?;
            Some(EdgeRef {
                source: &self.graph[from],
                target: &self.graph[to],
                edge: &self.graph[idx],
            })
        })
    }

    /// Outgoing edges of a node in insertion order.
    pub fn outgoing(&self, id: &str) -> Vec<EdgeRef<'_>> {
        let Some(&idx) = self.index.get(id) else {
            return Vec::new();
        };
        let mut edges: Vec<_> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| (e.id(), e.target(), e.weight()))
            .collect();
        edges.sort_by_key(|(edge_idx, _, _)| *edge_idx);
        let source = &self.graph[idx];
        edges
            .into_iter()
            .map(|(_, target, edge)| EdgeRef {
                source,
                target: &self.graph[target],
                edge,
            })
            .collect()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn edge_count_by(&self, relationship: Relationship) -> usize {
        self.graph
            .edge_weights()
            .filter(|e| e.relationship == relationship)
            .count()
    }

    pub fn template_count(&self, kind: TemplateKind) -> usize {
        self.nodes()
            .filter(|n| n.template_kind() == Some(kind))
            .count()
    }

    pub fn placeholders(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes().filter(|n| n.is_placeholder())
    }

    /// Targets of a node's `includes` edges, in insertion order.
    fn include_successors(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut edges: Vec<(EdgeIndex, NodeIndex)> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .filter(|e| e.weight().relationship == Relationship::Includes)
            .map(|e| (e.id(), e.target()))
            .collect();
        edges.sort_by_key(|(edge_idx, _)| *edge_idx);
        edges.into_iter().map(|(_, target)| target).collect()
    }

    fn id_of(&self, idx: NodeIndex) -> String {
        self.graph[idx].id.clone()
    }
}
