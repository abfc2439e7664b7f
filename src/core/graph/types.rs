use serde::Serialize;

use crate::core::template::{DependencyKind, TemplateKind, TemplateSource};

/// Id prefix of the synthetic nodes standing for named blocks.
pub const BLOCK_ID_PREFIX: &str = "block:";

/// Id prefix of module nodes.
pub const MODULE_ID_PREFIX: &str = "module:";

/// What a graph node stands for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    /// A discovered template file.
    Template {
        template_kind: TemplateKind,
        source: TemplateSource,
    },
    /// An imported Hugo module.
    Module {
        module_path: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        version: Option<String>,
    },
    /// A named `define`/`block` block.
    Block { block_name: String },
    /// An include target that could not be resolved.
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    pub id: String,
    pub display_name: String,
    pub kind: NodeKind,
}

impl GraphNode {
    pub fn block(name: &str) -> Self {
        Self {
            id: format!("{BLOCK_ID_PREFIX}{name}"),
            display_name: name.to_string(),
            kind: NodeKind::Block {
                block_name: name.to_string(),
            },
        }
    }

    pub fn placeholder(target: &str) -> Self {
        Self {
            id: target.to_string(),
            display_name: target.to_string(),
            kind: NodeKind::Placeholder,
        }
    }

    /// Short type label used by the formatters.
    pub fn type_name(&self) -> &'static str {
        match &self.kind {
            NodeKind::Template { template_kind, .. } => template_kind.as_str(),
            NodeKind::Module { .. } => "module",
            NodeKind::Block { .. } => "block",
            NodeKind::Placeholder => "unknown",
        }
    }

    pub fn template_kind(&self) -> Option<TemplateKind> {
        match &self.kind {
            NodeKind::Template { template_kind, .. } => Some(*template_kind),
            _ => None,
        }
    }

    pub fn source(&self) -> Option<&TemplateSource> {
        match &self.kind {
            NodeKind::Template { source, .. } => Some(source),
            _ => None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self.kind, NodeKind::Placeholder)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Relationship {
    /// Template to template (or placeholder) via partial/template/include.
    Includes,
    /// Template to the block it defines.
    Defines,
    /// Template to the block it uses.
    Uses,
}

impl Relationship {
    pub fn all() -> [Relationship; 3] {
        [
            Relationship::Includes,
            Relationship::Defines,
            Relationship::Uses,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Relationship::Includes => "includes",
            Relationship::Defines => "defines",
            Relationship::Uses => "uses",
        }
    }
}

/// Attributes carried by every edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphEdge {
    pub relationship: Relationship,
    pub dependency_kind: DependencyKind,
    pub line: usize,
    pub context: String,
    pub is_conditional: bool,
}

/// Borrowed view of an edge with its endpoint nodes.
#[derive(Debug, Clone, Copy)]
pub struct EdgeRef<'g> {
    pub source: &'g GraphNode,
    pub target: &'g GraphNode,
    pub edge: &'g GraphEdge,
}

/// A simple cycle, listed without repeating its first node.
pub type Cycle = Vec<String>;
