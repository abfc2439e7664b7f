//! Template and dependency records produced by discovery and parsing.
//!
//! A [`Template`] is identified by its absolute file path, which doubles as its
//! graph node id. Its [`Dependency`] list is filled once by the parser and never
//! mutated afterwards.

use std::{
    fmt,
    path::{Component, Path, PathBuf},
    str::FromStr,
};

use serde::{Serialize, Serializer};

/// Conventional top-level template directory of a Hugo project or module.
pub const TEMPLATES_ROOT: &str = "layouts";

/// Directory names that hold partials.
pub const PARTIAL_DIRS: &[&str] = &["_partials", "partials"];

/// Directory names that hold shortcodes.
pub const SHORTCODE_DIRS: &[&str] = &["_shortcodes", "shortcodes"];

// ============================================================
// Template kind and source
// ============================================================

/// Hugo's classification of a template file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    Template,
    Partial,
    Shortcode,
}

impl TemplateKind {
    pub fn all() -> [TemplateKind; 3] {
        [
            TemplateKind::Template,
            TemplateKind::Partial,
            TemplateKind::Shortcode,
        ]
    }

    /// Classify a template by the directories below the templates root.
    ///
    /// `baseof.html`, `single.html`, `list.html` and friends are ordinary
    /// templates; only the partials and shortcodes directories are special.
    pub fn classify(path: &Path) -> Self {
        let segments = root_relative_segments(path).unwrap_or_else(|| path_segments(path));
        Self::from_segments(&segments)
    }

    /// Classify from the path segments below the templates root.
    pub fn from_segments(segments: &[String]) -> Self {
        let dirs = &segments[..segments.len().saturating_sub(1)];

        if dirs.iter().any(|s| PARTIAL_DIRS.contains(&s.as_str())) {
            TemplateKind::Partial
        } else if dirs.iter().any(|s| SHORTCODE_DIRS.contains(&s.as_str())) {
            TemplateKind::Shortcode
        } else {
            TemplateKind::Template
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateKind::Template => "template",
            TemplateKind::Partial => "partial",
            TemplateKind::Shortcode => "shortcode",
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateKind {
    type Err = String;

    /// Accepts the current names plus the legacy sub-kinds, which all map to
    /// [`TemplateKind::Template`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "template" | "layout" | "single" | "list" | "baseof" | "index" => {
                Ok(TemplateKind::Template)
            }
            "partial" => Ok(TemplateKind::Partial),
            "shortcode" => Ok(TemplateKind::Shortcode),
            other => Err(format!("unknown template kind '{}'", other)),
        }
    }
}

/// Where a template came from: the project itself or an imported module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TemplateSource {
    #[default]
    Local,
    /// Logical module import path, e.g. `github.com/user/theme`.
    Module(String),
}

impl TemplateSource {
    pub fn as_str(&self) -> &str {
        match self {
            TemplateSource::Local => "local",
            TemplateSource::Module(path) => path,
        }
    }
}

impl fmt::Display for TemplateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TemplateSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// ============================================================
// Dependency records
// ============================================================

/// Kind of reference found in template source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyKind {
    /// `partial "name" ctx` / `partialCached "name" ctx`
    DirectInclude,
    /// `template "name" ctx`
    CrossTemplateCall,
    /// `include "name" ctx`
    IndirectInclude,
    /// `define "name"` ... `end`
    BlockDefinition,
    /// `block "name" ctx` ... `end`
    BlockUsage,
    /// `range EXPR`
    IterationDirective,
    /// `if EXPR`, `else if EXPR`, bare `else`
    ConditionalDirective,
    /// `with EXPR`
    ScopingDirective,
}

impl DependencyKind {
    /// Kinds that point at another template and become `includes` edges.
    pub fn is_include_like(&self) -> bool {
        matches!(
            self,
            DependencyKind::DirectInclude
                | DependencyKind::CrossTemplateCall
                | DependencyKind::IndirectInclude
        )
    }

    pub fn is_block(&self) -> bool {
        matches!(
            self,
            DependencyKind::BlockDefinition | DependencyKind::BlockUsage
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DependencyKind::DirectInclude => "partial",
            DependencyKind::CrossTemplateCall => "template",
            DependencyKind::IndirectInclude => "include",
            DependencyKind::BlockDefinition => "block_definition",
            DependencyKind::BlockUsage => "block_usage",
            DependencyKind::IterationDirective => "range",
            DependencyKind::ConditionalDirective => "if",
            DependencyKind::ScopingDirective => "with",
        }
    }
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single reference extracted from template source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dependency {
    pub kind: DependencyKind,
    /// Referenced name, or the raw expression for directives.
    pub target: String,
    /// 1-based line of the match start.
    pub line: usize,
    /// Whitespace-collapsed window around the match with `>>>`/`<<<` markers.
    pub context: String,
    pub is_conditional: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<String>,
}

// ============================================================
// Template
// ============================================================

#[derive(Debug, Clone)]
pub struct Template {
    pub file_path: PathBuf,
    /// The `layouts` directory the file was found under, when known.
    pub templates_root: Option<PathBuf>,
    pub kind: TemplateKind,
    /// Raw file content; `None` until the file has been read.
    pub content: Option<String>,
    pub dependencies: Vec<Dependency>,
    pub source: TemplateSource,
}

impl Template {
    /// A template whose templates root is taken from the first `layouts`
    /// component of its path.
    pub fn new(file_path: impl Into<PathBuf>, source: TemplateSource) -> Self {
        let file_path = file_path.into();
        let kind = TemplateKind::classify(&file_path);
        Self {
            file_path,
            templates_root: None,
            kind,
            content: None,
            dependencies: Vec::new(),
            source,
        }
    }

    /// A template discovered below `templates_root`.
    pub fn in_root(
        templates_root: impl Into<PathBuf>,
        file_path: impl Into<PathBuf>,
        source: TemplateSource,
    ) -> Self {
        let mut template = Self::new(file_path, source);
        template.templates_root = Some(templates_root.into());
        if let Some(segments) = template.root_relative_segments() {
            template.kind = TemplateKind::from_segments(&segments);
        }
        template
    }

    pub fn node_id(&self) -> String {
        self.file_path.to_string_lossy().into_owned()
    }

    /// Path below the templates root, e.g. `_partials/header.html`.
    ///
    /// Falls back to the full path for files outside any `layouts` directory.
    pub fn display_name(&self) -> String {
        match self.root_relative_segments() {
            Some(segments) if !segments.is_empty() => segments.join("/"),
            _ => self.node_id(),
        }
    }

    /// Segments of the path below the templates root, if there is one.
    pub fn root_relative_segments(&self) -> Option<Vec<String>> {
        match &self.templates_root {
            Some(root) => Some(path_segments(self.file_path.strip_prefix(root).ok()?)),
            None => root_relative_segments(&self.file_path),
        }
    }

    /// The raw source line (1-based), when content is loaded.
    pub fn source_line(&self, line: usize) -> Option<&str> {
        let content = self.content.as_deref()?;
        content.lines().nth(line.checked_sub(1)?)
    }

    pub fn dependencies_of_kind(
        &self,
        kind: DependencyKind,
    ) -> impl Iterator<Item = &Dependency> {
        self.dependencies.iter().filter(move |d| d.kind == kind)
    }

    /// Whether this template has its own `define "name"`.
    pub fn defines_block(&self, name: &str) -> bool {
        self.dependencies_of_kind(DependencyKind::BlockDefinition)
            .any(|d| d.target == name)
    }
}

fn path_segments(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect()
}

/// Segments after the first `layouts` component, or `None` if there is none.
pub fn root_relative_segments(path: &Path) -> Option<Vec<String>> {
    let segments = path_segments(path);
    let root = segments.iter().position(|s| s == TEMPLATES_ROOT)?;
    Some(segments[root + 1..].to_vec())
}
