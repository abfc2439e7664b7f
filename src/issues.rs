//! Issue types for template analysis results.
//!
//! Recoverable problems never abort an analysis run. Each one is recorded as
//! an [`Issue`] carrying everything a reporter needs to display it.

use std::fmt;

use enum_dispatch::enum_dispatch;

use crate::core::template::DependencyKind;

// ============================================================
// Severity and Rule
// ============================================================

/// Severity level of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Rule identifier for each issue type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rule {
    FileAccess,
    ParseError,
    UnresolvedDependency,
    ModuleResolution,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::FileAccess => write!(f, "file-access"),
            Rule::ParseError => write!(f, "parse-error"),
            Rule::UnresolvedDependency => write!(f, "unresolved-dependency"),
            Rule::ModuleResolution => write!(f, "module-resolution"),
        }
    }
}

// ============================================================
// Source locations
// ============================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub file_path: String,
    /// 1-based.
    pub line: usize,
    /// 1-based, in characters.
    pub col: usize,
}

/// A location plus the raw text of its line, for caret display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceContext {
    pub location: SourceLocation,
    pub source_line: String,
}

impl SourceContext {
    pub fn new(
        file_path: impl Into<String>,
        line: usize,
        col: usize,
        source_line: impl Into<String>,
    ) -> Self {
        Self {
            location: SourceLocation {
                file_path: file_path.into(),
                line,
                col,
            },
            source_line: source_line.into(),
        }
    }

    pub fn file_path(&self) -> &str {
        &self.location.file_path
    }

    pub fn line(&self) -> usize {
        self.location.line
    }

    pub fn col(&self) -> usize {
        self.location.col
    }
}

// ============================================================
// Issue Types
// ============================================================

/// A template file or directory entry could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAccessIssue {
    pub file_path: String,
    pub error: String,
}

impl FileAccessIssue {
    pub fn severity() -> Severity {
        Severity::Error
    }

    pub fn rule() -> Rule {
        Rule::FileAccess
    }
}

/// A template was read but could not be processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseErrorIssue {
    pub file_path: String,
    pub error: String,
}

impl ParseErrorIssue {
    pub fn severity() -> Severity {
        Severity::Warning
    }

    pub fn rule() -> Rule {
        Rule::ParseError
    }
}

/// An include-like reference that matches no known template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedDependencyIssue {
    pub context: SourceContext,
    pub target: String,
    pub kind: DependencyKind,
}

impl UnresolvedDependencyIssue {
    pub fn severity() -> Severity {
        Severity::Warning
    }

    pub fn rule() -> Rule {
        Rule::UnresolvedDependency
    }
}

/// A configured module import whose directory could not be located.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleResolutionIssue {
    pub module_path: String,
    pub version: Option<String>,
    /// The site configuration file declaring the import, if known.
    pub config_path: Option<String>,
}

impl ModuleResolutionIssue {
    pub fn severity() -> Severity {
        Severity::Warning
    }

    pub fn rule() -> Rule {
        Rule::ModuleResolution
    }
}

// ============================================================
// Issue Enum
// ============================================================

/// A problem found during analysis.
#[enum_dispatch(Report)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    FileAccess(FileAccessIssue),
    ParseError(ParseErrorIssue),
    UnresolvedDependency(UnresolvedDependencyIssue),
    ModuleResolution(ModuleResolutionIssue),
}

impl Issue {
    pub fn severity(&self) -> Severity {
        match self {
            Issue::FileAccess(_) => FileAccessIssue::severity(),
            Issue::ParseError(_) => ParseErrorIssue::severity(),
            Issue::UnresolvedDependency(_) => UnresolvedDependencyIssue::severity(),
            Issue::ModuleResolution(_) => ModuleResolutionIssue::severity(),
        }
    }

    pub fn rule(&self) -> Rule {
        match self {
            Issue::FileAccess(_) => FileAccessIssue::rule(),
            Issue::ParseError(_) => ParseErrorIssue::rule(),
            Issue::UnresolvedDependency(_) => UnresolvedDependencyIssue::rule(),
            Issue::ModuleResolution(_) => ModuleResolutionIssue::rule(),
        }
    }
}

// ============================================================
// Report Trait (for CLI output)
// ============================================================

/// Location information for report output.
pub enum ReportLocation<'a> {
    /// Source location with the line text for context display.
    Source(&'a SourceContext),
    /// File-level only, no line context.
    File { path: &'a str },
    /// Not tied to a template file.
    Module { path: &'a str },
}

/// Trait for types that can be reported to the CLI.
#[enum_dispatch]
pub trait Report {
    fn location(&self) -> ReportLocation<'_>;

    /// Primary message to display.
    fn message(&self) -> String;

    fn report_severity(&self) -> Severity;

    fn report_rule(&self) -> Rule;

    /// Optional hint for fixing the issue.
    fn hint(&self) -> Option<String> {
        None
    }

    /// Optional details for the "= note:" line.
    fn details(&self) -> Option<String> {
        None
    }
}

// ============================================================
// Report Implementations
// ============================================================

impl Report for FileAccessIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::File {
            path: &self.file_path,
        }
    }

    fn message(&self) -> String {
        self.error.clone()
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }
}

impl Report for ParseErrorIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::File {
            path: &self.file_path,
        }
    }

    fn message(&self) -> String {
        self.error.clone()
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }
}

impl Report for UnresolvedDependencyIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::Source(&self.context)
    }

    fn message(&self) -> String {
        self.target.clone()
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }

    fn details(&self) -> Option<String> {
        Some(format!("no template matches this {} reference", self.kind))
    }

    fn hint(&self) -> Option<String> {
        match self.kind {
            DependencyKind::DirectInclude if !self.target.contains('/') => Some(format!(
                "partials are looked up in layouts/_partials/; is '{}' under another name?",
                self.target
            )),
            _ => None,
        }
    }
}

impl Report for ModuleResolutionIssue {
    fn location(&self) -> ReportLocation<'_> {
        match &self.config_path {
            Some(path) => ReportLocation::File { path },
            None => ReportLocation::Module {
                path: &self.module_path,
            },
        }
    }

    fn message(&self) -> String {
        match &self.version {
            Some(version) => format!("module {}@{} not found", self.module_path, version),
            None => format!("module {} not found", self.module_path),
        }
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }

    fn hint(&self) -> Option<String> {
        Some("run `hugo mod get` to populate the module cache, or add a replacement".to_string())
    }
}

// ============================================================
// Ordering for Issue (for sorting in reports)
// ============================================================

impl Issue {
    fn sort_file_path(&self) -> Option<&str> {
        match self.location() {
            ReportLocation::Source(ctx) => Some(ctx.file_path()),
            ReportLocation::File { path } => Some(path),
            ReportLocation::Module { .. } => None,
        }
    }

    fn sort_line(&self) -> usize {
        match self.location() {
            ReportLocation::Source(ctx) => ctx.line(),
            _ => 0,
        }
    }

    fn sort_col(&self) -> usize {
        match self.location() {
            ReportLocation::Source(ctx) => ctx.col(),
            _ => 0,
        }
    }
}

impl Ord for Issue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use std::cmp::Ordering;

        // Sort by: file_path (None last), line, col, message
        match (self.sort_file_path(), other.sort_file_path()) {
            (Some(a), Some(b)) => a
                .cmp(b)
                .then_with(|| self.sort_line().cmp(&other.sort_line()))
                .then_with(|| self.sort_col().cmp(&other.sort_col()))
                .then_with(|| self.message().cmp(&other.message())),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self
                .rule()
                .cmp(&other.rule())
                .then_with(|| self.message().cmp(&other.message())),
        }
    }
}

impl PartialOrd for Issue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

// ============================================================
// Tests
// ============================================================
