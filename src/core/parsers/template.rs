//! Pattern-based extraction of template dependencies.
//!
//! Hugo templates are Go `text/template` sources. Rather than building a full
//! parse tree, each construct of interest is matched with a dedicated regex:
//!
//! - `partial` / `partialCached`, `template` and `include` calls
//! - `define "name"` ... `end` and `block "name"` ... `end`
//! - `range`, `if` / `else if` / `else`, and `with` directives
//!
//! Every pattern tolerates `{{-` / `-}}` trim markers and a `$var :=` or
//! `$var =` assignment prefix before the call.

use regex::{Captures, Regex};
use std::sync::LazyLock;

use super::comment::strip_comments;
use crate::core::template::{Dependency, DependencyKind};

/// Characters of surrounding source captured on each side of a match.
const CONTEXT_CHARS: usize = 80;

static PARTIAL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"\{\{\s*-?\s*(?:\$\w+\s*:?=\s*)?partial(?:Cached)?\s*"([^"]+)"\s*([^}]*?)\s*-?\s*\}\}"#,
    )
    .unwrap()
});

static TEMPLATE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\{\{\s*-?\s*(?:\$\w+\s*:?=\s*)?template\s+"([^"]+)"\s*([^}]*?)\s*-?\s*\}\}"#)
        .unwrap()
});

static INCLUDE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\{\{\s*-?\s*(?:\$\w+\s*:?=\s*)?include\s+"([^"]+)"\s*([^}]*?)\s*-?\s*\}\}"#)
        .unwrap()
});

static DEFINE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)\{\{\s*-?\s*define\s+"([^"]+)"\s*-?\s*\}\}(.*?)\{\{\s*-?\s*end\s*-?\s*\}\}"#,
    )
    .unwrap()
});

static BLOCK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)\{\{\s*-?\s*block\s+"([^"]+)"(?:\s+([^}]*?))?\s*-?\s*\}\}(.*?)\{\{\s*-?\s*end\s*-?\s*\}\}"#,
    )
    .unwrap()
});

static RANGE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*-?\s*range\s+([^}]+?)\s*-?\s*\}\}").unwrap());

static IF_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*-?\s*if\s+([^}]+?)\s*-?\s*\}\}").unwrap());

static ELSE_IF_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*-?\s*else\s+if\s+([^}]+?)\s*-?\s*\}\}").unwrap());

static ELSE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*-?\s*else\s*-?\s*\}\}").unwrap());

static WITH_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*-?\s*with\s+([^}]+?)\s*-?\s*\}\}").unwrap());

static END_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*-?\s*end\s*-?\s*\}\}").unwrap());

// Heads of `define` and `block`; they open a scope closed by `end`.
static SCOPE_HEAD_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\{\{\s*-?\s*(?:define|block)\s+"[^"]+"[^}]*?\s*-?\s*\}\}"#).unwrap()
});

/// Strip comments, then extract dependencies from what remains.
pub fn parse_template(content: &str) -> Vec<Dependency> {
    if content.trim().is_empty() {
        return Vec::new();
    }
    extract_dependencies(&strip_comments(content))
}

/// Extract every dependency from comment-free template source.
///
/// Results are ordered by match position in the source. Matches of different
/// kinds that start at the same offset keep the order in which the kinds are
/// scanned (includes, blocks, then directives).
pub fn extract_dependencies(content: &str) -> Vec<Dependency> {
    if content.trim().is_empty() {
        return Vec::new();
    }

    let scanner = Scanner::new(content);
    let mut found: Vec<(usize, Dependency)> = Vec::new();

    scanner.calls(&PARTIAL_REGEX, DependencyKind::DirectInclude, &mut found);
    scanner.calls(&TEMPLATE_REGEX, DependencyKind::CrossTemplateCall, &mut found);
    scanner.calls(&INCLUDE_REGEX, DependencyKind::IndirectInclude, &mut found);
    scanner.block_definitions(&mut found);
    scanner.block_usages(&mut found);
    scanner.directives(&RANGE_REGEX, DependencyKind::IterationDirective, &mut found);
    scanner.directives(&IF_REGEX, DependencyKind::ConditionalDirective, &mut found);
    scanner.directives(&ELSE_IF_REGEX, DependencyKind::ConditionalDirective, &mut found);
    scanner.bare_else(&mut found);
    scanner.directives(&WITH_REGEX, DependencyKind::ScopingDirective, &mut found);

    // Stable sort keeps scan order for equal offsets.
    found.sort_by_key(|(start, _)| *start);
    found
        .into_iter()
        .map(|(_, dependency)| dependency)
        .collect()
}

/// Shared state for one extraction pass over a source string.
struct Scanner<'a> {
    content: &'a str,
    line_starts: Vec<usize>,
    scope_opens: Vec<usize>,
    scope_closes: Vec<usize>,
}

impl<'a> Scanner<'a> {
    fn new(content: &'a str) -> Self {
        let heads = [&*IF_REGEX, &*RANGE_REGEX, &*WITH_REGEX, &*SCOPE_HEAD_REGEX];
        let mut scope_opens: Vec<usize> = heads
            .into_iter()
            .flat_map(|regex| regex.find_iter(content).map(|m| m.start()))
            .collect();
        scope_opens.sort_unstable();

        let scope_closes = END_REGEX.find_iter(content).map(|m| m.start()).collect();

        Self {
            content,
            line_starts: build_line_index(content),
            scope_opens,
            scope_closes,
        }
    }

    fn calls(&self, regex: &Regex, kind: DependencyKind, out: &mut Vec<(usize, Dependency)>) {
        for caps in regex.captures_iter(self.content) {
            out.push(self.record(&caps, kind, group(&caps, 1), group(&caps, 2)));
        }
    }

    fn block_definitions(&self, out: &mut Vec<(usize, Dependency)>) {
        for caps in DEFINE_REGEX.captures_iter(self.content) {
            out.push(self.record(&caps, DependencyKind::BlockDefinition, group(&caps, 1), ""));
        }
    }

    fn block_usages(&self, out: &mut Vec<(usize, Dependency)>) {
        for caps in BLOCK_REGEX.captures_iter(self.content) {
            let (name, parameters) = (group(&caps, 1), group(&caps, 2));
            out.push(self.record(&caps, DependencyKind::BlockUsage, name, parameters));
        }
    }

    fn directives(&self, regex: &Regex, kind: DependencyKind, out: &mut Vec<(usize, Dependency)>) {
        for caps in regex.captures_iter(self.content) {
            out.push(self.record(&caps, kind, group(&caps, 1), ""));
        }
    }

    fn bare_else(&self, out: &mut Vec<(usize, Dependency)>) {
        for caps in ELSE_REGEX.captures_iter(self.content) {
            out.push(self.record(&caps, DependencyKind::ConditionalDirective, "", ""));
        }
    }

    fn record(
        &self,
        caps: &Captures<'_>,
        kind: DependencyKind,
        target: &str,
        parameters: &str,
    ) -> (usize, Dependency) {
        let whole = caps.get(0).map_or(0..0, |m| m.range());
        let parameters = parameters.trim();
        let dependency = Dependency {
            kind,
            target: target.trim().to_string(),
            line: offset_to_line(&self.line_starts, whole.start),
            context: context_snippet(self.content, whole.start, whole.end),
            is_conditional: self.is_nested(whole.start),
            parameters: (!parameters.is_empty()).then(|| parameters.to_string()),
        };
        (whole.start, dependency)
    }

    /// More scopes opened than closed before `offset`.
    ///
    /// The count is global; nesting is not matched pairwise.
    fn is_nested(&self, offset: usize) -> bool {
        let opened = self.scope_opens.partition_point(|&o| o < offset);
        let closed = self.scope_closes.partition_point(|&c| c < offset);
        opened > closed
    }
}

fn group<'c>(caps: &Captures<'c>, index: usize) -> &'c str {
    caps.get(index).map_or("", |m| m.as_str())
}

/// Byte offsets where each line starts; line 1 starts at offset 0.
fn build_line_index(content: &str) -> Vec<usize> {
    let mut offsets = vec![0];
    offsets.extend(
        content
            .bytes()
            .enumerate()
            .filter(|(_, b)| *b == b'\n')
            .map(|(i, _)| i + 1),
    );
    offsets
}

/// 1-based line number for a byte offset.
fn offset_to_line(line_starts: &[usize], offset: usize) -> usize {
    match line_starts.binary_search(&offset) {
        Ok(line) => line + 1,
        Err(line) => line,
    }
}

fn context_snippet(content: &str, start: usize, end: usize) -> String {
    let before_start = content[..start]
        .char_indices()
        .rev()
        .nth(CONTEXT_CHARS - 1)
        .map_or(0, |(i, _)| i);
    let after_end = content[end..]
        .char_indices()
        .nth(CONTEXT_CHARS)
        .map_or(content.len(), |(i, _)| end + i);

    format!(
        "...{} >>>{}<<< {}...",
        collapse_whitespace(&content[before_start..start]),
        &content[start..end],
        collapse_whitespace(&content[end..after_end])
    )
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
