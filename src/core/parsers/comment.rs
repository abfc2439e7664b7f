use regex::{Captures, Regex};
use std::sync::LazyLock;

const COMMENT_OPENERS: [&str; 2] = ["{{/*", "{{- /*"];
const COMMENT_CLOSERS: [&str; 2] = ["*/}}", "*/ -}}"];

static HTML_COMMENT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());

/// Remove template comments and HTML comments from template source.
///
/// Every removed span is replaced by as many `\n` characters as it contained,
/// so line numbers computed on the result still point at the original source.
///
/// Template comments nest: each opener raises the depth, each closer lowers it,
/// and the span ends when the depth returns to zero. An unterminated comment
/// consumes the rest of the input. HTML comments (`<!-- ... -->`) are removed
/// afterwards and do not nest.
pub fn strip_comments(content: &str) -> String {
    let without_template_comments = strip_template_comments(content);
    HTML_COMMENT_REGEX
        .replace_all(&without_template_comments, |caps: &Captures| {
            newlines(count_newlines(caps[0].as_bytes()))
        })
        .into_owned()
}

fn strip_template_comments(content: &str) -> String {
    let bytes = content.as_bytes();
    let mut result = String::with_capacity(content.len());
    let mut copied_until = 0;
    let mut pos = 0;

    while pos < bytes.len() {
        let Some(opener_len) = marker_at(bytes, pos, &COMMENT_OPENERS) else {
            pos += 1;
            continue;
        };

        // Markers are ASCII, so both ends are char boundaries.
        result.push_str(&content[copied_until..pos]);
        let end = comment_end(bytes, pos + opener_len);
        result.push_str(&newlines(count_newlines(&bytes[pos..end])));

        pos = end;
        copied_until = end;
    }

    result.push_str(&content[copied_until..]);
    result
}

/// Byte offset just past the closer that balances an already-consumed opener.
fn comment_end(bytes: &[u8], from: usize) -> usize {
    let mut depth = 1usize;
    let mut pos = from;

    while pos < bytes.len() {
        if let Some(len) = marker_at(bytes, pos, &COMMENT_OPENERS) {
            depth += 1;
            pos += len;
        } else if let Some(len) = marker_at(bytes, pos, &COMMENT_CLOSERS) {
            depth -= 1;
            pos += len;
            if depth == 0 {
                return pos;
            }
        } else {
            pos += 1;
        }
    }

    bytes.len()
}

fn marker_at(bytes: &[u8], pos: usize, markers: &[&str]) -> Option<usize> {
    markers
        .iter()
        .find(|marker| bytes[pos..].starts_with(marker.as_bytes()))
        .map(|marker| marker.len())
}

fn count_newlines(bytes: &[u8]) -> usize {
    bytes.iter().filter(|&&b| b == b'\n').count()
}

fn newlines(count: usize) -> String {
    "\n".repeat(count)
}
