use std::path::{Path, PathBuf};

use glob::Pattern;
use walkdir::WalkDir;

use crate::core::template::TEMPLATES_ROOT;

/// Check if a pattern contains glob wildcards (* or ?).
/// Patterns without wildcards are treated as literal paths relative to the base.
fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

/// A directory entry the walker could not read.
#[derive(Debug, Clone)]
pub struct SkippedEntry {
    pub path: Option<PathBuf>,
    pub error: String,
}

/// Result of scanning for template files.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Directory the scan started from.
    pub root: PathBuf,
    /// Matching files, sorted by path.
    pub files: Vec<PathBuf>,
    pub skipped: Vec<SkippedEntry>,
}

/// Ignore rules compiled once per run.
#[derive(Debug, Default)]
pub struct IgnoreRules {
    literal_paths: Vec<PathBuf>,
    patterns: Vec<Pattern>,
}

impl IgnoreRules {
    /// Literal entries are resolved against `base_dir` and match by prefix;
    /// glob entries match against the full path. Invalid globs are dropped.
    pub fn new(base_dir: &Path, ignore_patterns: &[String]) -> Self {
        let mut rules = Self::default();
        for p in ignore_patterns {
            if is_glob_pattern(p) {
                match Pattern::new(p) {
                    Ok(pattern) => rules.patterns.push(pattern),
                    Err(e) => tracing::warn!(pattern = %p, error = %e, "invalid ignore pattern"),
                }
            } else {
                rules.literal_paths.push(base_dir.join(p));
            }
        }
        rules
    }

    pub fn is_ignored(&self, path: &Path) -> bool {
        if self
            .literal_paths
            .iter()
            .any(|ignore_path| path.starts_with(ignore_path))
        {
            return true;
        }
        let path_str = path.to_string_lossy();
        self.patterns.iter().any(|p| p.matches(&path_str))
    }
}

/// Collect template files below `<root>/layouts`.
///
/// A missing templates directory yields an empty result.
pub fn scan_templates(root: &Path, extensions: &[String], ignores: &IgnoreRules) -> ScanResult {
    let layouts = root.join(TEMPLATES_ROOT);
    if !layouts.is_dir() {
        tracing::debug!(dir = %layouts.display(), "no templates directory");
        return ScanResult::default();
    }
    scan_files(&layouts, extensions, ignores)
}

/// Collect files with one of `extensions` below `dir`.
pub fn scan_files(dir: &Path, extensions: &[String], ignores: &IgnoreRules) -> ScanResult {
    let mut result = ScanResult {
        root: dir.to_path_buf(),
        ..ScanResult::default()
    };

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::debug!(error = %e, "cannot access path");
                result.skipped.push(SkippedEntry {
                    path: e.path().map(Path::to_path_buf),
                    error: e.to_string(),
                });
                continue;
            }
        };
        let path = entry.path();

        if ignores.is_ignored(path) {
            continue;
        }

        if entry.file_type().is_file() && is_template_file(path, extensions) {
            result.files.push(path.to_path_buf());
        }
    }

    result.files.sort();
    result
}

pub fn is_template_file(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(ext)))
}
