//! Hugo module imports: replacement mappings, cache layout and resolution.

pub mod cache;
pub mod resolver;

pub use resolver::{ModuleResolver, is_remote_module, module_basename, resolve_module};

use std::{fmt, path::PathBuf};

/// An imported module whose directory has been located.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    /// Logical import path, e.g. `github.com/user/theme`.
    pub path: String,
    pub version: Option<String>,
    pub resolved_path: PathBuf,
}

impl Module {
    pub fn node_id(&self) -> String {
        format!("module:{}", self.path)
    }

    /// `path@version`, or `path@latest` when unpinned.
    pub fn display_name(&self) -> String {
        format!("{}@{}", self.path, self.version.as_deref().unwrap_or("latest"))
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

/// Ordered `original -> substitute` module path mappings.
///
/// Order follows the site configuration so reverse lookups are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Replacements {
    entries: Vec<(String, String)>,
}

impl Replacements {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `"a -> b, c -> d"` style entries; malformed entries are skipped.
    pub fn parse<'a>(specs: impl IntoIterator<Item = &'a str>) -> Self {
        let mut replacements = Self::new();
        for spec in specs {
            for pair in spec.split(',') {
                let Some((original, substitute)) = pair.split_once("->") else {
                    continue;
                };
                let (original, substitute) = (original.trim(), substitute.trim());
                if original.is_empty() || substitute.is_empty() {
                    continue;
                }
                replacements.insert(original, substitute);
            }
        }
        replacements
    }

    /// Add a mapping; an existing mapping for `original` is kept.
    pub fn insert(&mut self, original: &str, substitute: &str) {
        if self.get(original).is_none() {
            self.entries
                .push((original.to_string(), substitute.to_string()));
        }
    }

    pub fn get(&self, original: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(o, _)| o == original)
            .map(|(_, s)| s.as_str())
    }

    /// The original module path whose substitute is `substitute`.
    pub fn original_of(&self, substitute: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, s)| s == substitute)
            .map(|(o, _)| o.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
