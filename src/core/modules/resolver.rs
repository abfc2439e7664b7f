//! Locate the directory of an imported Hugo module.
//!
//! Resolution order:
//!
//! 1. A configured replacement, tried under the project root (with and
//!    without the module basename appended), then in the cache when a
//!    version is pinned.
//! 2. Local (non-remote) import paths, relative to the project root.
//! 3. Remote import paths, in the module cache: the pinned version, or the
//!    newest cached one.

use std::path::{Path, PathBuf};

use super::{Replacements, cache};

/// Whether an import path names a remote module, e.g. `github.com/user/repo`.
///
/// Remote paths are not relative or absolute filesystem paths, contain a `/`,
/// and have a dot in their first segment.
pub fn is_remote_module(import_path: &str) -> bool {
    if import_path.starts_with(['.', '/', '~']) || !import_path.contains('/') {
        return false;
    }
    import_path
        .split('/')
        .next()
        .is_some_and(|domain| domain.contains('.'))
}

/// Last segment of an import path.
pub fn module_basename(import_path: &str) -> &str {
    import_path
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(import_path)
}

/// Resolve a module import to an existing directory, or `None`.
pub fn resolve_module(
    import_path: &str,
    version: Option<&str>,
    project_root: &Path,
    cache_root: Option<&Path>,
    replacements: &Replacements,
) -> Option<PathBuf> {
    ModuleResolver::new(project_root, cache_root, replacements).resolve(import_path, version)
}

/// Module resolution against one project and cache.
#[derive(Debug, Clone, Copy)]
pub struct ModuleResolver<'a> {
    project_root: &'a Path,
    cache_root: Option<&'a Path>,
    replacements: &'a Replacements,
}

impl<'a> ModuleResolver<'a> {
    pub fn new(
        project_root: &'a Path,
        cache_root: Option<&'a Path>,
        replacements: &'a Replacements,
    ) -> Self {
        Self {
            project_root,
            cache_root,
            replacements,
        }
    }

    pub fn resolve(&self, import_path: &str, version: Option<&str>) -> Option<PathBuf> {
        if let Some(found) = self.resolve_replacement(import_path, version) {
            return Some(found);
        }

        let found = if is_remote_module(import_path) {
            self.resolve_remote(import_path, version)
        } else {
            self.resolve_local(import_path)
        };

        match &found {
            Some(path) => {
                tracing::debug!(module = import_path, path = %path.display(), "resolved module")
            }
            None => tracing::debug!(module = import_path, "module not found"),
        }
        found
    }

    fn resolve_replacement(&self, import_path: &str, version: Option<&str>) -> Option<PathBuf> {
        let substitute = self.replacements.get(import_path)?;
        let substitute_dir = self.project_root.join(expand_home(substitute));
        let basename = module_basename(import_path);

        for candidate in [substitute_dir.join(basename), substitute_dir.clone()] {
            if candidate.is_dir() {
                tracing::debug!(
                    module = import_path,
                    replacement = substitute,
                    "using replacement"
                );
                return Some(canonical(candidate));
            }
        }

        let (version, cache_root) = (version?, self.cache_root?);
        cache::find_version(&cache::cache_base(cache_root), import_path, version)
    }

    fn resolve_local(&self, import_path: &str) -> Option<PathBuf> {
        let module_dir = self.project_root.join(expand_home(import_path));

        // Local directories that replace a remote module are laid out like it.
        if let Some(original) = self.replacements.original_of(import_path) {
            let nested = module_dir.join(module_basename(original));
            if nested.is_dir() {
                return Some(canonical(nested));
            }
        }

        module_dir.is_dir().then(|| canonical(module_dir))
    }

    fn resolve_remote(&self, import_path: &str, version: Option<&str>) -> Option<PathBuf> {
        let Some(cache_root) = self.cache_root else {
            tracing::debug!(module = import_path, "no cache directory configured");
            return None;
        };
        let base = cache::cache_base(cache_root);
        if !base.is_dir() {
            tracing::debug!(cache = %base.display(), "module cache does not exist");
            return None;
        }

        match version {
            Some(version) => cache::find_version(&base, import_path, version),
            None => cache::find_latest(&base, import_path),
        }
    }
}

fn expand_home(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

fn canonical(path: PathBuf) -> PathBuf {
    path.canonicalize().unwrap_or(path)
}
