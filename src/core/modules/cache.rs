//! Lookups in Hugo's module cache.
//!
//! Downloaded modules live under `<cacheRoot>/modules/filecache/modules/pkg/mod`,
//! one directory per version, named `<import path>@<version>`. Lookups try
//! the import path joined directly onto the cache base as well as
//! `<domain>/<rest>@<version>`.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

const CACHE_MODULES_DIR: &str = "modules/filecache/modules/pkg/mod";

/// Directory holding downloaded modules for a given cache root.
///
/// A root that already points at a `pkg/mod` directory is used as-is.
pub fn cache_base(cache_root: &Path) -> PathBuf {
    if cache_root.ends_with("pkg/mod") {
        cache_root.to_path_buf()
    } else {
        cache_root.join(CACHE_MODULES_DIR)
    }
}

/// `v1.2.3+incompatible` -> `v1.2.3`
pub fn strip_version_suffix(version: &str) -> &str {
    version.split_once('+').map_or(version, |(base, _)| base)
}

/// Version component of a `name@version` directory name.
pub fn version_of(dir_name: &str) -> &str {
    dir_name.rsplit_once('@').map_or("", |(_, version)| version)
}

/// Locate a specific module version.
///
/// Tries the exact version, then the version with any `+suffix` removed, each
/// in the flat layout and then the hierarchical one.
pub fn find_version(base: &Path, module_path: &str, version: &str) -> Option<PathBuf> {
    let mut versions = vec![version];
    let stripped = strip_version_suffix(version);
    if stripped != version {
        versions.push(stripped);
    }

    versions
        .into_iter()
        .flat_map(|v| candidate_dirs(base, module_path, v))
        .find(|candidate| candidate.is_dir())
}

fn candidate_dirs(base: &Path, module_path: &str, version: &str) -> Vec<PathBuf> {
    let mut candidates = vec![base.join(format!("{module_path}@{version}"))];
    if let Some((domain, rest)) = module_path.split_once('/') {
        candidates.push(base.join(domain).join(format!("{rest}@{version}")));
    }
    candidates
}

/// Locate the newest cached version of a module.
///
/// Collects `<module_path>@*` entries directly under `base`, plus any
/// `<basename>@*` directory below the module's domain directory. Directories
/// whose full path spells the import path are preferred; other basename
/// matches are used only when there is none. The winner has the greatest
/// version string (compared lexicographically).
pub fn find_latest(base: &Path, module_path: &str) -> Option<PathBuf> {
    let flat_prefix = format!("{module_path}@");
    let domain = module_path.split_once('/').map(|(domain, _)| domain);
    let basename_prefix = format!("{}@", super::module_basename(module_path));

    let mut matches: Vec<PathBuf> = Vec::new();
    let entries = std::fs::read_dir(base).ok()?;

    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();

        if name.starts_with(&flat_prefix) {
            matches.push(path);
        } else if domain == Some(name.as_str()) {
            matches.extend(versioned_dirs_below(&path, &basename_prefix));
        }
    }

    let (exact, by_basename): (Vec<PathBuf>, Vec<PathBuf>) = matches
        .into_iter()
        .partition(|path| spells_module_path(base, path, module_path));
    let candidates = if exact.is_empty() { by_basename } else { exact };

    candidates.into_iter().max_by(|a, b| {
        let version_a = a.file_name().map(|n| n.to_string_lossy().into_owned());
        let version_b = b.file_name().map(|n| n.to_string_lossy().into_owned());
        let version_a = version_a.as_deref().map_or("", version_of);
        let version_b = version_b.as_deref().map_or("", version_of);
        version_a.cmp(version_b)
    })
}

/// Whether `path` is `<base>/<module_path>@<version>`.
fn spells_module_path(base: &Path, path: &Path, module_path: &str) -> bool {
    let Ok(relative) = path.strip_prefix(base) else {
        return false;
    };
    let relative = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    relative
        .rsplit_once('@')
        .is_some_and(|(name, _)| name == module_path)
}

/// Directories named `<prefix>*` anywhere below `root`.
///
/// Matched directories and other versioned module directories are not
/// descended into.
fn versioned_dirs_below(root: &Path, prefix: &str) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let mut walker = WalkDir::new(root).min_depth(1).into_iter();

    while let Some(entry) = walker.next() {
        let Ok(entry) = entry else {
            continue;
        };
        if !entry.file_type().is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if name.starts_with(prefix) {
            found.push(entry.path().to_path_buf());
            walker.skip_current_dir();
        } else if name.contains('@') {
            walker.skip_current_dir();
        }
    }

    found
}
