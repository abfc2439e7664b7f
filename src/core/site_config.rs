//! Hugo site configuration: module imports, replacements and the cache root.
//!
//! Only the handful of keys that drive module resolution are read. Everything
//! else in the site configuration is ignored.

use std::{
    env,
    io::Read,
    path::{Path, PathBuf},
    process::{Command, Stdio},
    thread,
    time::{Duration, Instant},
};

use serde::{Deserialize, de::DeserializeOwned};
use thiserror::Error;

use crate::core::modules::Replacements;

/// Site configuration files checked in order; the first one found wins.
pub const SITE_CONFIG_FILES: &[&str] = &[
    "hugo.toml",
    "hugo.yaml",
    "hugo.yml",
    "hugo.json",
    "config.toml",
    "config.yaml",
    "config.yml",
    "config.json",
];

/// Split configuration directory checked when the project root has no config file.
pub const DEFAULT_CONFIG_DIR: &str = "config/_default";

const MODULE_CONFIG_FILES: &[&str] = &["module.toml", "module.yaml", "module.yml", "module.json"];

/// Time allowed for `hugo config` before it is killed.
pub const HUGO_CONFIG_TIMEOUT: Duration = Duration::from_secs(30);

pub const CACHE_DIR_ENV: &str = "HUGO_CACHEDIR";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("`hugo` executable not found in PATH")]
    HugoNotFound(#[source] which::Error),

    #[error("failed to run `hugo config`")]
    HugoSpawn(#[source] std::io::Error),

    #[error("`hugo config` exited with {status}: {stderr}")]
    HugoFailed { status: String, stderr: String },

    #[error("`hugo config` did not finish within {0:?}")]
    HugoTimeout(Duration),
}

// ============================================================
// Configuration shape
// ============================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SiteConfig {
    #[serde(default, rename = "cacheDir", alias = "cachedir")]
    pub cache_dir: Option<String>,

    #[serde(default)]
    pub caches: Option<CachesConfig>,

    #[serde(default)]
    pub module: ModuleConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CachesConfig {
    #[serde(default, rename = "cachedir", alias = "cacheDir")]
    pub cache_dir: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ModuleConfig {
    #[serde(default)]
    pub imports: Vec<ModuleImport>,

    #[serde(default)]
    pub replacements: Option<OneOrMany>,
}

impl ModuleConfig {
    fn is_empty(&self) -> bool {
        self.imports.is_empty() && self.replacements.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ModuleImport {
    #[serde(default)]
    pub path: Option<String>,

    #[serde(default)]
    pub version: Option<String>,
}

/// `replacements = "a -> b"` or `replacements = ["a -> b", "c -> d"]`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn as_slice(&self) -> &[String] {
        match self {
            OneOrMany::One(one) => std::slice::from_ref(one),
            OneOrMany::Many(many) => many,
        }
    }
}

impl SiteConfig {
    /// Imports that name a path, in declaration order.
    pub fn module_imports(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.module.imports.iter().filter_map(|import| {
            let path = import.path.as_deref().map(str::trim)?;
            (!path.is_empty()).then(|| (path, import.version.as_deref()))
        })
    }

    pub fn replacements(&self) -> Replacements {
        self.module
            .replacements
            .as_ref()
            .map(|r| Replacements::parse(r.as_slice().iter().map(String::as_str)))
            .unwrap_or_default()
    }

    /// Configured cache root: `cacheDir`, then `caches.cachedir`.
    pub fn configured_cache_dir(&self) -> Option<PathBuf> {
        self.cache_dir
            .as_deref()
            .or_else(|| self.caches.as_ref()?.cache_dir.as_deref())
            .filter(|dir| !dir.trim().is_empty())
            .map(expand_path)
    }

    /// Effective cache root: configuration, `HUGO_CACHEDIR`, then the
    /// platform cache directory.
    pub fn cache_root(&self) -> Option<PathBuf> {
        self.configured_cache_dir()
            .or_else(|| {
                env::var(CACHE_DIR_ENV)
                    .ok()
                    .filter(|dir| !dir.trim().is_empty())
                    .map(|dir| expand_path(&dir))
            })
            .or_else(|| dirs::cache_dir().map(|dir| dir.join("hugo_cache")))
    }

    /// Human-readable problems with the module imports.
    pub fn validate_imports(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        let mut seen: Vec<&str> = Vec::new();

        for (index, import) in self.module.imports.iter().enumerate() {
            let Some(path) = import.path.as_deref().map(str::trim).filter(|p| !p.is_empty()) else {
                warnings.push(format!("module import #{} has no path", index + 1));
                continue;
            };
            if seen.contains(&path) {
                warnings.push(format!("module '{}' is imported more than once", path));
            } else {
                seen.push(path);
            }
        }

        warnings
    }
}

fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path.trim()).as_ref())
}

// ============================================================
// Loading
// ============================================================

/// A site configuration and the file it came from.
#[derive(Debug, Default)]
pub struct SiteConfigLoadResult {
    pub config: SiteConfig,
    /// `None` when no configuration file exists.
    pub source: Option<PathBuf>,
}

/// First site configuration file in the project root, then in `config/_default`.
pub fn find_site_config(project_root: &Path) -> Option<PathBuf> {
    [project_root.to_path_buf(), project_root.join(DEFAULT_CONFIG_DIR)]
        .into_iter()
        .flat_map(|dir| SITE_CONFIG_FILES.iter().map(move |name| dir.join(name)))
        .find(|candidate| candidate.is_file())
}

/// Load the site configuration from disk.
///
/// A project without any configuration file yields the default (empty)
/// configuration. A split `config/_default` setup also picks up a sibling
/// `module.*` file when the main file has no `module` section.
pub fn load_site_config(project_root: &Path) -> Result<SiteConfigLoadResult, ConfigError> {
    let Some(path) = find_site_config(project_root) else {
        tracing::debug!(root = %project_root.display(), "no site configuration found");
        return Ok(SiteConfigLoadResult::default());
    };

    let mut config: SiteConfig = parse_file(&path)?;

    if config.module.is_empty()
        && let Some(dir) = path.parent()
        && dir.ends_with(DEFAULT_CONFIG_DIR)
        && let Some(module_file) = MODULE_CONFIG_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
    {
        config.module = parse_file(&module_file)?;
    }

    tracing::debug!(
        path = %path.display(),
        imports = config.module.imports.len(),
        "loaded site configuration"
    );
    Ok(SiteConfigLoadResult {
        config,
        source: Some(path),
    })
}

fn parse_file<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let format = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");
    parse_str(&content, format).map_err(|message| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    })
}

/// Parse configuration text in the given format (`toml`, `yaml`/`yml`, `json`).
pub fn parse_str<T: DeserializeOwned>(content: &str, format: &str) -> Result<T, String> {
    match format {
        "yaml" | "yml" => {
            if content.trim().is_empty() {
                return serde_yaml::from_str("{}").map_err(|e| e.to_string());
            }
            serde_yaml::from_str(content).map_err(|e| e.to_string())
        }
        "json" => serde_json::from_str(content).map_err(|e| e.to_string()),
        _ => toml::from_str(content).map_err(|e| e.to_string()),
    }
}

/// Ask Hugo for the fully merged configuration via `hugo config`.
pub fn load_from_hugo(
    project_root: &Path,
    timeout: Duration,
) -> Result<SiteConfigLoadResult, ConfigError> {
    let hugo = which::which("hugo").map_err(ConfigError::HugoNotFound)?;
    tracing::debug!(hugo = %hugo.display(), "running hugo config");

    let mut child = Command::new(&hugo)
        .arg("config")
        .current_dir(project_root)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(ConfigError::HugoSpawn)?;

    // Drain both pipes while waiting so a large config cannot block the child.
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait().map_err(ConfigError::HugoSpawn)? {
            Some(status) => break status,
            None if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ConfigError::HugoTimeout(timeout));
            }
            None => thread::sleep(Duration::from_millis(50)),
        }
    };

    let stdout = stdout.join().unwrap_or_default();
    let stderr = stderr.join().unwrap_or_default();

    if !status.success() {
        return Err(ConfigError::HugoFailed {
            status: status.to_string(),
            stderr: stderr.trim().to_string(),
        });
    }

    parse_hugo_output(project_root, &stdout)
}

/// Parse `hugo config` output. The source is the configuration file Hugo
/// read, or the project root when there is none.
fn parse_hugo_output(
    project_root: &Path,
    output: &str,
) -> Result<SiteConfigLoadResult, ConfigError> {
    let config = parse_str(output, "toml").map_err(|message| ConfigError::Parse {
        path: PathBuf::from("hugo config"),
        message,
    })?;
    let source = find_site_config(project_root).unwrap_or_else(|| project_root.to_path_buf());
    Ok(SiteConfigLoadResult {
        config,
        source: Some(source),
    })
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = String::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_string(&mut buf);
        }
        buf
    })
}
