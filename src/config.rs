use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use glob::Pattern;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE_NAME: &str = ".hugodepsrc.json";

pub const DEFAULT_TEMPLATE_EXTENSIONS: &[&str] = &[
    "html", "xml", "json", "svg", "js", "css", "txt", "rss", "atom", "mjs", "cjs",
];

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub ignores: Vec<String>,
    #[serde(default = "default_template_extensions")]
    pub template_extensions: Vec<String>,
    #[serde(default = "default_include_modules")]
    pub include_modules: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<String>,
}

fn default_template_extensions() -> Vec<String> {
    DEFAULT_TEMPLATE_EXTENSIONS
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}

fn default_include_modules() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ignores: Vec::new(),
            template_extensions: default_template_extensions(),
            include_modules: default_include_modules(),
            cache_dir: None,
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// Returns an error if any glob pattern in `ignores` is invalid or an
    /// extension is empty.
    pub fn validate(&self) -> Result<()> {
        for pattern in &self.ignores {
            Pattern::new(pattern)
                .with_context(|| format!("Invalid glob pattern in 'ignores': \"{}\"", pattern))?;
        }

        for ext in &self.template_extensions {
            if ext.trim_start_matches('.').is_empty() {
                anyhow::bail!("Empty entry in 'templateExtensions'");
            }
        }

        Ok(())
    }

    /// Extensions without a leading dot, lowercased.
    pub fn normalized_extensions(&self) -> Vec<String> {
        self.template_extensions
            .iter()
            .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
            .collect()
    }
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// The file the configuration came from; `None` when using defaults.
    pub path: Option<PathBuf>,
}

impl ConfigLoadResult {
    pub fn from_file(&self) -> bool {
        self.path.is_some()
    }
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            config.validate()?;
            Ok(ConfigLoadResult {
                config,
                path: Some(path),
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            path: None,
        }),
    }
}
