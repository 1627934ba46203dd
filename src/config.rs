//! Analysis configuration.
//!
//! Every knob has a default, so an empty `prunescope.json` (or no file at
//! all) yields the stock behavior. CLI flags are applied on top by the binary.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::safety::SafetyPolicy;

/// File name looked up at the project root when no explicit config is given.
pub const CONFIG_FILE_NAME: &str = "prunescope.json";

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the config file from disk.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid JSON or has the wrong shape.
    #[error("Invalid config file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A value parsed but makes no sense.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Settings for the safety analysis stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SafetyConfig {
    /// How re-export and config-file findings affect the verdict.
    pub policy: SafetyPolicy,
    /// Whether to scan project text for indirect mentions of a unit.
    pub check_indirect: bool,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            policy: SafetyPolicy::Strict,
            check_indirect: true,
        }
    }
}

/// Top-level configuration for one analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalysisConfig {
    /// Extensions (without dot) of files that are classified and scanned for imports.
    pub source_extensions: Vec<String>,
    /// Extensions probed, in order, when a specifier has none.
    pub resolve_extensions: Vec<String>,
    /// Implicit index file names probed, in order, inside a directory.
    pub index_files: Vec<String>,
    /// Extra extensions scanned only for indirect mentions (markup, docs, data).
    pub text_extensions: Vec<String>,
    /// Directory names never descended into.
    pub ignored_dirs: Vec<String>,
    /// Specifier prefix -> project-relative replacement, e.g. `"@/" -> "src/"`.
    pub aliases: BTreeMap<String, String>,
    /// Upper bound on enumerated files; larger trees are truncated.
    pub max_files: usize,
    /// Number of files read concurrently per batch.
    pub batch_width: usize,
    pub safety: SafetyConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            source_extensions: strings(&["tsx", "ts", "jsx", "js", "mjs", "cjs"]),
            resolve_extensions: strings(&["tsx", "ts", "jsx", "js", "mjs", "cjs"]),
            index_files: strings(&["index.tsx", "index.ts", "index.jsx", "index.js"]),
            text_extensions: strings(&[
                "md", "mdx", "html", "vue", "svelte", "astro", "json", "yml", "yaml", "css",
                "scss", "less", "txt",
            ]),
            ignored_dirs: strings(&[
                "node_modules",
                ".git",
                "dist",
                "build",
                ".next",
                "coverage",
                ".turbo",
            ]),
            aliases: BTreeMap::new(),
            max_files: 10_000,
            batch_width: 64,
            safety: SafetyConfig::default(),
        }
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

impl AnalysisConfig {
    /// Loads configuration from a JSON file. Missing keys take their defaults.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&content).map_err(|err| match err {
            ConfigError::Json { source, .. } => ConfigError::Json {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;
        Ok(config)
    }

    /// Parses and validates configuration from a JSON string.
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(content).map_err(|source| ConfigError::Json {
            path: PathBuf::new(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `prunescope.json` from `root` if present, defaults otherwise.
    pub fn discover(root: &Path) -> ConfigResult<Self> {
        let candidate = root.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            tracing::debug!("Loading config from {}", candidate.display());
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    /// Rejects values that would make a run meaningless.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.source_extensions.is_empty() {
            return Err(ConfigError::Invalid(
                "sourceExtensions must not be empty".to_string(),
            ));
        }
        if self.batch_width == 0 {
            return Err(ConfigError::Invalid(
                "batchWidth must be at least 1".to_string(),
            ));
        }
        if self.max_files == 0 {
            return Err(ConfigError::Invalid(
                "maxFiles must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns true if `ext` (no dot, any case) is a source extension.
    pub fn is_source_extension(&self, ext: &str) -> bool {
        self.source_extensions
            .iter()
            .any(|e| e.eq_ignore_ascii_case(ext))
    }

    /// Returns true if `ext` is scanned only as text.
    pub fn is_text_extension(&self, ext: &str) -> bool {
        self.text_extensions
            .iter()
            .any(|e| e.eq_ignore_ascii_case(ext))
    }
}
