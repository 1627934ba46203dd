//! Project file enumeration.
//!
//! Walks the project root once and sorts every file into the buckets the
//! later stages need: source files (classified and scanned for imports),
//! text files (scanned for indirect mentions only) and well-known tooling
//! configuration files.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use walkdir::WalkDir;

use crate::config::AnalysisConfig;

/// Build and tooling configuration files that may name a component.
pub const CONFIG_FILE_PATTERNS: &[&str] = &[
    "**/package.json",
    "**/tsconfig*.json",
    "**/jsconfig.json",
    "**/*.config.{js,cjs,mjs,ts,cts,mts}",
    "**/.babelrc",
    "**/.babelrc.*",
    "**/.eslintrc",
    "**/.eslintrc.*",
    "**/.prettierrc*",
    "**/.storybook/*.{js,cjs,mjs,ts}",
    "**/vercel.json",
    "**/netlify.toml",
];

/// Result of walking a project root.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    pub root: PathBuf,
    /// Files with a source extension, sorted by path
    pub source_files: Vec<PathBuf>,
    /// Markup, docs and data files, sorted by path
    pub text_files: Vec<PathBuf>,
    /// Files matching [`CONFIG_FILE_PATTERNS`]; may overlap the other lists
    pub config_files: Vec<PathBuf>,
    /// True if the walk stopped at `max_files`
    pub truncated: bool,
}

impl Discovery {
    /// Total number of distinct files found.
    pub fn file_count(&self) -> usize {
        self.scannable_files().len()
    }

    /// Every discovered file, deduplicated, in a stable order: sources,
    /// then text files, then configs not already listed.
    pub fn scannable_files(&self) -> Vec<&Path> {
        let mut seen: HashSet<&Path> = HashSet::new();
        self.source_files
            .iter()
            .chain(&self.text_files)
            .chain(&self.config_files)
            .map(PathBuf::as_path)
            .filter(|p| seen.insert(*p))
            .collect()
    }
}

/// Builds the matcher for [`CONFIG_FILE_PATTERNS`].
pub fn config_file_matcher() -> Result<GlobSet, globset::Error> {
    let mut builder = GlobSetBuilder::new();
    for pattern in CONFIG_FILE_PATTERNS {
        builder.add(Glob::new(pattern)?);
    }
    builder.build()
}

/// Enumerates candidate files under `root`.
///
/// Ignored directories are pruned, never descended into. Unreadable entries
/// are skipped. Once `max_files` files have been collected the walk stops and
/// the result is marked truncated.
pub fn discover(root: &Path, config: &AnalysisConfig) -> Discovery {
    let matcher = match config_file_matcher() {
        Ok(m) => Some(m),
        Err(e) => {
            tracing::warn!("Config file patterns failed to compile: {}", e);
            None
        }
    };

    let mut discovery = Discovery {
        root: root.to_path_buf(),
        ..Discovery::default()
    };
    let mut collected = 0usize;

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_ignored_dir(e, config));

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::debug!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let relative = path.strip_prefix(root).unwrap_or(path);
        let is_config = matcher.as_ref().is_some_and(|m| m.is_match(relative));
        let is_source = config.is_source_extension(ext);
        let is_text = !is_source && config.is_text_extension(ext);

        if !(is_config || is_source || is_text) {
            continue;
        }

        if collected >= config.max_files {
            discovery.truncated = true;
            tracing::warn!(
                "File limit of {} reached; remaining files under {} are not analyzed",
                config.max_files,
                root.display()
            );
            break;
        }
        collected += 1;

        if is_source {
            discovery.source_files.push(path.to_path_buf());
        } else if is_text {
            discovery.text_files.push(path.to_path_buf());
        }
        if is_config {
            discovery.config_files.push(path.to_path_buf());
        }
    }

    tracing::debug!(
        "Discovered {} source, {} text and {} config files",
        discovery.source_files.len(),
        discovery.text_files.len(),
        discovery.config_files.len()
    );

    discovery
}

/// Check if a directory should be ignored during traversal.
fn is_ignored_dir(entry: &walkdir::DirEntry, config: &AnalysisConfig) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }

    let name = entry.file_name().to_string_lossy();
    config.ignored_dirs.iter().any(|d| d == name.as_ref())
}
