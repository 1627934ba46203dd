//! One end-to-end analysis run.
//!
//! Stages run in a fixed order: enumerate, classify, extract, resolve,
//! build the graph, then check every unused unit. Classification and
//! extraction fan out with rayon over fixed-width batches so at most
//! `batch_width` files are read at once. The graph is only queried after
//! every batch has finished.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::analysis::{normalize_path, Import, ImportExtractor, ModuleResolver, ResolvedEdge};
use crate::classify::{PatternClassifier, Unit, UnitClassifier};
use crate::config::{AnalysisConfig, ConfigError};
use crate::graph::DependencyGraph;
use crate::report::{AnalysisReport, RunStats, UnitRecord};
use crate::safety::SafetyAnalyzer;
use crate::workspace::{discover, ContentCache, FileStat};

/// Errors that abort a run.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// The project root does not exist or is not a directory.
    #[error("Workspace not found: {0}")]
    WorkspaceNotFound(PathBuf),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type alias for run operations.
pub type RunResult<T> = Result<T, RunError>;

/// Run context: configuration, classifier and a content cache owned by
/// this run alone.
pub struct AnalysisRun {
    config: AnalysisConfig,
    cache: ContentCache,
    classifier: Box<dyn UnitClassifier>,
}

impl AnalysisRun {
    /// Creates a run with the pattern classifier. Fails on invalid config.
    pub fn new(config: AnalysisConfig) -> RunResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            cache: ContentCache::new(),
            classifier: Box::new(PatternClassifier::new()),
        })
    }

    /// Replaces the classifier.
    pub fn with_classifier(mut self, classifier: impl UnitClassifier + 'static) -> Self {
        self.classifier = Box::new(classifier);
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// The content cache; preload entries here to analyze unsaved text.
    pub fn cache(&self) -> &ContentCache {
        &self.cache
    }

    /// Analyzes the project at `root`.
    ///
    /// Only a missing root is an error. Unreadable files are skipped and an
    /// empty project yields an empty report.
    pub fn execute(&self, root: &Path) -> RunResult<AnalysisReport> {
        if !root.is_dir() {
            return Err(RunError::WorkspaceNotFound(root.to_path_buf()));
        }
        let root = fs::canonicalize(root).unwrap_or_else(|_| normalize_path(root));
        self.cache.clear();

        let discovery = discover(&root, &self.config);
        tracing::info!(
            "Found {} source files, {} text files, {} config files under {}",
            discovery.source_files.len(),
            discovery.text_files.len(),
            discovery.config_files.len(),
            root.display()
        );

        let units = self.classify(&discovery.source_files);
        tracing::info!("Classified {} units", units.len());

        let extractor = ImportExtractor::with_aliases(self.config.aliases.keys());
        let imports = self.extract(&discovery.source_files, &extractor);

        let resolver = ModuleResolver::new(&root, &self.config);
        let edges: Vec<ResolvedEdge> = imports
            .par_iter()
            .map(|import| ResolvedEdge::resolve(import, &resolver))
            .collect();

        let graph = DependencyGraph::build(&units, &edges, &self.config.resolve_extensions);
        let unused_units = graph.find_unused(&units);
        tracing::info!(
            "{} of {} units have no dependents",
            unused_units.len(),
            units.len()
        );

        let analyzer =
            SafetyAnalyzer::new(&graph, &self.cache, &discovery, self.config.safety.clone());
        let unused: Vec<UnitRecord> = unused_units
            .into_iter()
            .map(|unit| UnitRecord::new(unit, analyzer.analyze(unit)))
            .collect();

        let cycles = graph.cycle_details();
        if !cycles.is_empty() {
            tracing::warn!("Detected {} circular reference(s) among units", cycles.len());
        }

        let stats = RunStats {
            files_scanned: discovery.file_count(),
            source_files: discovery.source_files.len(),
            text_files: discovery.text_files.len(),
            config_files: discovery.config_files.len(),
            units: units.len(),
            references: imports.len(),
            resolved_edges: graph.edge_count(),
            unused: unused.len(),
            safe_to_delete: unused.iter().filter(|r| r.safe).count(),
            truncated: discovery.truncated,
        };

        Ok(AnalysisReport {
            root,
            units,
            graph,
            unused,
            cycles,
            stats,
        })
    }

    fn classify(&self, files: &[PathBuf]) -> Vec<Unit> {
        let mut units = Vec::new();
        for batch in files.chunks(self.config.batch_width) {
            let found: Vec<Unit> = batch
                .par_iter()
                .filter_map(|path| self.classify_file(path))
                .collect();
            units.extend(found);
        }
        units
    }

    fn classify_file(&self, path: &Path) -> Option<Unit> {
        if self.classifier.skips(path) {
            return None;
        }
        let content = self.cache.read(path)?;
        if !self.classifier.is_unit(path, &content) {
            return None;
        }
        Some(Unit::new(
            normalize_path(path),
            self.classifier.display_name(path),
            FileStat::of(path),
        ))
    }

    fn extract(&self, files: &[PathBuf], extractor: &ImportExtractor) -> Vec<Import> {
        let mut imports = Vec::new();
        for batch in files.chunks(self.config.batch_width) {
            let found: Vec<Vec<Import>> = batch
                .par_iter()
                .map(|path| extractor.extract_file(path, &self.cache))
                .collect();
            imports.extend(found.into_iter().flatten());
        }
        tracing::debug!("Extracted {} project-local references", imports.len());
        imports
    }
}

/// Runs a one-off analysis of `root` with `config`.
pub fn analyze(root: &Path, config: AnalysisConfig) -> RunResult<AnalysisReport> {
    AnalysisRun::new(config)?.execute(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, rel: &str, content: &str) {
        let path = dir.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = AnalysisConfig {
            batch_width: 0,
            ..AnalysisConfig::default()
        };
        assert!(matches!(AnalysisRun::new(config), Err(RunError::Config(_))));
    }

    #[test]
    fn test_missing_root() {
        let dir = TempDir::new().unwrap();
        let run = AnalysisRun::new(AnalysisConfig::default()).unwrap();

        let err = run.execute(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, RunError::WorkspaceNotFound(_)));
    }

    #[test]
    fn test_empty_project_is_empty_report() {
        let dir = TempDir::new().unwrap();
        let report = analyze(dir.path(), AnalysisConfig::default()).unwrap();

        assert!(report.is_empty());
        assert!(report.unused.is_empty());
        assert_eq!(report.stats.files_scanned, 0);
    }

    #[test]
    fn test_batches_narrower_than_file_count() {
        let dir = TempDir::new().unwrap();
        for i in 0..5 {
            write(
                &dir,
                &format!("src/Widget{i}.tsx"),
                "import React from 'react';\nexport const W = () => <div />;",
            );
        }
        write(
            &dir,
            "src/App.tsx",
            "import W0 from './Widget0';\nimport W1 from './Widget1';\nexport const App = () => <W0 />;",
        );

        let config = AnalysisConfig {
            batch_width: 2,
            ..AnalysisConfig::default()
        };
        let report = analyze(dir.path(), config).unwrap();

        assert_eq!(report.stats.units, 6);
        assert_eq!(report.stats.references, 2);
        assert_eq!(report.stats.resolved_edges, 2);
        let names: Vec<&str> = report.unused.iter().map(|r| r.display_name.as_str()).collect();
        assert_eq!(names, vec!["App", "Widget2", "Widget3", "Widget4"]);
    }

    #[test]
    fn test_custom_classifier() {
        struct Everything;
        impl UnitClassifier for Everything {
            fn is_unit(&self, _path: &Path, _content: &str) -> bool {
                true
            }
        }

        let dir = TempDir::new().unwrap();
        write(&dir, "src/util.ts", "export const x = 1;");

        let run = AnalysisRun::new(AnalysisConfig::default())
            .unwrap()
            .with_classifier(Everything);
        let report = run.execute(dir.path()).unwrap();

        assert_eq!(report.units.len(), 1);
        assert_eq!(report.units[0].display_name, "Util");
    }
}
