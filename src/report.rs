//! The result of one analysis run.
//!
//! [`AnalysisReport`] is the core's terminal output: the dependency graph,
//! the classified units, and one flat [`UnitRecord`] per unused unit. The
//! exporters in [`crate::export`] render it; nothing here does I/O.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::classify::Unit;
use crate::graph::{CycleInfo, DependencyGraph};
use crate::safety::SafetyVerdict;

/// One unused unit with its safety verdict, ready for serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitRecord {
    pub path: PathBuf,
    pub display_name: String,
    pub size: u64,
    pub modified_ms: u64,
    pub safe: bool,
    pub warnings: Vec<String>,
    pub recommendations: Vec<String>,
    pub dependents: Vec<PathBuf>,
    /// Full findings behind `safe`
    #[serde(skip)]
    pub verdict: SafetyVerdict,
}

impl UnitRecord {
    pub fn new(unit: &Unit, verdict: SafetyVerdict) -> Self {
        Self {
            path: unit.path.clone(),
            display_name: unit.display_name.clone(),
            size: unit.size,
            modified_ms: unit.modified_ms,
            safe: verdict.is_safe,
            warnings: verdict.warnings.clone(),
            recommendations: verdict.recommendations.clone(),
            dependents: verdict.dependents.clone(),
            verdict,
        }
    }
}

/// Counters describing a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Distinct files enumerated under the root
    pub files_scanned: usize,
    pub source_files: usize,
    pub text_files: usize,
    pub config_files: usize,
    pub units: usize,
    /// Project-local references extracted from source files
    pub references: usize,
    /// Edges that matched a unit after deduplication
    pub resolved_edges: usize,
    pub unused: usize,
    pub safe_to_delete: usize,
    /// True if enumeration stopped at the file cap
    pub truncated: bool,
}

/// Everything one run produced.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    /// Canonical project root
    pub root: PathBuf,
    /// Every classified unit, in discovery order
    pub units: Vec<Unit>,
    pub graph: DependencyGraph,
    /// Unused units in discovery order
    pub unused: Vec<UnitRecord>,
    /// Circular references among units
    pub cycles: Vec<CycleInfo>,
    pub stats: RunStats,
}

impl AnalysisReport {
    /// `path` relative to the project root, for display.
    pub fn relative(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }

    /// Unused records, largest file first. Ties keep discovery order.
    pub fn records_by_size(&self) -> Vec<&UnitRecord> {
        let mut records: Vec<&UnitRecord> = self.unused.iter().collect();
        records.sort_by(|a, b| b.size.cmp(&a.size));
        records
    }

    /// Records whose verdict is safe.
    pub fn safe_records(&self) -> impl Iterator<Item = &UnitRecord> {
        self.unused.iter().filter(|r| r.safe)
    }

    /// Bytes freed by deleting every safe unit.
    pub fn reclaimable_bytes(&self) -> u64 {
        self.safe_records().map(|r| r.size).sum()
    }

    /// True if no unit was found at all.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// Formats a byte count in human-readable form.
///
/// ```
/// use prunescope::report::format_size;
///
/// assert_eq!(format_size(512), "512 B");
/// assert_eq!(format_size(1536), "1.50 KB");
/// ```
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
