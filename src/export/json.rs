//! JSON export implementation.
//!
//! Exports the analysis report in JSON format for machine-readable output.

use super::Exporter;
use crate::report::AnalysisReport;
use serde::Serialize;
use std::io::{self, Write};

/// JSON exporter implementation.
pub struct JsonExporter;

/// Serializable unused unit for JSON output.
#[derive(Serialize)]
struct JsonUnit {
    path: String,
    name: String,
    size_bytes: u64,
    modified_ms: u64,
    safe: bool,
    warnings: Vec<String>,
    recommendations: Vec<String>,
    dependents: Vec<String>,
}

/// Serializable cycle info for JSON output.
#[derive(Serialize)]
struct JsonCycle {
    units: Vec<String>,
    path: String,
}

/// Summary statistics for JSON output.
#[derive(Serialize)]
struct JsonSummary {
    files_scanned: usize,
    source_files: usize,
    units: usize,
    references: usize,
    resolved_edges: usize,
    unused: usize,
    safe_to_delete: usize,
    reclaimable_bytes: u64,
    circular_references: usize,
    truncated: bool,
}

/// Root JSON export structure.
#[derive(Serialize)]
struct JsonExport {
    root: String,
    summary: JsonSummary,
    unused: Vec<JsonUnit>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    circular_references: Vec<JsonCycle>,
}

impl Exporter for JsonExporter {
    fn export<W: Write>(&self, report: &AnalysisReport, writer: &mut W) -> io::Result<()> {
        let unused: Vec<JsonUnit> = report
            .records_by_size()
            .into_iter()
            .map(|r| JsonUnit {
                path: report.relative(&r.path),
                name: r.display_name.clone(),
                size_bytes: r.size,
                modified_ms: r.modified_ms,
                safe: r.safe,
                warnings: r.warnings.clone(),
                recommendations: r.recommendations.clone(),
                dependents: r.dependents.iter().map(|d| report.relative(d)).collect(),
            })
            .collect();

        let circular_references: Vec<JsonCycle> = report
            .cycles
            .iter()
            .map(|c| JsonCycle {
                units: c.nodes.clone(),
                path: c.cycle_path(),
            })
            .collect();

        let stats = &report.stats;
        let export = JsonExport {
            root: report.root.display().to_string(),
            summary: JsonSummary {
                files_scanned: stats.files_scanned,
                source_files: stats.source_files,
                units: stats.units,
                references: stats.references,
                resolved_edges: stats.resolved_edges,
                unused: stats.unused,
                safe_to_delete: stats.safe_to_delete,
                reclaimable_bytes: report.reclaimable_bytes(),
                circular_references: report.cycles.len(),
                truncated: stats.truncated,
            },
            unused,
            circular_references,
        };

        let json = serde_json::to_string_pretty(&export)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        writeln!(writer, "{}", json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::sample_report;

    fn export_json(report: &AnalysisReport) -> serde_json::Value {
        let mut output = Vec::new();
        JsonExporter.export(report, &mut output).unwrap();
        let json_str = String::from_utf8(output).unwrap();
        serde_json::from_str(&json_str).unwrap()
    }

    #[test]
    fn test_json_export_summary() {
        let parsed = export_json(&sample_report());

        assert_eq!(parsed["root"], "/proj");
        assert_eq!(parsed["summary"]["units"], 3);
        assert_eq!(parsed["summary"]["unused"], 2);
        assert_eq!(parsed["summary"]["safe_to_delete"], 1);
        assert_eq!(parsed["summary"]["reclaimable_bytes"], 300);
    }

    #[test]
    fn test_json_export_units_largest_first() {
        let parsed = export_json(&sample_report());

        let units = parsed["unused"].as_array().unwrap();
        assert_eq!(units.len(), 2);
        assert_eq!(units[0]["name"], "DataTable");
        assert_eq!(units[0]["path"], "src/DataTable.tsx");
        assert_eq!(units[0]["safe"], false);
        assert_eq!(units[0]["warnings"][0], "Re-exported from src/index.ts");
        assert_eq!(units[1]["name"], "Badge");
        assert_eq!(units[1]["safe"], true);
    }

    #[test]
    fn test_json_export_cycles() {
        let parsed = export_json(&sample_report());

        let cycles = parsed["circular_references"].as_array().unwrap();
        assert_eq!(cycles.len(), 1);
        assert_eq!(parsed["summary"]["circular_references"], 1);
    }

    #[test]
    fn test_json_omits_empty_cycles() {
        let mut report = sample_report();
        report.cycles.clear();

        let parsed = export_json(&report);
        assert!(parsed.get("circular_references").is_none());
    }
}
