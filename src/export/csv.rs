//! CSV export implementation.
//!
//! One row per unused unit for spreadsheet use. List-valued columns are
//! joined with `; `.

use super::Exporter;
use crate::report::AnalysisReport;
use std::io::{self, Write};

/// CSV exporter implementation.
pub struct CsvExporter;

impl CsvExporter {
    /// Escape a field value for CSV format.
    ///
    /// Wraps the value in quotes if it contains commas, quotes, or newlines.
    fn escape_field(value: &str) -> String {
        if value.contains(',') || value.contains('"') || value.contains('\n') {
            format!("\"{}\"", value.replace('"', "\"\""))
        } else {
            value.to_string()
        }
    }

    fn join(values: &[String]) -> String {
        Self::escape_field(&values.join("; "))
    }
}

impl Exporter for CsvExporter {
    fn export<W: Write>(&self, report: &AnalysisReport, writer: &mut W) -> io::Result<()> {
        writeln!(
            writer,
            "path,name,size_bytes,modified_ms,safe,dependents,warnings,recommendations"
        )?;

        for record in report.records_by_size() {
            let dependents: Vec<String> = record
                .dependents
                .iter()
                .map(|d| report.relative(d))
                .collect();

            writeln!(
                writer,
                "{},{},{},{},{},{},{},{}",
                Self::escape_field(&report.relative(&record.path)),
                Self::escape_field(&record.display_name),
                record.size,
                record.modified_ms,
                record.safe,
                Self::join(&dependents),
                Self::join(&record.warnings),
                Self::join(&record.recommendations),
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::sample_report;

    #[test]
    fn test_csv_export_basic() {
        let report = sample_report();
        let mut output = Vec::new();

        CsvExporter.export(&report, &mut output).unwrap();

        let csv_str = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = csv_str.lines().collect();

        // Header + 2 unused units
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "path,name,size_bytes,modified_ms,safe,dependents,warnings,recommendations"
        );
        assert!(lines[1].starts_with("src/DataTable.tsx,DataTable,4096,1700000500000,false,,"));
        assert!(lines[2].starts_with("src/Badge.tsx,Badge,300,1700000000000,true,,,"));
    }

    #[test]
    fn test_csv_escape_field() {
        // No escaping needed
        assert_eq!(CsvExporter::escape_field("simple"), "simple");

        // Contains comma
        assert_eq!(
            CsvExporter::escape_field("has,comma"),
            "\"has,comma\""
        );

        // Contains quotes
        assert_eq!(
            CsvExporter::escape_field("has\"quote"),
            "\"has\"\"quote\""
        );

        // Contains newline
        assert_eq!(
            CsvExporter::escape_field("has\nnewline"),
            "\"has\nnewline\""
        );
    }

    #[test]
    fn test_csv_list_columns_joined() {
        let mut report = sample_report();
        report.unused[1].warnings.push("Imported by 1 test file(s): a, b".to_string());

        let mut output = Vec::new();
        CsvExporter.export(&report, &mut output).unwrap();
        let csv_str = String::from_utf8(output).unwrap();

        assert!(csv_str
            .contains("\"Re-exported from src/index.ts; Imported by 1 test file(s): a, b\""));
    }

    #[test]
    fn test_csv_header_only_when_nothing_unused() {
        let mut report = sample_report();
        report.unused.clear();

        let mut output = Vec::new();
        CsvExporter.export(&report, &mut output).unwrap();

        assert_eq!(String::from_utf8(output).unwrap().lines().count(), 1);
    }
}
