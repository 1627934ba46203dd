//! Markdown export implementation.
//!
//! Produces the review document a human reads before deleting anything.

use super::Exporter;
use crate::report::{format_size, AnalysisReport};
use std::io::{self, Write};

/// Markdown exporter implementation.
pub struct MarkdownExporter;

/// Escapes `|` so a value cannot break a table row.
fn cell(value: &str) -> String {
    value.replace('|', "\\|")
}

impl Exporter for MarkdownExporter {
    fn export<W: Write>(&self, report: &AnalysisReport, writer: &mut W) -> io::Result<()> {
        let stats = &report.stats;

        // Title
        writeln!(writer, "# Unused Component Report")?;
        writeln!(writer)?;
        writeln!(writer, "**Project:** `{}`", report.root.display())?;
        writeln!(writer)?;

        // Summary section
        writeln!(writer, "## Summary")?;
        writeln!(writer)?;
        writeln!(writer, "| Metric | Count |")?;
        writeln!(writer, "|--------|-------|")?;
        writeln!(writer, "| Files Scanned | {} |", stats.files_scanned)?;
        writeln!(writer, "| Components | {} |", stats.units)?;
        writeln!(writer, "| References | {} |", stats.references)?;
        writeln!(writer, "| Unused Components | {} |", stats.unused)?;
        writeln!(writer, "| Safe to Delete | {} |", stats.safe_to_delete)?;
        writeln!(
            writer,
            "| Reclaimable Size | {} |",
            format_size(report.reclaimable_bytes())
        )?;
        writeln!(writer, "| Circular References | {} |", report.cycles.len())?;
        writeln!(writer)?;

        if stats.truncated {
            writeln!(
                writer,
                "> **Note:** the file limit was reached; results cover part of the project."
            )?;
            writeln!(writer)?;
        }

        if report.unused.is_empty() {
            writeln!(writer, "No unused components found.")?;
            writeln!(writer)?;
        } else {
            writeln!(writer, "## Unused Components ({})", report.unused.len())?;
            writeln!(writer)?;
            writeln!(writer, "| Component | Path | Size | Safe |")?;
            writeln!(writer, "|-----------|------|------|------|")?;
            for record in report.records_by_size() {
                writeln!(
                    writer,
                    "| {} | `{}` | {} | {} |",
                    cell(&record.display_name),
                    report.relative(&record.path),
                    format_size(record.size),
                    if record.safe { "yes" } else { "no" }
                )?;
            }
            writeln!(writer)?;
        }

        // Details for anything that needs a second look
        let flagged: Vec<_> = report
            .records_by_size()
            .into_iter()
            .filter(|r| !r.warnings.is_empty() || !r.safe)
            .collect();

        if !flagged.is_empty() {
            writeln!(writer, "## Review Before Deleting")?;
            writeln!(writer)?;
            for record in flagged {
                writeln!(
                    writer,
                    "### {} (`{}`)",
                    record.display_name,
                    report.relative(&record.path)
                )?;
                writeln!(writer)?;
                for warning in &record.warnings {
                    writeln!(writer, "- ⚠️ {}", warning)?;
                }
                for recommendation in &record.recommendations {
                    writeln!(writer, "- {}", recommendation)?;
                }
                writeln!(writer)?;
            }
        }

        // Circular references
        if !report.cycles.is_empty() {
            writeln!(writer, "## Circular References")?;
            writeln!(writer)?;
            writeln!(
                writer,
                "The following components reference each other circularly:"
            )?;
            writeln!(writer)?;
            for (i, cycle) in report.cycles.iter().enumerate() {
                writeln!(writer, "{}. `{}`", i + 1, cycle.cycle_path())?;
            }
            writeln!(writer)?;
        }

        // Footer
        writeln!(writer, "---")?;
        writeln!(writer, "*Generated by PruneScope*")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::sample_report;

    fn render(report: &AnalysisReport) -> String {
        let mut output = Vec::new();
        MarkdownExporter.export(report, &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_markdown_export_summary() {
        let md_str = render(&sample_report());

        assert!(md_str.contains("# Unused Component Report"));
        assert!(md_str.contains("**Project:** `/proj`"));
        assert!(md_str.contains("| Components | 3 |"));
        assert!(md_str.contains("| Unused Components | 2 |"));
        assert!(md_str.contains("| Safe to Delete | 1 |"));
        assert!(md_str.contains("| Reclaimable Size | 300 B |"));
    }

    #[test]
    fn test_markdown_unit_table_largest_first() {
        let md_str = render(&sample_report());

        assert!(md_str.contains("## Unused Components (2)"));
        let table_row = md_str
            .find("| DataTable | `src/DataTable.tsx` | 4.00 KB | no |")
            .unwrap();
        let badge_row = md_str
            .find("| Badge | `src/Badge.tsx` | 300 B | yes |")
            .unwrap();
        assert!(table_row < badge_row);
    }

    #[test]
    fn test_markdown_review_section_lists_flagged_only() {
        let md_str = render(&sample_report());

        assert!(md_str.contains("## Review Before Deleting"));
        assert!(md_str.contains("### DataTable (`src/DataTable.tsx`)"));
        assert!(md_str.contains("- ⚠️ Re-exported from src/index.ts"));
        assert!(!md_str.contains("### Badge"));
    }

    #[test]
    fn test_markdown_export_with_cycles() {
        let md_str = render(&sample_report());

        assert!(md_str.contains("## Circular References"));
        assert!(md_str.contains("1. `/proj/src/A.tsx -> /proj/src/B.tsx -> /proj/src/A.tsx`"));
    }

    #[test]
    fn test_markdown_no_unused() {
        let mut report = sample_report();
        report.unused.clear();
        report.cycles.clear();

        let md_str = render(&report);

        assert!(md_str.contains("No unused components found."));
        assert!(!md_str.contains("## Review Before Deleting"));
        assert!(!md_str.contains("## Circular References"));
        assert!(md_str.contains("*Generated by PruneScope*"));
    }

    #[test]
    fn test_markdown_truncation_note() {
        let mut report = sample_report();
        report.stats.truncated = true;

        assert!(render(&report).contains("the file limit was reached"));
    }
}
