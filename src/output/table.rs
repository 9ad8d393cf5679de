//! ASCII table output

use crate::domain::{ExecutionResult, Module, UNKNOWN_VERSION};
use crate::output::{format_duration, OutputFormatter, Report};
use std::io::Write;

/// Table formatter with `+---+` borders
#[derive(Debug, Default)]
pub struct TableFormatter;

impl TableFormatter {
    /// Create a new table formatter
    pub fn new() -> Self {
        Self
    }

    fn version_cell(result: &ExecutionResult) -> String {
        match &result.new_version {
            Some(new) if result.changed() => format!("{} -> {}", result.old_version, new),
            Some(new) => new.clone(),
            None => String::new(),
        }
    }
}

/// Column widths plus the rows to print
struct Table {
    headers: Vec<&'static str>,
    rows: Vec<Vec<String>>,
}

impl Table {
    fn new(headers: Vec<&'static str>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn widths(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(i))
                    .map(|cell| cell.chars().count())
                    .chain(std::iter::once(header.len()))
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }

    fn write(&self, writer: &mut dyn Write) -> std::io::Result<()> {
        let widths = self.widths();
        let divider: String = widths
            .iter()
            .map(|w| format!("+{}", "-".repeat(w + 2)))
            .collect::<String>()
            + "+";

        let write_row = |writer: &mut dyn Write, cells: &[String]| -> std::io::Result<()> {
            for (cell, width) in cells.iter().zip(&widths) {
                write!(writer, "| {:<width$} ", cell, width = width)?;
            }
            writeln!(writer, "|")
        };

        writeln!(writer, "{}", divider)?;
        let headers: Vec<String> = self.headers.iter().map(|h| h.to_string()).collect();
        write_row(writer, &headers)?;
        writeln!(writer, "{}", divider)?;
        for row in &self.rows {
            write_row(writer, row)?;
        }
        writeln!(writer, "{}", divider)
    }
}

impl OutputFormatter for TableFormatter {
    fn format_results(&self, report: &Report<'_>, writer: &mut dyn Write) -> std::io::Result<()> {
        if report.results.is_empty() {
            return writeln!(writer, "No results to display.");
        }

        let mut table = Table::new(vec!["Module", "Version", "Status", "Duration"]);
        for result in report.results {
            let status = if result.is_success() { "OK" } else { "FAILED" };
            table.push(vec![
                result.module_name().to_string(),
                Self::version_cell(result),
                status.to_string(),
                format_duration(result.duration),
            ]);
        }
        table.write(writer)?;

        // Failure reasons do not fit the table
        let failures: Vec<&ExecutionResult> =
            report.results.iter().filter(|r| !r.is_success()).collect();
        if !failures.is_empty() {
            writeln!(writer)?;
            for result in failures {
                writeln!(
                    writer,
                    "{}: {}",
                    result.module_name(),
                    result.error.as_deref().unwrap_or_default()
                )?;
            }
        }

        writeln!(writer)?;
        writeln!(writer, "{}", report.summary_line())
    }

    fn format_summary(&self, report: &Report<'_>, writer: &mut dyn Write) -> std::io::Result<()> {
        writeln!(writer, "{}", report.summary_line())
    }

    fn format_modules(&self, modules: &[Module], writer: &mut dyn Write) -> std::io::Result<()> {
        if modules.is_empty() {
            return writeln!(writer, "No modules found.");
        }

        let mut table = Table::new(vec!["Module", "Version", "Path"]);
        for module in modules {
            let version = if module.has_known_version() {
                module.current_version.clone()
            } else {
                UNKNOWN_VERSION.to_string()
            };
            table.push(vec![
                module.name.clone(),
                version,
                module.relative_path.display().to_string(),
            ]);
        }
        table.write(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::test_support::{failure, render, success};
    use crate::output::Verbosity;

    #[test]
    fn test_format_table() {
        let results = vec![
            success("api", "1.0.0", "1.0.1", 2),
            success("auth", "2.0.0", "2.0.1", 3),
        ];
        let report = Report::new("bump patch", "bumped", &results);
        let output = render(&TableFormatter::new(), &report, Verbosity::Normal);

        let expected = "\
+--------+----------------+--------+----------+
| Module | Version        | Status | Duration |
+--------+----------------+--------+----------+
| api    | 1.0.0 -> 1.0.1 | OK     | 2ms      |
| auth   | 2.0.0 -> 2.0.1 | OK     | 3ms      |
+--------+----------------+--------+----------+

Success: 2 modules bumped in 5ms
";
        assert_eq!(output, expected);
    }

    #[test]
    fn test_format_table_with_failure() {
        let results = vec![
            success("api", "1.0.0", "1.0.1", 2),
            failure("auth", "2.0.0", "permission denied"),
        ];
        let report = Report::new("bump patch", "bumped", &results);
        let output = render(&TableFormatter::new(), &report, Verbosity::Normal);

        assert!(output.contains("| auth   |                | FAILED |"));
        assert!(output.contains("auth: permission denied\n"));
        assert!(output.ends_with("Completed: 1 succeeded, 1 failed\n"));
    }

    #[test]
    fn test_format_modules_table() {
        let modules = vec![Module::new("api", "/repo/services/api/.version")
            .with_relative_path("services/api/.version")
            .with_current_version("1.0.0")];
        let mut out = Vec::new();
        TableFormatter::new().format_modules(&modules, &mut out).unwrap();
        let output = String::from_utf8(out).unwrap();

        assert!(output.contains("| Module | Version | Path                  |"));
        assert!(output.contains("| api    | 1.0.0   | services/api/.version |"));
    }
}
