//! Output formatting for execution results
//!
//! This module provides:
//! - Text output for human-readable display
//! - Table output with aligned columns
//! - JSON output for machine processing
//! - Module list rendering for `modules list` and `modules discover`

mod json;
mod table;
mod text;

pub use json::JsonFormatter;
pub use table::TableFormatter;
pub use text::TextFormatter;

use crate::domain::{failure_count, success_count, total_duration, ExecutionResult, Module};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::str::FromStr;
use std::time::Duration;

/// Output format options
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// Aligned ASCII table
    Table,
    /// JSON output for machine processing
    Json,
}

impl OutputFormat {
    /// Lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Table => "table",
            OutputFormat::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!(
                "unknown output format '{}': expected text, table or json",
                other
            )),
        }
    }
}

/// Output verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Summary only
    Quiet,
    /// Per-module lines
    #[default]
    Normal,
    /// Per-module lines with marker paths
    Verbose,
}

impl Verbosity {
    /// Derives verbosity from the `--quiet` and `--verbose` flags
    pub fn from_flags(quiet: bool, verbose: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        }
    }
}

/// Configuration for output formatting
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub verbosity: Verbosity,
    /// Whether to use colors (text format only)
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            verbosity: Verbosity::default(),
            color: true,
        }
    }
}

impl OutputConfig {
    /// Create a new output configuration
    pub fn new(format: OutputFormat, verbosity: Verbosity, color: bool) -> Self {
        Self {
            format,
            verbosity,
            color: color && format == OutputFormat::Text,
        }
    }
}

/// Results of one operation run, as handed to a formatter
#[derive(Debug, Clone, Copy)]
pub struct Report<'a> {
    /// Operation name, e.g. `bump patch`
    pub operation: &'a str,
    /// Past-tense verb for the success footer
    pub action_verb: &'a str,
    /// Results in execution-context order
    pub results: &'a [ExecutionResult],
}

impl<'a> Report<'a> {
    /// Create a new report
    pub fn new(operation: &'a str, action_verb: &'a str, results: &'a [ExecutionResult]) -> Self {
        Self {
            operation,
            action_verb,
            results,
        }
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn success_count(&self) -> usize {
        success_count(self.results)
    }

    pub fn failure_count(&self) -> usize {
        failure_count(self.results)
    }

    /// Closing line shared by text and table output
    pub fn summary_line(&self) -> String {
        let total = self.total();
        let failed = self.failure_count();
        if failed == 0 {
            format!(
                "Success: {} module{} {} in {}",
                total,
                plural(total),
                self.action_verb,
                format_duration(total_duration(self.results))
            )
        } else {
            format!(
                "Completed: {} succeeded, {} failed",
                total - failed,
                failed
            )
        }
    }
}

/// Trait for output formatters
pub trait OutputFormatter {
    /// Format and write every result followed by the summary
    fn format_results(&self, report: &Report<'_>, writer: &mut dyn Write) -> std::io::Result<()>;

    /// Format and write just the summary
    fn format_summary(&self, report: &Report<'_>, writer: &mut dyn Write) -> std::io::Result<()>;

    /// Format and write a module list
    fn format_modules(&self, modules: &[Module], writer: &mut dyn Write) -> std::io::Result<()>;

    /// Results, or only the summary in quiet mode
    fn write_report(
        &self,
        report: &Report<'_>,
        verbosity: Verbosity,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        if verbosity == Verbosity::Quiet {
            self.format_summary(report, writer)
        } else {
            self.format_results(report, writer)
        }
    }
}

/// Create an output formatter based on configuration
pub fn create_formatter(config: &OutputConfig) -> Box<dyn OutputFormatter> {
    match config.format {
        OutputFormat::Text => Box::new(TextFormatter::with_color(config.verbosity, config.color)),
        OutputFormat::Table => Box::new(TableFormatter::new()),
        OutputFormat::Json => Box::new(JsonFormatter::new()),
    }
}

/// `µs` below a millisecond, `ms` below a second, otherwise seconds
pub fn format_duration(duration: Duration) -> String {
    if duration < Duration::from_millis(1) {
        format!("{}µs", duration.as_micros())
    } else if duration < Duration::from_secs(1) {
        format!("{}ms", duration.as_millis())
    } else {
        format!("{:.2}s", duration.as_secs_f64())
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}
