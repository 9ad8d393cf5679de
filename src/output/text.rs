//! Text output formatter for human-readable display
//!
//! This module provides:
//! - One ✓/✗ line per module, in execution order
//! - `old -> new` version changes with per-module timing
//! - A success or partial-failure footer
//! - Module listing for discovery commands

use crate::domain::{ExecutionResult, Module};
use crate::output::{format_duration, OutputFormatter, Report, Verbosity};
use colored::Colorize;
use std::io::Write;

/// Text formatter for human-readable output
pub struct TextFormatter {
    /// Verbosity level
    verbosity: Verbosity,
    /// Whether to use colors
    color: bool,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            color: true,
        }
    }

    /// Create a new text formatter with color option
    pub fn with_color(verbosity: Verbosity, color: bool) -> Self {
        Self { verbosity, color }
    }

    /// `: old -> new (time)`, `: version (time)` or ` (time)`
    fn version_info(result: &ExecutionResult) -> String {
        let duration = format_duration(result.duration);
        match &result.new_version {
            Some(new) if result.changed() => {
                format!(": {} -> {} ({})", result.old_version, new, duration)
            }
            Some(new) if !new.is_empty() => format!(": {} ({})", new, duration),
            _ => format!(" ({})", duration),
        }
    }

    fn path_suffix(&self, result: &ExecutionResult) -> String {
        if self.verbosity == Verbosity::Verbose {
            format!("  [{}]", result.module.relative_path.display())
        } else {
            String::new()
        }
    }

    fn write_result_line(
        &self,
        result: &ExecutionResult,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let path = self.path_suffix(result);
        match &result.error {
            None => {
                let info = Self::version_info(result);
                if self.color {
                    writeln!(
                        writer,
                        "  {} {}{}{}",
                        "✓".green().bold(),
                        result.module_name(),
                        info.dimmed(),
                        path.dimmed()
                    )
                } else {
                    writeln!(writer, "  ✓ {}{}{}", result.module_name(), info, path)
                }
            }
            Some(error) => {
                if self.color {
                    writeln!(
                        writer,
                        "  {} {}: {}{}",
                        "✗".red().bold(),
                        result.module_name(),
                        error.dimmed(),
                        path.dimmed()
                    )
                } else {
                    writeln!(writer, "  ✗ {}: {}{}", result.module_name(), error, path)
                }
            }
        }
    }

    fn write_summary_line(&self, report: &Report<'_>, writer: &mut dyn Write) -> std::io::Result<()> {
        let line = report.summary_line();
        if !self.color {
            return writeln!(writer, "{}", line);
        }
        if report.failure_count() == 0 {
            writeln!(writer, "{}", line.green())
        } else {
            writeln!(writer, "{}", line.yellow())
        }
    }
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self::new(Verbosity::Normal)
    }
}

impl OutputFormatter for TextFormatter {
    fn format_results(&self, report: &Report<'_>, writer: &mut dyn Write) -> std::io::Result<()> {
        if report.results.is_empty() {
            return writeln!(writer, "No results to display.");
        }

        for result in report.results {
            self.write_result_line(result, writer)?;
        }

        writeln!(writer)?;
        self.write_summary_line(report, writer)
    }

    fn format_summary(&self, report: &Report<'_>, writer: &mut dyn Write) -> std::io::Result<()> {
        self.write_summary_line(report, writer)
    }

    fn format_modules(&self, modules: &[Module], writer: &mut dyn Write) -> std::io::Result<()> {
        if modules.is_empty() {
            return writeln!(writer, "No modules found.");
        }

        let suffix = if modules.len() == 1 { "" } else { "s" };
        writeln!(writer, "Found {} module{}:", modules.len(), suffix)?;

        for module in modules {
            let version = if module.has_known_version() {
                format!(" ({})", module.current_version)
            } else {
                String::new()
            };
            let path = module.relative_path.display().to_string();
            if self.color {
                writeln!(
                    writer,
                    "  • {}{} - {}",
                    module.name.bold(),
                    version,
                    path.dimmed()
                )?;
            } else {
                writeln!(writer, "  • {}{} - {}", module.name, version, path)?;
            }
        }

        Ok(())
    }
}
