//! JSON output formatter for machine processing
//!
//! This module provides:
//! - JSON serialization of execution results in context order
//! - Success/failure counters for scripting
//! - JSON module lists

use crate::domain::{total_duration, ExecutionResult, Module};
use crate::output::{OutputFormatter, Report};
use serde::Serialize;
use std::io::Write;

/// JSON formatter for machine-readable output
#[derive(Debug, Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new() -> Self {
        Self
    }
}

/// JSON representation of a full run
#[derive(Serialize)]
struct JsonOutput<'a> {
    operation: &'a str,
    results: Vec<JsonResult<'a>>,
    #[serde(flatten)]
    summary: JsonSummary<'a>,
}

/// JSON representation of the counters
#[derive(Serialize)]
struct JsonSummary<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    operation: Option<&'a str>,
    total: usize,
    success_count: usize,
    failure_count: usize,
    total_duration_ms: u64,
}

/// JSON representation of one module's result
#[derive(Serialize)]
struct JsonResult<'a> {
    module: &'a str,
    path: String,
    #[serde(skip_serializing_if = "is_blank")]
    old_version: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    new_version: Option<&'a str>,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    duration_ms: u64,
}

/// JSON representation of a module list
#[derive(Serialize)]
struct JsonModules<'a> {
    modules: Vec<JsonModule<'a>>,
    total: usize,
}

#[derive(Serialize)]
struct JsonModule<'a> {
    name: &'a str,
    path: String,
    relative_path: String,
    current_version: &'a str,
    enabled: bool,
}

impl<'a> JsonResult<'a> {
    fn from_result(result: &'a ExecutionResult) -> Self {
        Self {
            module: result.module_name(),
            path: result.module.relative_path.display().to_string(),
            old_version: &result.old_version,
            new_version: result.new_version.as_deref(),
            success: result.is_success(),
            error: result.error.as_deref(),
            duration_ms: millis(result.duration),
        }
    }
}

fn summary<'a>(report: &Report<'a>, operation: Option<&'a str>) -> JsonSummary<'a> {
    JsonSummary {
        operation,
        total: report.total(),
        success_count: report.success_count(),
        failure_count: report.failure_count(),
        total_duration_ms: millis(total_duration(report.results)),
    }
}

fn is_blank(value: &&str) -> bool {
    value.is_empty()
}

fn millis(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn write_json<T: Serialize>(value: &T, writer: &mut dyn Write) -> std::io::Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(std::io::Error::other)?;
    writeln!(writer, "{}", json)
}

impl OutputFormatter for JsonFormatter {
    fn format_results(&self, report: &Report<'_>, writer: &mut dyn Write) -> std::io::Result<()> {
        let output = JsonOutput {
            operation: report.operation,
            results: report.results.iter().map(JsonResult::from_result).collect(),
            summary: summary(report, None),
        };
        write_json(&output, writer)
    }

    fn format_summary(&self, report: &Report<'_>, writer: &mut dyn Write) -> std::io::Result<()> {
        write_json(&summary(report, Some(report.operation)), writer)
    }

    fn format_modules(&self, modules: &[Module], writer: &mut dyn Write) -> std::io::Result<()> {
        let output = JsonModules {
            modules: modules
                .iter()
                .map(|m| JsonModule {
                    name: &m.name,
                    path: m.version_path.display().to_string(),
                    relative_path: m.relative_path.display().to_string(),
                    current_version: &m.current_version,
                    enabled: m.enabled,
                })
                .collect(),
            total: modules.len(),
        };
        write_json(&output, writer)
    }
}
