//! Per-module execution outcome and summary helpers

use super::Module;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Outcome of running an operation against one module
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// The module this result belongs to (shared, read-only)
    pub module: Arc<Module>,
    /// Version before the operation, empty if it could not be read
    pub old_version: String,
    /// Version after the operation; `None` when the module failed
    pub new_version: Option<String>,
    /// Present iff the module failed
    pub error: Option<String>,
    /// Wall time spent on this module
    pub duration: Duration,
}

impl ExecutionResult {
    /// Creates a successful result
    pub fn success(
        module: Arc<Module>,
        old_version: impl Into<String>,
        new_version: impl Into<String>,
        duration: Duration,
    ) -> Self {
        Self {
            module,
            old_version: old_version.into(),
            new_version: Some(new_version.into()),
            error: None,
            duration,
        }
    }

    /// Creates a failed result
    pub fn failure(
        module: Arc<Module>,
        old_version: impl Into<String>,
        error: impl Into<String>,
        duration: Duration,
    ) -> Self {
        Self {
            module,
            old_version: old_version.into(),
            new_version: None,
            error: Some(error.into()),
            duration,
        }
    }

    /// Returns true if the module succeeded
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Module name
    pub fn module_name(&self) -> &str {
        &self.module.name
    }

    /// Returns true if the operation changed the version
    pub fn changed(&self) -> bool {
        match &self.new_version {
            Some(new) => !self.old_version.is_empty() && *new != self.old_version,
            None => false,
        }
    }

    /// `old -> new` when the version changed, otherwise the new version
    pub fn version_display(&self) -> String {
        match &self.new_version {
            Some(new) if self.changed() => format!("{} -> {}", self.old_version, new),
            Some(new) => new.clone(),
            None => self.old_version.clone(),
        }
    }
}

impl fmt::Display for ExecutionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error {
            None => write!(f, "{}: {}", self.module.name, self.version_display()),
            Some(err) => write!(f, "{}: failed ({})", self.module.name, err),
        }
    }
}

/// Number of successful results
pub fn success_count(results: &[ExecutionResult]) -> usize {
    results.iter().filter(|r| r.is_success()).count()
}

/// Number of failed results
pub fn failure_count(results: &[ExecutionResult]) -> usize {
    results.iter().filter(|r| !r.is_success()).count()
}

/// Returns true if any module failed
pub fn has_failures(results: &[ExecutionResult]) -> bool {
    results.iter().any(|r| !r.is_success())
}

/// Sum of per-module durations
pub fn total_duration(results: &[ExecutionResult]) -> Duration {
    results.iter().map(|r| r.duration).sum()
}
