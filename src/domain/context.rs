//! Resolved execution context for one command invocation

use super::Module;
use crate::output::OutputFormat;
use std::fmt;
use std::sync::Arc;

/// Whether a command acts on one marker or on a set of modules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    Single,
    Multi,
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionMode::Single => write!(f, "single"),
            ExecutionMode::Multi => write!(f, "multi"),
        }
    }
}

/// Execution and output options
///
/// Built through [`ExecutionOptions::new`], which settles the failure
/// policy once: continue-on-error suppresses fail-fast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOptions {
    pub parallel: bool,
    fail_fast: bool,
    continue_on_error: bool,
    pub format: OutputFormat,
    pub quiet: bool,
    /// Upper bound on concurrent workers; `None` means one per module
    pub max_concurrency: Option<usize>,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self::new(false, true, false)
    }
}

impl ExecutionOptions {
    /// Creates options, resolving fail-fast against continue-on-error
    pub fn new(parallel: bool, fail_fast: bool, continue_on_error: bool) -> Self {
        Self {
            parallel,
            fail_fast: fail_fast && !continue_on_error,
            continue_on_error,
            format: OutputFormat::default(),
            quiet: false,
            max_concurrency: None,
        }
    }

    /// Sets the output format
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets quiet mode
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Bounds the number of concurrent workers (0 is treated as 1)
    pub fn with_max_concurrency(mut self, max: Option<usize>) -> Self {
        self.max_concurrency = max.map(|n| n.max(1));
        self
    }

    /// Effective fail-fast flag
    pub fn fail_fast(&self) -> bool {
        self.fail_fast
    }

    /// Continue-on-error flag as requested
    pub fn continue_on_error(&self) -> bool {
        self.continue_on_error
    }

    /// The only failure-policy bit the executor consults
    pub fn stop_on_failure(&self) -> bool {
        self.fail_fast
    }
}

/// Modules to act on plus how to act on them; immutable once built
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pub mode: ExecutionMode,
    pub modules: Vec<Arc<Module>>,
    pub options: ExecutionOptions,
    /// Names of configured modules left out because they are disabled
    pub disabled: Vec<String>,
}

impl ExecutionContext {
    /// Single-module context
    pub fn single(module: Module, options: ExecutionOptions) -> Self {
        Self {
            mode: ExecutionMode::Single,
            modules: vec![Arc::new(module)],
            options,
            disabled: Vec::new(),
        }
    }

    /// Multi-module context, preserving the given order
    pub fn multi(modules: Vec<Module>, options: ExecutionOptions) -> Self {
        Self {
            mode: ExecutionMode::Multi,
            modules: modules.into_iter().map(Arc::new).collect(),
            options,
            disabled: Vec::new(),
        }
    }

    /// Records disabled module names for diagnostics
    pub fn with_disabled(mut self, disabled: Vec<String>) -> Self {
        self.disabled = disabled;
        self
    }

    /// Returns true in single mode
    pub fn is_single(&self) -> bool {
        self.mode == ExecutionMode::Single
    }

    /// Number of modules to act on
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Returns true if there is nothing to act on
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Module names in execution order
    pub fn module_names(&self) -> Vec<&str> {
        self.modules.iter().map(|m| m.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_continue_on_error_suppresses_fail_fast() {
        let options = ExecutionOptions::new(false, true, true);
        assert!(!options.fail_fast());
        assert!(options.continue_on_error());
        assert!(!options.stop_on_failure());
    }

    #[test]
    fn test_fail_fast_alone() {
        let options = ExecutionOptions::new(true, true, false);
        assert!(options.stop_on_failure());
        assert!(options.parallel);
    }

    #[test]
    fn test_default_options() {
        let options = ExecutionOptions::default();
        assert!(!options.parallel);
        assert!(options.stop_on_failure());
        assert_eq!(options.format, OutputFormat::Text);
        assert!(!options.quiet);
        assert_eq!(options.max_concurrency, None);
    }

    #[test]
    fn test_max_concurrency_floor() {
        let options = ExecutionOptions::default().with_max_concurrency(Some(0));
        assert_eq!(options.max_concurrency, Some(1));
    }

    #[test]
    fn test_context_constructors() {
        let single = ExecutionContext::single(
            Module::new("root", ".version"),
            ExecutionOptions::default(),
        );
        assert!(single.is_single());
        assert_eq!(single.len(), 1);

        let multi = ExecutionContext::multi(
            vec![Module::new("a", "a/.version"), Module::new("b", "b/.version")],
            ExecutionOptions::default(),
        )
        .with_disabled(vec!["c".to_string()]);
        assert_eq!(multi.mode, ExecutionMode::Multi);
        assert_eq!(multi.module_names(), vec!["a", "b"]);
        assert_eq!(multi.disabled, vec!["c"]);
    }
}
