//! Runs an operation across the modules of an execution context
//!
//! This module provides:
//! - Sequential execution in context order
//! - Concurrent execution with one blocking worker per module, optionally
//!   bounded by a semaphore
//! - Fail-fast (stop starting new work) and continue-on-error policies
//! - Results always returned in context order, never completion order

use crate::domain::{ExecutionContext, ExecutionResult, Module};
use crate::error::ExecutorError;
use crate::operation::Operation;
use crate::progress::Progress;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::{self, JoinError, JoinSet};
use tracing::{debug, info, warn};

/// Executes one operation over many modules
pub struct Executor {
    operation: Arc<dyn Operation>,
    show_progress: bool,
}

impl Executor {
    /// Create an executor for `operation`
    pub fn new(operation: Arc<dyn Operation>) -> Self {
        Self {
            operation,
            show_progress: false,
        }
    }

    /// Draw a progress bar while running
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Runs the operation over `ctx.modules`.
    ///
    /// Per-module failures are reported in the results. An error is returned
    /// only for an empty context or when fail-fast stopped execution early;
    /// the latter carries the results of every attempted module.
    pub async fn run(&self, ctx: &ExecutionContext) -> Result<Vec<ExecutionResult>, ExecutorError> {
        if ctx.is_empty() {
            return Err(ExecutorError::NoModules);
        }

        let mut progress = Progress::new(self.show_progress);
        progress.start(ctx.len() as u64, &self.operation.name());

        let outcome = if ctx.options.parallel && ctx.len() > 1 {
            self.run_concurrent(ctx, &progress).await
        } else {
            self.run_sequential(ctx, &progress)
        };

        progress.finish_and_clear();
        outcome
    }

    fn run_sequential(
        &self,
        ctx: &ExecutionContext,
        progress: &Progress,
    ) -> Result<Vec<ExecutionResult>, ExecutorError> {
        let stop_on_failure = ctx.options.stop_on_failure();
        let total = ctx.len();
        let mut results = Vec::with_capacity(total);

        for module in &ctx.modules {
            progress.set_message(&module.name);
            let result = execute_one(self.operation.as_ref(), Arc::clone(module));
            progress.inc();

            let failed = !result.is_success();
            results.push(result);

            if failed && stop_on_failure {
                info!(module = %module.name, "stopping after failure");
                return Err(ExecutorError::Halted {
                    module: module.name.clone(),
                    attempted: results.len(),
                    total,
                    results,
                });
            }
        }

        Ok(results)
    }

    async fn run_concurrent(
        &self,
        ctx: &ExecutionContext,
        progress: &Progress,
    ) -> Result<Vec<ExecutionResult>, ExecutorError> {
        let stop_on_failure = ctx.options.stop_on_failure();
        let total = ctx.len();
        let limit = ctx.options.max_concurrency.unwrap_or(total).clamp(1, total);
        let semaphore = Arc::new(Semaphore::new(limit));
        let failed = Arc::new(AtomicBool::new(false));

        let mut workers = JoinSet::new();
        let mut slots: Vec<Option<ExecutionResult>> = (0..total).map(|_| None).collect();

        debug!(modules = total, workers = limit, "starting concurrent execution");

        for (index, module) in ctx.modules.iter().enumerate() {
            // A permit frees up only after its worker has recorded any failure
            let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
                break;
            };
            while let Some(joined) = workers.try_join_next() {
                record(&mut slots, joined, progress);
            }
            if stop_on_failure && failed.load(Ordering::SeqCst) {
                info!(
                    started = index,
                    total, "failure reported, not starting remaining modules"
                );
                break;
            }

            let operation = Arc::clone(&self.operation);
            let module = Arc::clone(module);
            let failed = Arc::clone(&failed);
            workers.spawn(async move {
                let worker_module = Arc::clone(&module);
                let started = Instant::now();
                let result =
                    task::spawn_blocking(move || execute_one(operation.as_ref(), worker_module))
                        .await
                        .unwrap_or_else(|e| {
                            ExecutionResult::failure(
                                Arc::clone(&module),
                                known_version(&module),
                                format!("worker failed: {}", e),
                                started.elapsed(),
                            )
                        });
                if !result.is_success() {
                    failed.store(true, Ordering::SeqCst);
                }
                drop(permit);
                (index, result)
            });
        }

        while let Some(joined) = workers.join_next().await {
            record(&mut slots, joined, progress);
        }

        let first_failure = ctx
            .modules
            .iter()
            .zip(&slots)
            .find(|(_, slot)| slot.as_ref().is_some_and(|r| !r.is_success()))
            .map(|(module, _)| module.name.clone());
        let results: Vec<ExecutionResult> = slots.into_iter().flatten().collect();

        match first_failure {
            Some(module) if stop_on_failure => Err(ExecutorError::Halted {
                module,
                attempted: results.len(),
                total,
                results,
            }),
            _ => Ok(results),
        }
    }
}

/// Stores a finished worker's result in its slot
fn record(
    slots: &mut [Option<ExecutionResult>],
    joined: Result<(usize, ExecutionResult), JoinError>,
    progress: &Progress,
) {
    match joined {
        Ok((index, result)) => {
            progress.inc();
            if let Some(slot) = slots.get_mut(index) {
                *slot = Some(result);
            }
        }
        Err(e) => warn!(error = %e, "worker task aborted"),
    }
}

/// Runs `operation` on one module and times it
fn execute_one(operation: &dyn Operation, module: Arc<Module>) -> ExecutionResult {
    let started = Instant::now();
    debug!(module = %module.name, operation = %operation.name(), "running");

    match operation.execute(&module) {
        Ok(transition) => {
            debug!(
                module = %module.name,
                from = %transition.old_version,
                to = %transition.new_version,
                "done"
            );
            ExecutionResult::success(
                module,
                transition.old_version,
                transition.new_version,
                started.elapsed(),
            )
        }
        Err(e) => {
            warn!(module = %module.name, error = %e, "operation failed");
            let old = known_version(&module);
            ExecutionResult::failure(module, old, e.to_string(), started.elapsed())
        }
    }
}

fn known_version(module: &Module) -> String {
    if module.has_known_version() {
        module.current_version.clone()
    } else {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ExecutionOptions;
    use crate::error::OperationError;
    use crate::operation::Transition;
    use std::collections::HashMap;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Test operation with per-module delays and failures
    #[derive(Default)]
    struct StubOperation {
        delays: HashMap<String, Duration>,
        failing: Vec<String>,
        started: Mutex<Vec<String>>,
        running: AtomicUsize,
        max_running: AtomicUsize,
    }

    impl StubOperation {
        fn new() -> Self {
            Self::default()
        }

        fn delay(mut self, name: &str, millis: u64) -> Self {
            self.delays
                .insert(name.to_string(), Duration::from_millis(millis));
            self
        }

        fn fail(mut self, name: &str) -> Self {
            self.failing.push(name.to_string());
            self
        }

        fn started(&self) -> Vec<String> {
            self.started.lock().unwrap().clone()
        }
    }

    impl Operation for StubOperation {
        fn name(&self) -> String {
            "stub".to_string()
        }

        fn action_verb(&self) -> &'static str {
            "stubbed"
        }

        fn execute(&self, module: &Module) -> Result<Transition, OperationError> {
            self.started.lock().unwrap().push(module.name.clone());
            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_running.fetch_max(now, Ordering::SeqCst);

            if let Some(delay) = self.delays.get(&module.name) {
                std::thread::sleep(*delay);
            }
            self.running.fetch_sub(1, Ordering::SeqCst);

            if self.failing.contains(&module.name) {
                return Err(OperationError::failed(format!("{} exploded", module.name)));
            }
            Ok(Transition::new("1.0.0", "1.0.1"))
        }
    }

    fn context(names: &[&str], options: ExecutionOptions) -> ExecutionContext {
        let modules = names
            .iter()
            .map(|n| Module::new(*n, format!("{}/.version", n)).with_current_version("1.0.0"))
            .collect();
        ExecutionContext::multi(modules, options)
    }

    fn result_names(results: &[ExecutionResult]) -> Vec<&str> {
        results.iter().map(|r| r.module_name()).collect()
    }

    #[tokio::test]
    async fn test_empty_context_is_an_error() {
        let executor = Executor::new(Arc::new(StubOperation::new()));
        let ctx = context(&[], ExecutionOptions::default());
        let err = executor.run(&ctx).await.unwrap_err();
        assert!(matches!(err, ExecutorError::NoModules));
    }

    #[tokio::test]
    async fn test_sequential_runs_in_order() {
        let op = Arc::new(StubOperation::new());
        let executor = Executor::new(op.clone());
        let ctx = context(&["a", "b", "c"], ExecutionOptions::default());

        let results = executor.run(&ctx).await.unwrap();
        assert_eq!(result_names(&results), vec!["a", "b", "c"]);
        assert_eq!(op.started(), vec!["a", "b", "c"]);
        assert!(results.iter().all(|r| r.is_success()));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_order_matches_sequential() {
        let names = ["a", "b", "c", "d", "e"];
        let make_op = || {
            StubOperation::new()
                .delay("a", 120)
                .delay("b", 80)
                .delay("c", 40)
                .delay("d", 10)
                .fail("c")
        };

        let sequential = Executor::new(Arc::new(make_op()))
            .run(&context(&names, ExecutionOptions::new(false, false, true)))
            .await
            .unwrap();
        let concurrent = Executor::new(Arc::new(make_op()))
            .run(&context(&names, ExecutionOptions::new(true, false, true)))
            .await
            .unwrap();

        assert_eq!(result_names(&sequential), names.to_vec());
        assert_eq!(result_names(&concurrent), names.to_vec());
        let outcomes = |rs: &[ExecutionResult]| rs.iter().map(|r| r.is_success()).collect::<Vec<_>>();
        assert_eq!(outcomes(&sequential), outcomes(&concurrent));
    }

    #[tokio::test]
    async fn test_sequential_fail_fast_returns_prefix() {
        let op = Arc::new(StubOperation::new().fail("b"));
        let executor = Executor::new(op.clone());
        let ctx = context(&["a", "b", "c"], ExecutionOptions::new(false, true, false));

        let err = executor.run(&ctx).await.unwrap_err();
        assert!(matches!(err, ExecutorError::Halted { ref module, .. } if module == "b"));
        let results = err.into_partial_results();
        assert_eq!(result_names(&results), vec!["a", "b"]);
        assert!(results[0].is_success());
        assert!(!results[1].is_success());
        assert_eq!(op.started(), vec!["a", "b"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_bounded_concurrent_fail_fast_starts_nothing_new() {
        let op = Arc::new(StubOperation::new().fail("b"));
        let executor = Executor::new(op.clone());
        let options = ExecutionOptions::new(true, true, false).with_max_concurrency(Some(1));
        let ctx = context(&["a", "b", "c"], options);

        let err = executor.run(&ctx).await.unwrap_err();
        let results = err.into_partial_results();
        assert_eq!(result_names(&results), vec!["a", "b"]);
        assert!(!op.started().contains(&"c".to_string()));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_fail_fast_lets_running_workers_finish() {
        let op = Arc::new(StubOperation::new().delay("a", 100).fail("b"));
        let executor = Executor::new(op.clone());
        let ctx = context(&["a", "b"], ExecutionOptions::new(true, true, false));

        let err = executor.run(&ctx).await.unwrap_err();
        let results = err.into_partial_results();
        assert_eq!(result_names(&results), vec!["a", "b"]);
        assert!(results[0].is_success());
    }

    #[tokio::test]
    async fn test_continue_on_error_attempts_everything() {
        let op = Arc::new(StubOperation::new().fail("b"));
        let executor = Executor::new(op.clone());
        // continue-on-error wins over fail-fast
        let ctx = context(&["a", "b", "c"], ExecutionOptions::new(false, true, true));

        let results = executor.run(&ctx).await.unwrap();
        assert_eq!(results.len(), 3);
        assert!(results[0].is_success());
        assert!(!results[1].is_success());
        assert!(results[2].is_success());
        assert_eq!(results[1].error.as_deref(), Some("b exploded"));
        assert_eq!(results[1].old_version, "1.0.0");
        assert!(results[1].new_version.is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_continue_on_error_is_complete() {
        let op = Arc::new(StubOperation::new().delay("a", 50).fail("b"));
        let executor = Executor::new(op);
        let ctx = context(&["a", "b", "c"], ExecutionOptions::new(true, false, true));

        let results = executor.run(&ctx).await.unwrap();
        assert_eq!(result_names(&results), vec!["a", "b", "c"]);
        assert!(!results[1].is_success());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_max_concurrency_bounds_workers() {
        let op = Arc::new(
            StubOperation::new()
                .delay("a", 30)
                .delay("b", 30)
                .delay("c", 30)
                .delay("d", 30),
        );
        let executor = Executor::new(op.clone());
        let options = ExecutionOptions::new(true, false, true).with_max_concurrency(Some(2));
        let ctx = context(&["a", "b", "c", "d"], options);

        let results = executor.run(&ctx).await.unwrap();
        assert_eq!(results.len(), 4);
        assert!(op.max_running.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_failure_without_known_version_has_empty_old_version() {
        let executor = Executor::new(Arc::new(StubOperation::new().fail("x")));
        let ctx = ExecutionContext::multi(
            vec![Module::new("x", "x/.version")],
            ExecutionOptions::new(false, false, true),
        );

        let results = executor.run(&ctx).await.unwrap();
        assert_eq!(results[0].old_version, "");
    }

    #[tokio::test]
    async fn test_overflowing_version_is_a_module_failure() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut modules = Vec::new();
        for (name, version) in [("a", "1.0.0"), ("b", "1.2.18446744073709551615"), ("c", "2.0.0")] {
            let module_dir = dir.path().join(name);
            std::fs::create_dir_all(&module_dir).unwrap();
            std::fs::write(module_dir.join(".version"), format!("{}\n", version)).unwrap();
            modules.push(Module::from_marker_path(module_dir.join(".version")));
        }
        let ctx = ExecutionContext::multi(modules, ExecutionOptions::new(false, true, true));
        let op = crate::operation::VersionOperation::pre_release("beta", false).unwrap();

        let results = Executor::new(Arc::new(op)).run(&ctx).await.unwrap();

        assert_eq!(result_names(&results), vec!["a", "b", "c"]);
        assert!(results[0].is_success());
        assert!(!results[1].is_success());
        assert!(results[1].error.as_deref().unwrap().contains("patch"));
        assert_eq!(results[2].new_version.as_deref(), Some("2.0.1-beta"));
    }
}
