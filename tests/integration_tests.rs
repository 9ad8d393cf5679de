//! Integration tests for monover
//!
//! These tests verify:
//! - Discovery, resolution and execution over a real directory tree
//! - Version files are rewritten in place and results keep context order
//! - Fail-fast and continue-on-error policies
//! - Configured modules and ignore files

use monover::config::Config;
use monover::domain::{BumpKind, ExecutionOptions};
use monover::error::{ExecutorError, ResolveError};
use monover::executor::Executor;
use monover::operation::VersionOperation;
use monover::resolver::{AutoSelectAll, Resolver, Selection};
use monover::workspace::discover_modules;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Test fixture directory creation helper
fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

fn write_marker(root: &Path, dir: &str, version: &str) {
    let dir = root.join(dir);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(".version"), format!("{}\n", version)).unwrap();
}

fn read_marker(root: &Path, dir: &str) -> String {
    fs::read_to_string(root.join(dir).join(".version"))
        .unwrap()
        .trim()
        .to_string()
}

/// services/api 1.0.0, services/auth 2.0.0-alpha.1
fn services_workspace() -> TempDir {
    let temp_dir = create_test_dir();
    write_marker(temp_dir.path(), "services/api", "1.0.0");
    write_marker(temp_dir.path(), "services/auth", "2.0.0-alpha.1");
    temp_dir
}

mod discovery {
    use super::*;

    #[test]
    fn test_discovers_nested_modules_in_order() {
        let temp_dir = services_workspace();
        write_marker(temp_dir.path(), "apps/web", "0.3.0");

        let modules = discover_modules(temp_dir.path(), &Config::default_config()).unwrap();
        let names: Vec<&str> = modules.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["web", "api", "auth"]);
        assert_eq!(modules[1].current_version, "1.0.0");
        assert_eq!(
            modules[1].relative_path,
            Path::new("services/api/.version")
        );
    }

    #[test]
    fn test_excluded_directories_never_appear() {
        let temp_dir = services_workspace();
        write_marker(temp_dir.path(), "node_modules/left-pad", "1.3.0");
        write_marker(temp_dir.path(), "services/api/target/debug", "9.9.9");
        write_marker(temp_dir.path(), "fixtures/sample", "0.0.1");
        fs::write(temp_dir.path().join(".monoverignore"), "# test data\nfixtures\n").unwrap();

        let modules = discover_modules(temp_dir.path(), &Config::default_config()).unwrap();
        let names: Vec<&str> = modules.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["api", "auth"]);
    }

    #[test]
    fn test_root_marker_is_not_a_module() {
        let temp_dir = services_workspace();
        fs::write(temp_dir.path().join(".version"), "5.0.0\n").unwrap();

        let modules = discover_modules(temp_dir.path(), &Config::default_config()).unwrap();
        assert_eq!(modules.len(), 2);
        assert!(modules.iter().all(|m| m.relative_path != Path::new(".version")));
    }
}

mod execution {
    use super::*;

    async fn run_all(
        root: &Path,
        operation: VersionOperation,
        options: ExecutionOptions,
    ) -> Result<Vec<monover::ExecutionResult>, ExecutorError> {
        let config = Config::default_config();
        let ctx = Resolver::new(root, &config)
            .resolve(Selection::All, options, None)
            .unwrap();
        Executor::new(Arc::new(operation)).run(&ctx).await
    }

    #[tokio::test]
    async fn test_pre_release_across_workspace() {
        let temp_dir = services_workspace();
        let operation = VersionOperation::pre_release("beta", false).unwrap();

        let results = run_all(temp_dir.path(), operation, ExecutionOptions::default())
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].module_name(), "api");
        assert_eq!(results[0].old_version, "1.0.0");
        assert_eq!(results[0].new_version.as_deref(), Some("1.0.1-beta"));
        assert_eq!(results[1].module_name(), "auth");
        assert_eq!(results[1].old_version, "2.0.0-alpha.1");
        assert_eq!(results[1].new_version.as_deref(), Some("2.0.0-beta"));

        assert_eq!(read_marker(temp_dir.path(), "services/api"), "1.0.1-beta");
        assert_eq!(read_marker(temp_dir.path(), "services/auth"), "2.0.0-beta");
    }

    #[tokio::test]
    async fn test_parallel_results_keep_context_order() {
        let temp_dir = create_test_dir();
        for name in ["a", "b", "c", "d", "e", "f"] {
            write_marker(temp_dir.path(), name, "1.0.0");
        }
        let operation = VersionOperation::bump(BumpKind::Minor, None, None, false).unwrap();
        let options = ExecutionOptions::new(true, true, false).with_max_concurrency(Some(3));

        let results = run_all(temp_dir.path(), operation, options).await.unwrap();

        let names: Vec<&str> = results.iter().map(|r| r.module_name()).collect();
        assert_eq!(names, vec!["a", "b", "c", "d", "e", "f"]);
        assert!(results.iter().all(|r| r.new_version.as_deref() == Some("1.1.0")));
    }

    #[tokio::test]
    async fn test_fail_fast_stops_after_first_failure() {
        let temp_dir = create_test_dir();
        write_marker(temp_dir.path(), "a", "1.0.0");
        write_marker(temp_dir.path(), "b", "not-a-version");
        write_marker(temp_dir.path(), "c", "1.0.0");
        let operation = VersionOperation::bump(BumpKind::Patch, None, None, false).unwrap();

        let err = run_all(temp_dir.path(), operation, ExecutionOptions::default())
            .await
            .unwrap_err();

        match err {
            ExecutorError::Halted {
                module, results, ..
            } => {
                assert_eq!(module, "b");
                let names: Vec<&str> = results.iter().map(|r| r.module_name()).collect();
                assert_eq!(names, vec!["a", "b"]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(read_marker(temp_dir.path(), "a"), "1.0.1");
        assert_eq!(read_marker(temp_dir.path(), "c"), "1.0.0");
    }

    #[tokio::test]
    async fn test_continue_on_error_runs_everything() {
        let temp_dir = create_test_dir();
        write_marker(temp_dir.path(), "a", "1.0.0");
        write_marker(temp_dir.path(), "b", "not-a-version");
        write_marker(temp_dir.path(), "c", "1.0.0");
        let operation = VersionOperation::bump(BumpKind::Patch, None, None, false).unwrap();

        let results = run_all(
            temp_dir.path(),
            operation,
            ExecutionOptions::new(true, true, true),
        )
        .await
        .unwrap();

        assert_eq!(results.len(), 3);
        assert!(results[0].is_success());
        assert!(!results[1].is_success());
        assert!(results[2].is_success());
        assert_eq!(read_marker(temp_dir.path(), "c"), "1.0.1");
    }

    #[tokio::test]
    async fn test_show_is_read_only() {
        let temp_dir = services_workspace();
        let results = run_all(
            temp_dir.path(),
            VersionOperation::Show,
            ExecutionOptions::default(),
        )
        .await
        .unwrap();

        assert_eq!(results[1].new_version.as_deref(), Some("2.0.0-alpha.1"));
        assert_eq!(read_marker(temp_dir.path(), "services/auth"), "2.0.0-alpha.1");
    }
}

mod resolution {
    use super::*;

    #[test]
    fn test_auto_with_root_marker_is_single() {
        let temp_dir = services_workspace();
        fs::write(temp_dir.path().join(".version"), "3.0.0\n").unwrap();
        let config = Config::default_config();

        let ctx = Resolver::new(temp_dir.path(), &config)
            .resolve(Selection::Auto, ExecutionOptions::default(), Some(&AutoSelectAll))
            .unwrap();

        assert!(ctx.is_single());
        assert_eq!(ctx.modules[0].current_version, "3.0.0");
    }

    #[test]
    fn test_auto_with_several_modules_asks_prompt() {
        let temp_dir = services_workspace();
        let config = Config::default_config();

        let ctx = Resolver::new(temp_dir.path(), &config)
            .resolve(Selection::Auto, ExecutionOptions::default(), Some(&AutoSelectAll))
            .unwrap();

        assert!(!ctx.is_single());
        assert_eq!(ctx.module_names(), vec!["api", "auth"]);
    }

    #[test]
    fn test_unknown_module_name_is_rejected() {
        let temp_dir = services_workspace();
        let config = Config::default_config();

        let err = Resolver::new(temp_dir.path(), &config)
            .resolve(
                Selection::named(["api,billing"]),
                ExecutionOptions::default(),
                None,
            )
            .unwrap_err();

        assert!(matches!(err, ResolveError::ModuleNotFound { ref name } if name == "billing"));
    }

    #[test]
    fn test_configured_modules_override_discovery() {
        let temp_dir = services_workspace();
        write_marker(temp_dir.path(), "apps/web", "0.3.0");
        let config = Config::parse(
            r#"
[[workspace.modules]]
name = "auth"
path = "services/auth/.version"

[[workspace.modules]]
name = "web"
path = "apps/web/.version"
enabled = false
"#,
        )
        .unwrap();

        let ctx = Resolver::new(temp_dir.path(), &config)
            .resolve(Selection::All, ExecutionOptions::default(), None)
            .unwrap();

        assert_eq!(ctx.module_names(), vec!["auth"]);
        assert_eq!(ctx.disabled, vec!["web".to_string()]);
    }

    #[test]
    fn test_pattern_selection() {
        let temp_dir = services_workspace();
        write_marker(temp_dir.path(), "apps/web", "0.3.0");
        let config = Config::default_config();

        let ctx = Resolver::new(temp_dir.path(), &config)
            .resolve(
                Selection::Pattern("services/*".to_string()),
                ExecutionOptions::default(),
                None,
            )
            .unwrap();

        assert_eq!(ctx.module_names(), vec!["api", "auth"]);
    }
}
