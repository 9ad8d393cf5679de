//! Workspace module sources
//!
//! This module provides:
//! - Directory discovery of `.version` markers
//! - Exclusion patterns and `.monoverignore` handling
//! - Loading explicitly configured modules

mod discovery;
mod ignore;

pub use discovery::{discover_modules, Discovery};
pub use ignore::{parse_ignore_content, IgnoreMatcher, IGNORE_FILENAME};

use crate::config::Config;
use crate::domain::{Module, UNKNOWN_VERSION};
use crate::error::{AppError, ResolveError};
use crate::operation::VersionFile;
use std::path::Path;

/// Modules declared in `[[workspace.modules]]`
#[derive(Debug, Clone, Default)]
pub struct ConfiguredModules {
    /// Enabled modules in configuration order
    pub enabled: Vec<Module>,
    /// Names of disabled modules
    pub disabled: Vec<String>,
}

impl ConfiguredModules {
    /// Returns true if nothing is configured at all
    pub fn is_empty(&self) -> bool {
        self.enabled.is_empty() && self.disabled.is_empty()
    }
}

/// Builds the configured module list.
///
/// Paths are resolved against `root` unless absolute. An enabled module
/// whose marker does not exist is an error; disabled modules are only
/// reported by name.
pub fn load_configured_modules(
    root: &Path,
    config: &Config,
) -> Result<ConfiguredModules, ResolveError> {
    let mut result = ConfiguredModules::default();

    for entry in &config.workspace.modules {
        if !entry.enabled {
            result.disabled.push(entry.name.clone());
            continue;
        }

        let version_path = if entry.path.is_absolute() {
            entry.path.clone()
        } else {
            root.join(&entry.path)
        };
        if !version_path.is_file() {
            return Err(ResolveError::MissingMarker {
                name: entry.name.clone(),
                path: version_path,
            });
        }

        let relative = version_path
            .strip_prefix(root)
            .unwrap_or(&version_path)
            .to_path_buf();
        let version =
            VersionFile::peek(&version_path).unwrap_or_else(|| UNKNOWN_VERSION.to_string());

        result.enabled.push(
            Module::new(entry.name.clone(), version_path)
                .with_relative_path(relative)
                .with_current_version(version),
        );
    }

    Ok(result)
}

/// Lists the workspace modules.
///
/// Configured modules win unless `discover` is set; otherwise the root is
/// walked for markers.
pub fn workspace_modules(
    root: &Path,
    config: &Config,
    discover: bool,
) -> Result<Vec<Module>, AppError> {
    if !discover && config.has_explicit_modules() {
        return Ok(load_configured_modules(root, config)?.enabled);
    }
    Ok(Discovery::new(root, config)?.discover()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_load_configured_modules() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("svc/api")).unwrap();
        fs::write(dir.path().join("svc/api/.version"), "1.0.0\n").unwrap();

        let config = Config::parse(
            r#"
[[workspace.modules]]
name = "gateway"
path = "svc/api/.version"

[[workspace.modules]]
name = "legacy"
path = "legacy/.version"
enabled = false
"#,
        )
        .unwrap();

        let configured = load_configured_modules(dir.path(), &config).unwrap();
        assert_eq!(configured.enabled.len(), 1);
        assert_eq!(configured.enabled[0].name, "gateway");
        assert_eq!(configured.enabled[0].current_version, "1.0.0");
        assert_eq!(
            configured.enabled[0].relative_path,
            PathBuf::from("svc/api/.version")
        );
        assert_eq!(configured.disabled, vec!["legacy"]);
    }

    #[test]
    fn test_configured_module_missing_marker() {
        let dir = TempDir::new().unwrap();
        let config = Config::parse(
            "[[workspace.modules]]\nname = \"api\"\npath = \"api/.version\"\n",
        )
        .unwrap();

        let err = load_configured_modules(dir.path(), &config).unwrap_err();
        assert!(matches!(err, ResolveError::MissingMarker { ref name, .. } if name == "api"));
    }

    #[test]
    fn test_no_configured_modules() {
        let dir = TempDir::new().unwrap();
        let configured = load_configured_modules(dir.path(), &Config::default_config()).unwrap();
        assert!(configured.is_empty());
    }

    #[test]
    fn test_workspace_modules_prefers_configuration() {
        let dir = TempDir::new().unwrap();
        for name in ["api", "web"] {
            fs::create_dir_all(dir.path().join(name)).unwrap();
            fs::write(dir.path().join(name).join(".version"), "0.1.0\n").unwrap();
        }
        let config =
            Config::parse("[[workspace.modules]]\nname = \"web\"\npath = \"web/.version\"\n")
                .unwrap();

        let listed = workspace_modules(dir.path(), &config, false).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "web");

        let discovered = workspace_modules(dir.path(), &config, true).unwrap();
        let names: Vec<&str> = discovered.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["api", "web"]);
    }

    #[test]
    fn test_workspace_modules_errors() {
        let dir = TempDir::new().unwrap();
        let config = Config::parse(
            "[[workspace.modules]]\nname = \"api\"\npath = \"api/.version\"\n",
        )
        .unwrap();
        let err = workspace_modules(dir.path(), &config, false).unwrap_err();
        assert!(matches!(err, AppError::Resolve(ResolveError::MissingMarker { .. })));

        let missing = dir.path().join("missing");
        let err = workspace_modules(&missing, &Config::default_config(), true).unwrap_err();
        assert!(matches!(err, AppError::Discovery(_)));
    }
}
