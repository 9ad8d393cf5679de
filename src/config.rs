//! `.monover.toml` configuration
//!
//! The configuration is loaded once per invocation and handed to discovery
//! and resolution as a plain value. A missing file yields defaults.

use crate::error::ConfigError;
use crate::output::OutputFormat;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration file name looked up in the discovery root
pub const CONFIG_FILENAME: &str = ".monover.toml";

/// Marker file name
pub const DEFAULT_MARKER: &str = ".version";

/// Default traversal depth for recursive discovery
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Directory names never descended into
pub const DEFAULT_EXCLUDE_PATTERNS: &[&str] = &[
    "node_modules",
    ".git",
    "vendor",
    "tmp",
    "build",
    "dist",
    ".cache",
    "__pycache__",
    "target",
];

/// Complete monover configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Marker path used in single-module mode, relative to the root
    #[serde(default = "default_marker_path")]
    pub path: PathBuf,

    #[serde(default)]
    pub workspace: WorkspaceConfig,

    #[serde(default)]
    pub execution: ExecutionConfig,
}

fn default_marker_path() -> PathBuf {
    PathBuf::from(DEFAULT_MARKER)
}

fn default_true() -> bool {
    true
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

/// Multi-module settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkspaceConfig {
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Explicit module list; overrides discovery when non-empty
    #[serde(default)]
    pub modules: Vec<ModuleConfig>,
}

/// Discovery settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiscoveryConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Descend past the first level
    #[serde(default = "default_true")]
    pub recursive: bool,

    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Extra exclusion patterns, unioned with [`DEFAULT_EXCLUDE_PATTERNS`]
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            recursive: true,
            max_depth: DEFAULT_MAX_DEPTH,
            exclude: Vec::new(),
        }
    }
}

/// An explicitly configured module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleConfig {
    pub name: String,
    /// Marker path, relative to the root unless absolute
    pub path: PathBuf,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Execution defaults, overridable from the command line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExecutionConfig {
    #[serde(default)]
    pub parallel: bool,

    #[serde(default = "default_true")]
    pub fail_fast: bool,

    #[serde(default)]
    pub continue_on_error: bool,

    #[serde(default)]
    pub format: OutputFormat,

    /// Upper bound on concurrent workers
    #[serde(default)]
    pub jobs: Option<usize>,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            parallel: false,
            fail_fast: true,
            continue_on_error: false,
            format: OutputFormat::default(),
            jobs: None,
        }
    }
}

impl Config {
    /// Loads `.monover.toml` from `root`, or defaults if it does not exist
    pub fn load_from_dir(root: &Path) -> Result<Self, ConfigError> {
        let path = root.join(CONFIG_FILENAME);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default_config());
        }
        Self::load(&path)
    }

    /// Loads and validates a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&content).map_err(|e| match e {
            ConfigError::TomlParseError { message, .. } => ConfigError::TomlParseError {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Parses and validates TOML content
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config =
            toml::from_str(content).map_err(|e| ConfigError::TomlParseError {
                path: PathBuf::from(CONFIG_FILENAME),
                message: e.message().to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Configuration used when no file is present
    pub fn default_config() -> Self {
        Self {
            path: default_marker_path(),
            ..Self::default()
        }
    }

    /// Checks values serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.path.as_os_str().is_empty() {
            return Err(ConfigError::invalid_value("path", "must not be empty"));
        }

        let discovery = &self.workspace.discovery;
        if discovery.max_depth == 0 {
            return Err(ConfigError::invalid_value(
                "workspace.discovery.max_depth",
                "must be at least 1",
            ));
        }
        if let Some(pattern) = discovery.exclude.iter().find(|p| p.trim().is_empty()) {
            return Err(ConfigError::invalid_value(
                "workspace.discovery.exclude",
                format!("empty pattern '{}'", pattern),
            ));
        }

        let mut seen = HashSet::new();
        for module in &self.workspace.modules {
            if module.name.trim().is_empty() {
                return Err(ConfigError::invalid_value(
                    "workspace.modules.name",
                    "must not be empty",
                ));
            }
            if module.path.as_os_str().is_empty() {
                return Err(ConfigError::invalid_value(
                    format!("workspace.modules.{}.path", module.name),
                    "must not be empty",
                ));
            }
            if !seen.insert(module.name.as_str()) {
                return Err(ConfigError::invalid_value(
                    "workspace.modules.name",
                    format!("duplicate module name '{}'", module.name),
                ));
            }
        }

        if self.execution.jobs == Some(0) {
            return Err(ConfigError::invalid_value(
                "execution.jobs",
                "must be at least 1",
            ));
        }

        Ok(())
    }

    /// Returns true if modules are explicitly configured
    pub fn has_explicit_modules(&self) -> bool {
        !self.workspace.modules.is_empty()
    }

    /// Default exclusions unioned with configured ones, without duplicates
    pub fn exclude_patterns(&self) -> Vec<String> {
        let mut patterns: Vec<String> = DEFAULT_EXCLUDE_PATTERNS
            .iter()
            .map(|p| p.to_string())
            .collect();
        for pattern in &self.workspace.discovery.exclude {
            if !patterns.contains(pattern) {
                patterns.push(pattern.clone());
            }
        }
        patterns
    }

    /// Returns true if `path` differs from the default marker name
    pub fn has_custom_path(&self) -> bool {
        self.path != Path::new(DEFAULT_MARKER)
    }
}
