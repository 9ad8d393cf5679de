//! Application error types using thiserror
//!
//! Error hierarchy:
//! - VersionError: Version string parsing and validation problems
//! - MarkerError: Reading or writing a `.version` marker file
//! - OperationError: A version operation failed for one module
//! - DiscoveryError: Walking the discovery root failed before it started
//! - ResolveError: Turning a module selection into concrete modules
//! - ExecutorError: Early termination or an empty module list
//! - ConfigError: Loading `.monover.toml`

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::ExecutionResult;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Version string related errors
    #[error(transparent)]
    Version(#[from] VersionError),

    /// Marker file related errors
    #[error(transparent)]
    Marker(#[from] MarkerError),

    /// Module discovery errors
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    /// Module selection errors
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Executor errors
    #[error(transparent)]
    Executor(#[from] ExecutorError),

    /// Configuration related errors
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors related to version strings
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    /// The string is not a `major.minor.patch[-pre][+build]` version
    #[error("invalid version format: '{input}'")]
    InvalidFormat { input: String },

    /// The string exceeds the maximum accepted length
    #[error("version string exceeds maximum length of {max} characters")]
    TooLong { max: usize },

    /// A numeric component does not fit in u64
    #[error("invalid {component} version '{value}'")]
    InvalidComponent {
        component: &'static str,
        value: String,
    },

    /// The version parses leniently but is not strict SemVer 2.0
    #[error("'{input}' is not a valid semantic version: {message}")]
    NotStrict { input: String, message: String },

    /// Pre-release label contains characters outside `[0-9A-Za-z-.]`
    #[error("invalid pre-release label '{label}'")]
    InvalidLabel { label: String },

    /// Build metadata contains characters outside `[0-9A-Za-z-.]`
    #[error("invalid build metadata '{metadata}'")]
    InvalidMetadata { metadata: String },

    /// Incrementing a component would exceed u64
    #[error("cannot increment {component}: value is already at its maximum")]
    Overflow { component: &'static str },

    /// Unknown bump kind
    #[error("invalid bump kind '{value}': expected 'patch', 'minor', 'major', 'release' or 'auto'")]
    InvalidBumpKind { value: String },
}

/// Errors related to marker file operations
#[derive(Error, Debug)]
pub enum MarkerError {
    /// Marker file not found
    #[error("version file not found: {path}")]
    NotFound { path: PathBuf },

    /// Failed to read marker file
    #[error("failed to read version file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write marker file
    #[error("failed to write version file {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Marker content is not a version
    #[error("invalid version in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: VersionError,
    },
}

/// Errors that abort discovery
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// Discovery root does not exist
    #[error("discovery root not found: {path}")]
    RootNotFound { path: PathBuf },

    /// Discovery root is a file
    #[error("discovery root is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// Discovery root cannot be listed
    #[error("cannot read discovery root {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Ignore file exists but cannot be read
    #[error("failed to read ignore file {path}: {source}")]
    IgnoreFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors related to module selection
#[derive(Error, Debug)]
pub enum ResolveError {
    /// A requested module name matched nothing
    #[error("module '{name}' not found")]
    ModuleNotFound { name: String },

    /// Selection resolved to an empty module list
    #[error("no modules found in workspace")]
    NoModules,

    /// Pattern matched nothing
    #[error("no modules found matching pattern: {pattern}")]
    NoPatternMatch { pattern: String },

    /// Pattern is not a valid glob
    #[error("invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// Configured module points at a missing marker file
    #[error("module {name}: version file not found at {path}")]
    MissingMarker { name: String, path: PathBuf },

    /// The interactive selection was cancelled
    #[error("operation canceled by user")]
    Cancelled,

    /// The interactive selection failed
    #[error("module selection failed: {message}")]
    Prompt { message: String },

    /// Discovery failed while resolving
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
}

/// Per-module operation failures, captured into an execution result
#[derive(Error, Debug)]
pub enum OperationError {
    /// Marker file could not be read or written
    #[error(transparent)]
    Marker(#[from] MarkerError),

    /// Current or computed version is invalid
    #[error(transparent)]
    Version(#[from] VersionError),

    /// Any other failure reported by an operation
    #[error("{message}")]
    Failed { message: String },
}

impl OperationError {
    /// Creates a generic failure
    pub fn failed(message: impl Into<String>) -> Self {
        OperationError::Failed {
            message: message.into(),
        }
    }
}

/// Executor-level errors
///
/// Per-module failures never surface here; they live in
/// [`ExecutionResult::error`].
#[derive(Error, Debug)]
pub enum ExecutorError {
    /// Nothing to run
    #[error("no modules to operate on")]
    NoModules,

    /// Fail-fast stopped execution; `results` holds every module that was attempted
    #[error("execution stopped after module '{module}' failed ({attempted} of {total} attempted)")]
    Halted {
        module: String,
        attempted: usize,
        total: usize,
        results: Vec<ExecutionResult>,
    },
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error
    #[error("failed to parse TOML in {path}: {message}")]
    TomlParseError { path: PathBuf, message: String },

    /// A value fails validation
    #[error("invalid configuration value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// Conflicting options
    #[error("conflicting options: {message}")]
    ConflictingOptions { message: String },
}

impl MarkerError {
    /// Creates a new NotFound error
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        MarkerError::NotFound { path: path.into() }
    }

    /// Creates a ReadError, mapping `NotFound` IO errors to [`MarkerError::NotFound`]
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            return MarkerError::NotFound { path };
        }
        MarkerError::ReadError { path, source }
    }

    /// Creates a new WriteError
    pub fn write_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MarkerError::WriteError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new Parse error
    pub fn parse(path: impl Into<PathBuf>, source: VersionError) -> Self {
        MarkerError::Parse {
            path: path.into(),
            source,
        }
    }

    /// Returns true if the marker file does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, MarkerError::NotFound { .. })
    }
}

impl ConfigError {
    /// Creates a new InvalidValue error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl ExecutorError {
    /// Results gathered before the executor stopped
    pub fn partial_results(&self) -> &[ExecutionResult] {
        match self {
            ExecutorError::NoModules => &[],
            ExecutorError::Halted { results, .. } => results,
        }
    }

    /// Consumes the error, returning the gathered results
    pub fn into_partial_results(self) -> Vec<ExecutionResult> {
        match self {
            ExecutorError::NoModules => Vec::new(),
            ExecutorError::Halted { results, .. } => results,
        }
    }
}
