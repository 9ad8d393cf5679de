//! Version operations applied to a single module
//!
//! This module provides:
//! - The `Operation` trait the executor runs against each module
//! - `VersionOperation`, the closed set of built-in operations
//! - Marker file I/O shared by all operations

mod marker;

pub use marker::{VersionFile, INITIAL_VERSION};

use crate::domain::version::{validate_label, validate_metadata};
use crate::domain::{BumpKind, Module, SemVersion};
use crate::error::{OperationError, VersionError};
use std::fmt;

/// Version change produced by one operation on one module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// Version before the operation, empty if there was none
    pub old_version: String,
    /// Version after the operation (equal to `old_version` for read-only operations)
    pub new_version: String,
}

impl Transition {
    /// Creates a new Transition
    pub fn new(old_version: impl Into<String>, new_version: impl Into<String>) -> Self {
        Self {
            old_version: old_version.into(),
            new_version: new_version.into(),
        }
    }

    /// Transition for operations that leave the version untouched
    pub fn unchanged(version: impl Into<String>) -> Self {
        let version = version.into();
        Self {
            old_version: version.clone(),
            new_version: version,
        }
    }
}

/// An operation applied to one module's marker file.
///
/// Implementations know nothing about other modules or about concurrency;
/// the executor owns ordering and failure policy.
pub trait Operation: Send + Sync {
    /// Short name, e.g. `bump patch`
    fn name(&self) -> String;

    /// Past-tense verb used in summaries, e.g. `bumped`
    fn action_verb(&self) -> &'static str;

    /// Reads the current version, computes the next one and writes it
    fn execute(&self, module: &Module) -> Result<Transition, OperationError>;
}

/// Built-in operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionOperation {
    /// Semantic bump with optional pre-release and build metadata
    Bump {
        kind: BumpKind,
        pre_release: Option<String>,
        metadata: Option<String>,
        /// Keep existing build metadata when `metadata` is not given
        preserve_metadata: bool,
    },
    /// Set a pre-release label without a counter
    SetPreRelease { label: String },
    /// Increment the counter scoped to a pre-release label
    IncrementPreRelease { label: String },
    /// Write an explicit version
    Set { version: SemVersion },
    /// Report the current version
    Show,
    /// Check the current version against strict SemVer
    Validate,
}

impl VersionOperation {
    /// Creates a bump, validating the label and metadata up front
    pub fn bump(
        kind: BumpKind,
        pre_release: Option<String>,
        metadata: Option<String>,
        preserve_metadata: bool,
    ) -> Result<Self, VersionError> {
        if let Some(label) = &pre_release {
            validate_label(label)?;
        }
        if let Some(meta) = &metadata {
            validate_metadata(meta)?;
        }
        Ok(VersionOperation::Bump {
            kind,
            pre_release,
            metadata,
            preserve_metadata,
        })
    }

    /// Creates a pre-release operation; `increment` selects the counter variant
    pub fn pre_release(label: &str, increment: bool) -> Result<Self, VersionError> {
        let label = label.trim();
        validate_label(label)?;
        let label = label.to_string();
        Ok(if increment {
            VersionOperation::IncrementPreRelease { label }
        } else {
            VersionOperation::SetPreRelease { label }
        })
    }

    /// Creates a set operation from a version string plus optional overrides
    pub fn set(
        version: &str,
        pre_release: Option<&str>,
        metadata: Option<&str>,
    ) -> Result<Self, VersionError> {
        let mut version = SemVersion::parse(version)?;
        if let Some(label) = pre_release {
            validate_label(label)?;
            version.pre_release = label.to_string();
        }
        if let Some(meta) = metadata {
            validate_metadata(meta)?;
            version.build = meta.to_string();
        }
        Ok(VersionOperation::Set { version })
    }

    /// Returns true for operations that never write the marker
    pub fn is_read_only(&self) -> bool {
        matches!(self, VersionOperation::Show | VersionOperation::Validate)
    }

    /// Computes the next version from the current one
    pub fn next_version(&self, current: &SemVersion) -> Result<SemVersion, VersionError> {
        let next = match self {
            VersionOperation::Bump {
                kind,
                pre_release,
                metadata,
                preserve_metadata,
            } => {
                let mut next = current.bump(*kind)?;
                if let Some(label) = pre_release {
                    next.pre_release = label.clone();
                }
                match metadata {
                    Some(meta) => next.build = meta.clone(),
                    None if *preserve_metadata => next.build = current.build.clone(),
                    None => {}
                }
                next
            }
            VersionOperation::SetPreRelease { label } => current.set_pre_release(label)?,
            VersionOperation::IncrementPreRelease { label } => {
                current.increment_pre_release(label)?
            }
            VersionOperation::Set { version } => version.clone(),
            VersionOperation::Show | VersionOperation::Validate => current.clone(),
        };
        Ok(next)
    }
}

impl fmt::Display for VersionOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionOperation::Bump { kind, .. } => write!(f, "bump {}", kind),
            VersionOperation::SetPreRelease { label } => write!(f, "pre {}", label),
            VersionOperation::IncrementPreRelease { label } => write!(f, "pre {} --inc", label),
            VersionOperation::Set { version } => write!(f, "set {}", version),
            VersionOperation::Show => write!(f, "show"),
            VersionOperation::Validate => write!(f, "validate"),
        }
    }
}

impl Operation for VersionOperation {
    fn name(&self) -> String {
        self.to_string()
    }

    fn action_verb(&self) -> &'static str {
        match self {
            VersionOperation::Bump { .. } => "bumped",
            VersionOperation::SetPreRelease { .. }
            | VersionOperation::IncrementPreRelease { .. } => "updated",
            VersionOperation::Set { .. } => "set",
            VersionOperation::Show => "read",
            VersionOperation::Validate => "validated",
        }
    }

    fn execute(&self, module: &Module) -> Result<Transition, OperationError> {
        let path = module.version_path.as_path();

        match self {
            VersionOperation::Validate => {
                let raw = VersionFile::read_raw(path)?;
                SemVersion::validate_strict(&raw)?;
                Ok(Transition::unchanged(raw))
            }
            VersionOperation::Show => {
                let current = VersionFile::read(path)?;
                Ok(Transition::unchanged(current.to_string()))
            }
            VersionOperation::Set { version } => {
                // The previous content may be missing or garbage; it is replaced either way
                let old = VersionFile::peek(path).unwrap_or_default();
                VersionFile::write(path, version)?;
                Ok(Transition::new(old, version.to_string()))
            }
            _ => {
                let current = VersionFile::read(path)?;
                let next = self.next_version(&current)?;
                VersionFile::write(path, &next)?;
                Ok(Transition::new(current.to_string(), next.to_string()))
            }
        }
    }
}
