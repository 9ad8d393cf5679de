//! Version marker file reading and writing
//!
//! This module provides:
//! - Reading and parsing a marker file into a [`SemVersion`]
//! - Atomic writes (temp file in the same directory, then rename)
//! - Initialization of a missing marker with [`INITIAL_VERSION`]

use crate::domain::SemVersion;
use crate::error::MarkerError;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Version written when a missing marker is initialized
pub const INITIAL_VERSION: &str = "0.1.0";

/// Marker file operations
pub struct VersionFile;

impl VersionFile {
    /// Reads the raw, trimmed contents of a marker file
    pub fn read_raw(path: &Path) -> Result<String, MarkerError> {
        let content =
            fs::read_to_string(path).map_err(|e| MarkerError::read_error(path, e))?;
        Ok(content.trim().to_string())
    }

    /// Reads and parses a marker file
    pub fn read(path: &Path) -> Result<SemVersion, MarkerError> {
        let raw = Self::read_raw(path)?;
        SemVersion::parse(&raw).map_err(|e| MarkerError::parse(path, e))
    }

    /// Writes `version` followed by a newline, replacing the file atomically
    pub fn write(path: &Path, version: &SemVersion) -> Result<(), MarkerError> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut temp =
            NamedTempFile::new_in(dir).map_err(|e| MarkerError::write_error(path, e))?;
        writeln!(temp, "{}", version).map_err(|e| MarkerError::write_error(path, e))?;
        temp.as_file()
            .sync_all()
            .map_err(|e| MarkerError::write_error(path, e))?;
        temp.persist(path)
            .map_err(|e| MarkerError::write_error(path, e.error))?;

        tracing::debug!(path = %path.display(), version = %version, "wrote version file");
        Ok(())
    }

    /// Creates the marker with [`INITIAL_VERSION`] if it does not exist.
    ///
    /// Returns true if a file was created.
    pub fn initialize(path: &Path) -> Result<bool, MarkerError> {
        if path.exists() {
            return Ok(false);
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| MarkerError::write_error(path, e))?;
        }
        let version = SemVersion::new(0, 1, 0);
        Self::write(path, &version)?;
        tracing::info!(path = %path.display(), "initialized version file");
        Ok(true)
    }

    /// Best-effort read used by discovery; `None` when the file is missing,
    /// unreadable or empty.
    pub fn peek(path: &Path) -> Option<String> {
        match Self::read_raw(path) {
            Ok(raw) if !raw.is_empty() => Some(raw),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "could not read version");
                None
            }
        }
    }
}
