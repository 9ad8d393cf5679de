//! Version-managed module type

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Shown when a module's marker could not be read during discovery
pub const UNKNOWN_VERSION: &str = "unknown";

/// One independently versioned unit: a directory holding a marker file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Module {
    /// Identifier, the containing directory's basename
    pub name: String,
    /// Path to the marker file
    pub version_path: PathBuf,
    /// Marker path relative to the discovery root, for display
    pub relative_path: PathBuf,
    /// Version read at discovery time, or [`UNKNOWN_VERSION`]
    pub current_version: String,
    /// Disabled modules are listed but never operated on
    pub enabled: bool,
}

impl Module {
    /// Creates an enabled module whose version has not been read yet
    pub fn new(name: impl Into<String>, version_path: impl Into<PathBuf>) -> Self {
        let version_path = version_path.into();
        Self {
            name: name.into(),
            relative_path: version_path.clone(),
            version_path,
            current_version: UNKNOWN_VERSION.to_string(),
            enabled: true,
        }
    }

    /// Creates a module named after the directory holding `version_path`
    pub fn from_marker_path(version_path: impl Into<PathBuf>) -> Self {
        let version_path = version_path.into();
        let name = module_name_for(&version_path);
        Self::new(name, version_path)
    }

    /// Sets the display path relative to the discovery root
    pub fn with_relative_path(mut self, relative_path: impl Into<PathBuf>) -> Self {
        self.relative_path = relative_path.into();
        self
    }

    /// Sets the version read at discovery time
    pub fn with_current_version(mut self, version: impl Into<String>) -> Self {
        self.current_version = version.into();
        self
    }

    /// Sets the enabled flag
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Directory containing the marker file
    pub fn dir(&self) -> &Path {
        self.version_path.parent().unwrap_or_else(|| Path::new("."))
    }

    /// Directory containing the marker, relative to the discovery root
    pub fn relative_dir(&self) -> &Path {
        self.relative_path.parent().unwrap_or_else(|| Path::new(""))
    }

    /// Returns true if the version could be read at discovery time
    pub fn has_known_version(&self) -> bool {
        self.current_version != UNKNOWN_VERSION
    }

    /// `name (version)`, or just the name if the version is unknown
    pub fn display_name(&self) -> String {
        if self.has_known_version() {
            format!("{} ({})", self.name, self.current_version)
        } else {
            self.name.clone()
        }
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

/// Basename of the marker's directory; falls back to the path itself
/// when the marker sits at a filesystem root or a bare relative name.
pub fn module_name_for(version_path: &Path) -> String {
    version_path
        .parent()
        .and_then(|dir| dir.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| version_path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_from_marker_path() {
        let module = Module::from_marker_path("/repo/services/api/.version");
        assert_eq!(module.name, "api");
        assert_eq!(module.dir(), Path::new("/repo/services/api"));
        assert!(module.enabled);
        assert!(!module.has_known_version());
    }

    #[test]
    fn test_module_builder() {
        let module = Module::new("auth", "/repo/services/auth/.version")
            .with_relative_path("services/auth/.version")
            .with_current_version("2.0.0")
            .with_enabled(false);

        assert_eq!(module.relative_path, PathBuf::from("services/auth/.version"));
        assert_eq!(module.relative_dir(), Path::new("services/auth"));
        assert_eq!(module.current_version, "2.0.0");
        assert!(!module.enabled);
    }

    #[test]
    fn test_display_name() {
        let module = Module::new("api", "api/.version");
        assert_eq!(module.display_name(), "api");

        let module = module.with_current_version("1.0.0");
        assert_eq!(module.display_name(), "api (1.0.0)");
        assert_eq!(module.to_string(), "api (1.0.0)");
    }

    #[test]
    fn test_module_name_for_bare_file() {
        assert_eq!(module_name_for(Path::new(".version")), ".version");
    }
}
