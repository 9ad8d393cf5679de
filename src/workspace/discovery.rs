//! Module discovery by walking the directory tree for marker files
//!
//! Features:
//! - Lexically ordered, depth-bounded traversal
//! - Exclusion by directory name or root-relative glob
//! - Unreadable subdirectories are skipped; only the root is required
//! - Best-effort version reads with an "unknown" fallback

use super::ignore::IgnoreMatcher;
use crate::config::{Config, DiscoveryConfig, DEFAULT_MARKER};
use crate::domain::{Module, UNKNOWN_VERSION};
use crate::error::DiscoveryError;
use crate::operation::VersionFile;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Walks a discovery root looking for module markers
#[derive(Debug, Clone)]
pub struct Discovery {
    root: PathBuf,
    settings: DiscoveryConfig,
    matcher: IgnoreMatcher,
    marker: String,
}

impl Discovery {
    /// Creates a discovery pass from configuration.
    ///
    /// Exclusions are the built-in defaults, the configured patterns and
    /// the contents of `.monoverignore`.
    pub fn new(root: impl Into<PathBuf>, config: &Config) -> Result<Self, DiscoveryError> {
        let root = root.into();
        let matcher = IgnoreMatcher::new(&config.exclude_patterns()).with_ignore_file(&root)?;
        Ok(Self {
            root,
            settings: config.workspace.discovery.clone(),
            matcher,
            marker: DEFAULT_MARKER.to_string(),
        })
    }

    /// Discovery root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns discovered modules in traversal order
    pub fn discover(&self) -> Result<Vec<Module>, DiscoveryError> {
        self.check_root()?;

        if !self.settings.enabled {
            debug!("discovery disabled in configuration");
            return Ok(Vec::new());
        }

        let root_entries = read_sorted(&self.root).map_err(|source| DiscoveryError::Unreadable {
            path: self.root.clone(),
            source,
        })?;

        let mut modules = Vec::new();
        // The root's own marker is the project version, never a module
        for (name, path, is_dir) in root_entries {
            if is_dir {
                self.scan(&path, &name, 1, &mut modules);
            }
        }

        warn_duplicates(&modules);
        debug!(root = %self.root.display(), count = modules.len(), "discovery finished");
        Ok(modules)
    }

    fn check_root(&self) -> Result<(), DiscoveryError> {
        match fs::metadata(&self.root) {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(DiscoveryError::NotADirectory {
                path: self.root.clone(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(DiscoveryError::RootNotFound {
                    path: self.root.clone(),
                })
            }
            Err(source) => Err(DiscoveryError::Unreadable {
                path: self.root.clone(),
                source,
            }),
        }
    }

    /// Scans `dir`, which sits `depth` levels below the root
    fn scan(&self, dir: &Path, name: &str, depth: usize, modules: &mut Vec<Module>) {
        let relative = dir.strip_prefix(&self.root).unwrap_or(dir);
        if self.matcher.is_excluded(name, relative) {
            debug!(dir = %relative.display(), "excluded");
            return;
        }
        if depth > self.settings.max_depth {
            return;
        }

        let entries = match read_sorted(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "skipping unreadable directory");
                return;
            }
        };

        let mut subdirs = Vec::new();
        for (entry_name, path, is_dir) in entries {
            if is_dir {
                subdirs.push((entry_name, path));
            } else if entry_name == self.marker {
                modules.push(self.module_for(&path));
            }
        }

        if self.settings.recursive {
            for (sub_name, sub_path) in subdirs {
                self.scan(&sub_path, &sub_name, depth + 1, modules);
            }
        }
    }

    fn module_for(&self, marker: &Path) -> Module {
        let relative = marker.strip_prefix(&self.root).unwrap_or(marker);
        let version = VersionFile::peek(marker).unwrap_or_else(|| UNKNOWN_VERSION.to_string());
        debug!(module = %relative.display(), version = %version, "found module");
        Module::from_marker_path(marker)
            .with_relative_path(relative)
            .with_current_version(version)
    }
}

/// Discovers modules under `root` with the given configuration
pub fn discover_modules(root: &Path, config: &Config) -> Result<Vec<Module>, DiscoveryError> {
    Discovery::new(root, config)?.discover()
}

/// Entries of `dir` as `(name, path, is_dir)`, sorted by name.
///
/// Symlinks are reported as non-directories so traversal never follows them.
fn read_sorted(dir: &Path) -> std::io::Result<Vec<(String, PathBuf, bool)>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!(dir = %dir.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        entries.push((
            entry.file_name().to_string_lossy().into_owned(),
            entry.path(),
            is_dir,
        ));
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(entries)
}

fn warn_duplicates(modules: &[Module]) {
    let mut seen: HashMap<&str, &Path> = HashMap::new();
    for module in modules {
        if let Some(first) = seen.insert(module.name.as_str(), &module.relative_path) {
            warn!(
                module = %module.name,
                first = %first.display(),
                second = %module.relative_path.display(),
                "duplicate module name"
            );
        }
    }
}
