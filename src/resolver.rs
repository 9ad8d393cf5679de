//! Execution context resolution
//!
//! This module provides:
//! - `Selection`: what the user asked to operate on
//! - `ModulePrompt`: optional capability consulted when no selection was given
//! - `resolve`: the pure selection logic over candidate module lists
//! - `Resolver`: loads candidates (configured or discovered) and resolves

use crate::config::Config;
use crate::domain::{
    module_name_for, ExecutionContext, ExecutionOptions, Module, UNKNOWN_VERSION,
};
use crate::error::ResolveError;
use crate::operation::VersionFile;
use crate::workspace::{load_configured_modules, ConfiguredModules, Discovery};
use glob::Pattern;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Which modules a command should act on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// One marker file; `None` uses the configured default path
    Single { path: Option<PathBuf> },
    /// Every enabled module
    All,
    /// Modules whose name equals one of these
    Named(Vec<String>),
    /// Modules whose directory, name or marker path matches a glob
    Pattern(String),
    /// Decide from what exists on disk, asking the prompt if needed
    Auto,
}

impl Selection {
    /// Builds a `Named` selection, splitting comma-separated values.
    ///
    /// Names are trimmed; empty and repeated names are dropped.
    pub fn named<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut names = Vec::new();
        for value in values {
            for name in value.as_ref().split(',').map(str::trim) {
                if !name.is_empty() && seen.insert(name.to_string()) {
                    names.push(name.to_string());
                }
            }
        }
        Selection::Named(names)
    }

    /// Returns true if the selection targets more than one marker
    pub fn is_multi(&self) -> bool {
        matches!(
            self,
            Selection::All | Selection::Named(_) | Selection::Pattern(_)
        )
    }
}

/// Answer from a [`ModulePrompt`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptDecision {
    All,
    Subset(Vec<String>),
    Cancel,
}

/// Asks someone which modules to act on.
///
/// Only consulted for [`Selection::Auto`] when several modules exist.
pub trait ModulePrompt {
    fn choose(&self, modules: &[Module]) -> Result<PromptDecision, ResolveError>;
}

/// Prompt that always selects every module
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoSelectAll;

impl ModulePrompt for AutoSelectAll {
    fn choose(&self, _modules: &[Module]) -> Result<PromptDecision, ResolveError> {
        Ok(PromptDecision::All)
    }
}

/// Resolution input besides the candidate lists
#[derive(Debug, Clone)]
pub struct ResolveRequest {
    pub selection: Selection,
    pub options: ExecutionOptions,
    /// Marker used for single mode when the selection does not name one
    pub default_path: PathBuf,
}

impl ResolveRequest {
    /// Creates a new ResolveRequest
    pub fn new(
        selection: Selection,
        options: ExecutionOptions,
        default_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            selection,
            options,
            default_path: default_path.into(),
        }
    }
}

/// Resolves a request against candidate modules.
///
/// Configured modules take priority over discovered ones whenever any are
/// configured. `discovered` is only consulted in that other case.
pub fn resolve(
    request: &ResolveRequest,
    discovered: Vec<Module>,
    configured: ConfiguredModules,
    prompt: Option<&dyn ModulePrompt>,
) -> Result<ExecutionContext, ResolveError> {
    let options = request.options.clone();
    let (candidates, disabled) = if configured.is_empty() {
        (discovered, Vec::new())
    } else {
        (configured.enabled, configured.disabled)
    };

    let selected = match &request.selection {
        Selection::Single { path } => {
            let path = path.as_deref().unwrap_or(&request.default_path);
            return Ok(ExecutionContext::single(single_module(path), options));
        }
        Selection::All => select_all(candidates)?,
        Selection::Named(names) => select_named(candidates, names)?,
        Selection::Pattern(pattern) => select_pattern(candidates, pattern)?,
        Selection::Auto => match candidates.len() {
            0 => {
                return Ok(ExecutionContext::single(
                    single_module(&request.default_path),
                    options,
                ))
            }
            1 => {
                let module = candidates.into_iter().next().ok_or(ResolveError::NoModules)?;
                return Ok(ExecutionContext::single(module, options));
            }
            _ => match prompt {
                None => {
                    debug!("several modules found but no prompt available, using default path");
                    return Ok(ExecutionContext::single(
                        single_module(&request.default_path),
                        options,
                    ));
                }
                Some(prompt) => match prompt.choose(&candidates)? {
                    PromptDecision::All => candidates,
                    PromptDecision::Subset(names) => select_named(candidates, &names)?,
                    PromptDecision::Cancel => return Err(ResolveError::Cancelled),
                },
            },
        },
    };

    if !disabled.is_empty() {
        debug!(disabled = ?disabled, "disabled modules left out");
    }
    Ok(ExecutionContext::multi(selected, options).with_disabled(disabled))
}

fn select_all(candidates: Vec<Module>) -> Result<Vec<Module>, ResolveError> {
    if candidates.is_empty() {
        return Err(ResolveError::NoModules);
    }
    Ok(candidates)
}

fn select_named(candidates: Vec<Module>, names: &[String]) -> Result<Vec<Module>, ResolveError> {
    if names.is_empty() {
        return Err(ResolveError::NoModules);
    }
    if let Some(missing) = names
        .iter()
        .find(|name| !candidates.iter().any(|m| &m.name == *name))
    {
        return Err(ResolveError::ModuleNotFound {
            name: missing.clone(),
        });
    }
    Ok(candidates
        .into_iter()
        .filter(|m| names.contains(&m.name))
        .collect())
}

fn select_pattern(candidates: Vec<Module>, pattern: &str) -> Result<Vec<Module>, ResolveError> {
    let glob = Pattern::new(pattern).map_err(|e| ResolveError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })?;

    let selected: Vec<Module> = candidates
        .into_iter()
        .filter(|m| {
            glob.matches(&m.name)
                || glob.matches_path(m.relative_dir())
                || glob.matches_path(&m.relative_path)
        })
        .collect();

    if selected.is_empty() {
        return Err(ResolveError::NoPatternMatch {
            pattern: pattern.to_string(),
        });
    }
    Ok(selected)
}

/// Builds the single-mode module for `path`, named after its directory
fn single_module(path: &Path) -> Module {
    let name = path
        .parent()
        .map(|dir| if dir.as_os_str().is_empty() { Path::new(".") } else { dir })
        .and_then(|dir| fs::canonicalize(dir).ok())
        .and_then(|dir| dir.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| module_name_for(path));
    let version = VersionFile::peek(path).unwrap_or_else(|| UNKNOWN_VERSION.to_string());
    let relative = path.file_name().map(PathBuf::from).unwrap_or_else(|| path.to_path_buf());

    Module::new(name, path)
        .with_relative_path(relative)
        .with_current_version(version)
}

/// Loads candidates for a root and resolves requests against them
pub struct Resolver<'a> {
    root: PathBuf,
    config: &'a Config,
}

impl<'a> Resolver<'a> {
    /// Creates a new Resolver
    pub fn new(root: impl Into<PathBuf>, config: &'a Config) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    /// Default single-mode marker, resolved against the root
    pub fn default_path(&self) -> PathBuf {
        self.under_root(&self.config.path)
    }

    /// Relative paths are taken from the root, not the working directory
    fn under_root(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Resolves `selection` into an execution context.
    ///
    /// Discovery only runs when the selection needs candidates and no
    /// modules are configured.
    pub fn resolve(
        &self,
        selection: Selection,
        options: ExecutionOptions,
        prompt: Option<&dyn ModulePrompt>,
    ) -> Result<ExecutionContext, ResolveError> {
        let selection = match selection {
            Selection::Auto if self.default_path().is_file() => {
                debug!(path = %self.default_path().display(), "root marker present, single mode");
                Selection::Single { path: None }
            }
            Selection::Single { path: Some(path) } => Selection::Single {
                path: Some(self.under_root(&path)),
            },
            other => other,
        };
        let request = ResolveRequest::new(selection, options, self.default_path());

        if let Selection::Single { .. } = request.selection {
            return resolve(&request, Vec::new(), ConfiguredModules::default(), prompt);
        }

        let configured = load_configured_modules(&self.root, self.config)?;
        let discovered = if configured.is_empty() {
            Discovery::new(&self.root, self.config)?.discover()?
        } else {
            Vec::new()
        };
        resolve(&request, discovered, configured, prompt)
    }
}
