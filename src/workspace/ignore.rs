//! Directory exclusion patterns and `.monoverignore`

use crate::error::DiscoveryError;
use glob::Pattern;
use std::fs;
use std::io;
use std::path::Path;
use tracing::warn;

/// Ignore file read from the discovery root
pub const IGNORE_FILENAME: &str = ".monoverignore";

/// One exclusion rule
#[derive(Debug, Clone)]
struct Rule {
    raw: String,
    pattern: Option<Pattern>,
    /// Rules containing `/` are matched against the root-relative path
    anchored: bool,
}

impl Rule {
    fn new(raw: &str) -> Self {
        let trimmed = raw.trim().trim_end_matches('/');
        let pattern = match Pattern::new(trimmed) {
            Ok(pattern) => Some(pattern),
            Err(e) => {
                warn!(pattern = trimmed, error = %e, "invalid exclude pattern, matching literally");
                None
            }
        };
        Self {
            raw: trimmed.to_string(),
            pattern,
            anchored: trimmed.contains('/'),
        }
    }

    fn matches_str(&self, candidate: &str) -> bool {
        match &self.pattern {
            Some(pattern) => pattern.matches(candidate),
            None => self.raw == candidate,
        }
    }

    fn matches(&self, name: &str, relative: &str) -> bool {
        if self.anchored {
            self.matches_str(relative) || relative.starts_with(&format!("{}/", self.raw))
        } else {
            self.matches_str(name)
        }
    }
}

/// Matches directories against a set of exclusion patterns
#[derive(Debug, Clone, Default)]
pub struct IgnoreMatcher {
    rules: Vec<Rule>,
}

impl IgnoreMatcher {
    /// Creates a matcher from glob patterns
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Self {
        let rules = patterns
            .iter()
            .map(|p| p.as_ref())
            .filter(|p| !p.trim().is_empty())
            .map(Rule::new)
            .collect();
        Self { rules }
    }

    /// Adds the patterns from `.monoverignore` in `root`, if present
    pub fn with_ignore_file(mut self, root: &Path) -> Result<Self, DiscoveryError> {
        let path = root.join(IGNORE_FILENAME);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(self),
            Err(source) => return Err(DiscoveryError::IgnoreFile { path, source }),
        };
        self.rules
            .extend(parse_ignore_content(&content).iter().map(|p| Rule::new(p)));
        Ok(self)
    }

    /// Returns true if the directory `name`, at `relative` below the root, is excluded
    pub fn is_excluded(&self, name: &str, relative: &Path) -> bool {
        let relative = relative.to_string_lossy().replace('\\', "/");
        self.rules.iter().any(|rule| rule.matches(name, &relative))
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if no rules are loaded
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Non-empty, non-comment lines of an ignore file
pub fn parse_ignore_content(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}
