//! Semantic version model and the version arithmetic used by operations
//!
//! Parsing is lenient (optional `v` prefix, any dot/dash separated
//! pre-release text); [`SemVersion::validate_strict`] applies SemVer 2.0
//! rules through the `semver` crate.

use crate::error::VersionError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Longest version string accepted by the parser
pub const MAX_VERSION_LENGTH: usize = 128;

/// `[v]major.minor.patch[-pre][+build]`
static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^v?([^.\-+]+)\.([^.\-+]+)\.([^.\-+]+)(?:-([0-9A-Za-z\-.]+))?(?:\+([0-9A-Za-z\-.]+))?$")
        .unwrap()
});

/// Dot separated identifiers, each `[0-9A-Za-z-]+`
static IDENTIFIERS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9A-Za-z\-]+(?:\.[0-9A-Za-z\-]+)*$").unwrap());

/// A semantic version as stored in a marker file
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SemVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    /// Pre-release text without the leading `-`
    pub pre_release: String,
    /// Build metadata without the leading `+`
    pub build: String,
}

/// Kind of version bump
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BumpKind {
    Patch,
    Minor,
    Major,
    /// Drop pre-release and build metadata
    Release,
    /// Promote a pre-release, otherwise bump patch
    Auto,
}

impl BumpKind {
    /// All bump kinds, in CLI display order
    pub fn all() -> &'static [BumpKind] {
        &[
            BumpKind::Patch,
            BumpKind::Minor,
            BumpKind::Major,
            BumpKind::Release,
            BumpKind::Auto,
        ]
    }

    /// Lowercase name used on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            BumpKind::Patch => "patch",
            BumpKind::Minor => "minor",
            BumpKind::Major => "major",
            BumpKind::Release => "release",
            BumpKind::Auto => "auto",
        }
    }
}

impl fmt::Display for BumpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BumpKind {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BumpKind::all()
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| VersionError::InvalidBumpKind {
                value: s.to_string(),
            })
    }
}

impl SemVersion {
    /// Creates a release version with no pre-release or build metadata
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            pre_release: String::new(),
            build: String::new(),
        }
    }

    /// Sets the pre-release text
    pub fn with_pre_release(mut self, pre_release: impl Into<String>) -> Self {
        self.pre_release = pre_release.into();
        self
    }

    /// Sets the build metadata
    pub fn with_build(mut self, build: impl Into<String>) -> Self {
        self.build = build.into();
        self
    }

    /// Parses a version string, trimming surrounding whitespace
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let trimmed = input.trim();
        if trimmed.len() > MAX_VERSION_LENGTH {
            return Err(VersionError::TooLong {
                max: MAX_VERSION_LENGTH,
            });
        }

        let caps = VERSION_RE
            .captures(trimmed)
            .ok_or_else(|| VersionError::InvalidFormat {
                input: trimmed.to_string(),
            })?;

        let component = |index: usize, name: &'static str| -> Result<u64, VersionError> {
            let raw = &caps[index];
            raw.parse().map_err(|_| VersionError::InvalidComponent {
                component: name,
                value: raw.to_string(),
            })
        };

        Ok(Self {
            major: component(1, "major")?,
            minor: component(2, "minor")?,
            patch: component(3, "patch")?,
            pre_release: caps.get(4).map(|m| m.as_str().to_string()).unwrap_or_default(),
            build: caps.get(5).map(|m| m.as_str().to_string()).unwrap_or_default(),
        })
    }

    /// Checks `input` against SemVer 2.0 (a leading `v` is tolerated)
    pub fn validate_strict(input: &str) -> Result<Self, VersionError> {
        let lenient = Self::parse(input)?;
        let trimmed = input.trim();
        let bare = trimmed.strip_prefix('v').unwrap_or(trimmed);
        semver::Version::parse(bare).map_err(|e| VersionError::NotStrict {
            input: trimmed.to_string(),
            message: e.to_string(),
        })?;
        Ok(lenient)
    }

    /// Returns true if this version carries a pre-release
    pub fn is_pre_release(&self) -> bool {
        !self.pre_release.is_empty()
    }

    /// Applies a bump, clearing pre-release and build metadata
    pub fn bump(&self, kind: BumpKind) -> Result<Self, VersionError> {
        Ok(match kind {
            BumpKind::Patch => Self::new(self.major, self.minor, increment(self.patch, "patch")?),
            BumpKind::Minor => Self::new(self.major, increment(self.minor, "minor")?, 0),
            BumpKind::Major => Self::new(increment(self.major, "major")?, 0, 0),
            BumpKind::Release => Self::new(self.major, self.minor, self.patch),
            BumpKind::Auto => return self.bump_auto(),
        })
    }

    /// Pre-release promotes to its release; `0.9.0` moves to `0.10.0`;
    /// anything else bumps patch.
    fn bump_auto(&self) -> Result<Self, VersionError> {
        if self.is_pre_release() {
            return Ok(Self::new(self.major, self.minor, self.patch));
        }
        if self.major == 0 && self.minor == 9 && self.patch == 0 {
            return Ok(Self::new(0, 10, 0));
        }
        Ok(Self::new(self.major, self.minor, increment(self.patch, "patch")?))
    }

    /// Sets a pre-release label without a counter.
    ///
    /// A release version moves to the next patch first, so `1.0.0` with
    /// `beta` becomes `1.0.1-beta`; an existing pre-release is replaced in
    /// place (`2.0.0-alpha.1` becomes `2.0.0-beta`).
    pub fn set_pre_release(&self, label: &str) -> Result<Self, VersionError> {
        let mut next = self.clone();
        if !self.is_pre_release() {
            next.patch = increment(self.patch, "patch")?;
        }
        next.pre_release = label.to_string();
        Ok(next)
    }

    /// Increments the pre-release counter scoped to `label`.
    ///
    /// The counter keeps the existing separator (`rc.1` -> `rc.2`,
    /// `rc-1` -> `rc-2`, `rc1` -> `rc2`). A different label, or one with no
    /// numeric suffix, starts over at `.1`. A release version moves to the
    /// next patch and gets `label.1`.
    pub fn increment_pre_release(&self, label: &str) -> Result<Self, VersionError> {
        let mut next = self.clone();
        if !self.is_pre_release() {
            next.patch = increment(self.patch, "patch")?;
            next.pre_release = format!("{}.1", label);
            return Ok(next);
        }
        next.pre_release = increment_label(&self.pre_release, label)?;
        Ok(next)
    }
}

fn increment(value: u64, component: &'static str) -> Result<u64, VersionError> {
    value
        .checked_add(1)
        .ok_or(VersionError::Overflow { component })
}

/// Increments the numeric suffix of `current` if it belongs to `label`.
pub fn increment_label(current: &str, label: &str) -> Result<String, VersionError> {
    let restart = || Ok(format!("{}.1", label));

    let Some(suffix) = current.strip_prefix(label) else {
        return restart();
    };

    let (separator, digits) = match suffix.chars().next() {
        Some('.') => (".", &suffix[1..]),
        Some('-') => ("-", &suffix[1..]),
        Some(_) => ("", suffix),
        None => return restart(),
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return restart();
    }

    match digits.parse::<u64>() {
        Ok(n) => Ok(format!(
            "{}{}{}",
            label,
            separator,
            increment(n, "pre-release counter")?
        )),
        Err(_) => restart(),
    }
}

/// Validates a pre-release label
pub fn validate_label(label: &str) -> Result<(), VersionError> {
    if IDENTIFIERS_RE.is_match(label) {
        Ok(())
    } else {
        Err(VersionError::InvalidLabel {
            label: label.to_string(),
        })
    }
}

/// Validates build metadata
pub fn validate_metadata(metadata: &str) -> Result<(), VersionError> {
    if IDENTIFIERS_RE.is_match(metadata) {
        Ok(())
    } else {
        Err(VersionError::InvalidMetadata {
            metadata: metadata.to_string(),
        })
    }
}

impl fmt::Display for SemVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if !self.pre_release.is_empty() {
            write!(f, "-{}", self.pre_release)?;
        }
        if !self.build.is_empty() {
            write!(f, "+{}", self.build)?;
        }
        Ok(())
    }
}

impl FromStr for SemVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
