use std::fmt;
use std::str::FromStr;

use semver::Version;
use thiserror::Error;

/// Structured, totally ordered release number.
///
/// Accepts anything `semver` accepts plus the short forms release feeds tend
/// to use (`v1.2`, `3`, `4.0-dev`), normalizing missing components to zero.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VersionNumber(Version);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionParseError {
    #[error("Version string is empty")]
    Empty,
    #[error("Expected MAJOR[.MINOR[.PATCH]][-PRE][+BUILD], got: {input}")]
    InvalidFormat { input: String },
}

impl VersionNumber {
    #[must_use]
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self(Version::new(major, minor, patch))
    }

    #[must_use]
    pub fn major(&self) -> u64 {
        self.0.major
    }

    #[must_use]
    pub fn minor(&self) -> u64 {
        self.0.minor
    }

    #[must_use]
    pub fn patch(&self) -> u64 {
        self.0.patch
    }

    #[must_use]
    pub fn is_prerelease(&self) -> bool {
        !self.0.pre.is_empty()
    }

    #[must_use]
    pub fn is_newer_than(&self, other: &Self) -> bool {
        self > other
    }

    #[must_use]
    pub fn as_semver(&self) -> &Version {
        &self.0
    }
}

impl fmt::Display for VersionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for VersionNumber {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let version = trimmed.strip_prefix('v').unwrap_or(trimmed);
        if version.is_empty() {
            return Err(VersionParseError::Empty);
        }

        parse_semver(version)
            .map(Self)
            .ok_or_else(|| VersionParseError::InvalidFormat {
                input: s.to_string(),
            })
    }
}

fn parse_semver(version: &str) -> Option<Version> {
    if let Ok(parsed) = Version::parse(version) {
        return Some(parsed);
    }

    let (core, suffix) = split_semver_core_and_suffix(version);
    let mut parts = core.split('.');
    let major = parts.next()?.parse::<u64>().ok()?;
    let minor = parts.next().map(str::parse::<u64>).transpose().ok()?;
    let patch = parts.next().map(str::parse::<u64>).transpose().ok()?;

    if parts.next().is_some() {
        return None;
    }

    let normalized = match (minor, patch) {
        (None, None) => format!("{major}.0.0{suffix}"),
        (Some(minor), None) => format!("{major}.{minor}.0{suffix}"),
        (Some(minor), Some(patch)) => format!("{major}.{minor}.{patch}{suffix}"),
        (None, Some(_)) => return None,
    };

    Version::parse(&normalized).ok()
}

fn split_semver_core_and_suffix(version: &str) -> (&str, &str) {
    let suffix_idx = version.find(['-', '+']).unwrap_or(version.len());
    (&version[..suffix_idx], &version[suffix_idx..])
}
