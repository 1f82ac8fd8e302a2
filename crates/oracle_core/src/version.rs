//! Layout revisions.
//!
//! Every trace starts with the revision of the memory layout it was captured
//! against. Two traces are only comparable when their revisions agree.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Layout revision, `major.minor.patch`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Version {
    /// Bumped when an offset moves or a field is removed
    pub major: u32,
    /// Bumped when fields are added
    pub minor: u32,
    /// Bumped for rendering-neutral fixes
    pub patch: u32,
}

impl Version {
    /// Create a revision
    #[must_use]
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse `major.minor.patch`
    ///
    /// # Errors
    ///
    /// Returns error if format is invalid
    pub fn parse(s: &str) -> Result<Self, VersionError> {
        let mut parts = s.trim().split('.');
        let mut next = || -> Result<u32, VersionError> {
            let part = parts
                .next()
                .ok_or_else(|| VersionError::InvalidFormat(s.to_string()))?;
            part.parse()
                .map_err(|_| VersionError::InvalidComponent(part.to_string()))
        };
        let version = Self::new(next()?, next()?, next()?);
        if parts.next().is_some() {
            return Err(VersionError::InvalidFormat(s.to_string()));
        }
        Ok(version)
    }

    /// Whether traces of the two revisions can be compared field for field
    #[must_use]
    pub const fn is_compatible(&self, other: &Self) -> bool {
        self.major == other.major && self.minor == other.minor
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Revision parse errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionError {
    /// Not three dot-separated parts
    #[error("invalid layout revision: {0}")]
    InvalidFormat(String),
    /// A part is not a number
    #[error("invalid layout revision component: {0}")]
    InvalidComponent(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parse() {
        let v = Version::parse("1.2.3").unwrap();
        assert_eq!(v, Version::new(1, 2, 3));
        assert_eq!("1.0.0".parse::<Version>().unwrap(), Version::new(1, 0, 0));
    }

    #[test]
    fn test_version_display() {
        assert_eq!(Version::new(1, 0, 0).to_string(), "1.0.0");
    }

    #[test]
    fn test_version_parse_error() {
        assert!(matches!(Version::parse("1.2"), Err(VersionError::InvalidFormat(_))));
        assert!(matches!(Version::parse("1.2.3.4"), Err(VersionError::InvalidFormat(_))));
        assert!(matches!(
            Version::parse("a.b.c"),
            Err(VersionError::InvalidComponent(_))
        ));
    }

    #[test]
    fn test_version_compatibility() {
        let base = Version::new(1, 0, 0);
        assert!(base.is_compatible(&Version::new(1, 0, 7)));
        assert!(!base.is_compatible(&Version::new(1, 1, 0)));
        assert!(!base.is_compatible(&Version::new(2, 0, 0)));
    }
}
