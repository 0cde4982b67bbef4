//! Release version identifiers
//!
//! Versions look like `2.16`, `2.16.5` or `2.16rc1`. They are ordered
//! component-wise as `(major, minor, separator, release)` where the
//! separator ranks `rc` < none < `.`, and a missing release counts as 1:
//!
//! ```text
//! 2.16rc1 -> 2,16,0,1
//! 2.16    -> 2,16,1,1
//! 2.16.5  -> 2,16,2,5
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

static VERSION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+)\.(\d+)(rc|\.)?(\d+)?$").expect("version pattern is valid")
});

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("Malformed version identifier '{0}' (expected major.minor[(rc|.)release])")]
    Malformed(String),

    #[error("Version component out of range in '{0}'")]
    Overflow(String),
}

/// A release identifier with its precomputed sort key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    name: String,
    key: [u32; 4],
}

impl Version {
    pub fn parse(name: &str) -> Result<Self, VersionError> {
        let caps = VERSION_RE
            .captures(name)
            .ok_or_else(|| VersionError::Malformed(name.to_string()))?;

        let number = |idx: usize| -> Result<u32, VersionError> {
            match caps.get(idx) {
                Some(m) => m
                    .as_str()
                    .parse()
                    .map_err(|_| VersionError::Overflow(name.to_string())),
                None => Ok(1),
            }
        };

        let separator = match caps.get(3).map(|m| m.as_str()) {
            Some("rc") => 0,
            None => 1,
            _ => 2,
        };

        Ok(Self {
            name: name.to_string(),
            key: [number(1)?, number(2)?, separator, number(4)?],
        })
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }

    pub fn is_release_candidate(&self) -> bool {
        self.key[2] == 0
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        // Name breaks ties so that Ord agrees with Eq ("2.016" vs "2.16").
        self.key
            .cmp(&other.key)
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Version {
    type Error = VersionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.name
    }
}

/// Compare two identifiers, failing on malformed input.
pub fn compare(a: &str, b: &str) -> Result<Ordering, VersionError> {
    Ok(Version::parse(a)?.cmp(&Version::parse(b)?))
}

/// True iff `v` lies in `[first, last]`; an unset bound is open.
pub fn within(first: Option<&Version>, last: Option<&Version>, v: &Version) -> bool {
    first.map_or(true, |f| v >= f) && last.map_or(true, |l| v <= l)
}
