use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{DocError, InvalidVersionSnafu};

/// Tor software version, like `0.4.8.12` or `0.4.9.1-alpha-dev`
///
/// Ordering is by the numeric components first. Among equal numbers a
/// release (no status tag) sorts after any pre-release, and status tags
/// otherwise compare lexicographically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TorVersion {
    pub major: u32,
    pub minor: u32,
    pub micro: u32,
    pub patch: Option<u32>,
    pub status: Option<String>,
}

impl TorVersion {
    fn numeric_key(&self) -> (u32, u32, u32, u32) {
        (
            self.major,
            self.minor,
            self.micro,
            self.patch.unwrap_or_default(),
        )
    }
}

impl Ord for TorVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.numeric_key()
            .cmp(&other.numeric_key())
            .then_with(|| match (&self.status, &other.status) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.cmp(b),
            })
            .then_with(|| self.patch.cmp(&other.patch))
    }
}

impl PartialOrd for TorVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for TorVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.micro)?;
        if let Some(patch) = self.patch {
            write!(f, ".{patch}")?;
        }
        if let Some(status) = &self.status {
            write!(f, "-{status}")?;
        }
        Ok(())
    }
}

impl FromStr for TorVersion {
    type Err = DocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidVersionSnafu { value: s }.build();

        // anything after whitespace (e.g. a git revision in parens) is extra info
        let version = s.split_whitespace().next().ok_or_else(invalid)?;

        let (numbers, status) = match version.split_once('-') {
            Some((numbers, status)) if !status.is_empty() => (numbers, Some(status.to_owned())),
            Some(_) => return Err(invalid()),
            None => (version, None),
        };

        let components = numbers
            .split('.')
            .map(|c| c.parse::<u32>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>, _>>()?;

        let (major, minor, micro, patch) = match components.as_slice() {
            [major, minor, micro] => (*major, *minor, *micro, None),
            [major, minor, micro, patch] => (*major, *minor, *micro, Some(*patch)),
            _ => return Err(invalid()),
        };

        Ok(Self {
            major,
            minor,
            micro,
            patch,
            status,
        })
    }
}

impl TryFrom<String> for TorVersion {
    type Error = DocError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TorVersion> for String {
    fn from(value: TorVersion) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests;
