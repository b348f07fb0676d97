//! Detected problems and their severity

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Severity of an [`Issue`], ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Runlevel {
    Notice,
    Warning,
    Error,
}

impl Runlevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Runlevel::Notice => "NOTICE",
            Runlevel::Warning => "WARNING",
            Runlevel::Error => "ERROR",
        }
    }

    /// Hours a notification is held back after being sent, unless the
    /// message catalog overrides it
    ///
    /// Errors are never suppressed.
    pub fn default_suppression_hours(self) -> u32 {
        match self {
            Runlevel::Notice => 24,
            Runlevel::Warning => 4,
            Runlevel::Error => 0,
        }
    }
}

impl fmt::Display for Runlevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What kind of problem an issue is, which is also its message template id
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IssueKind {
    AuthorityUnavailable,
    MissingLatestConsensus,
    ConsensusMethodUnsupported,
    DifferentRecommendedVersion,
    UnknownConsensusParameters,
    MismatchConsensusParameters,
    CertificateAboutToExpire,
    MissingVotes,
    MissingSignature,
    MissingBandwidthScanners,
    ExtraBandwidthScanners,
    TooManyUnmeasuredRelays,
    MissingAuthorities,
    ExtraAuthorities,
    TorOutOfDate,
    FingerprintMismatch,
    BadExitOutOfSync,
    BandwidthAuthoritiesOutOfSync,
    AuthorityUnreachable,
    SlowConsensusDownload,
}

impl IssueKind {
    pub const ALL: [IssueKind; 20] = [
        IssueKind::AuthorityUnavailable,
        IssueKind::MissingLatestConsensus,
        IssueKind::ConsensusMethodUnsupported,
        IssueKind::DifferentRecommendedVersion,
        IssueKind::UnknownConsensusParameters,
        IssueKind::MismatchConsensusParameters,
        IssueKind::CertificateAboutToExpire,
        IssueKind::MissingVotes,
        IssueKind::MissingSignature,
        IssueKind::MissingBandwidthScanners,
        IssueKind::ExtraBandwidthScanners,
        IssueKind::TooManyUnmeasuredRelays,
        IssueKind::MissingAuthorities,
        IssueKind::ExtraAuthorities,
        IssueKind::TorOutOfDate,
        IssueKind::FingerprintMismatch,
        IssueKind::BadExitOutOfSync,
        IssueKind::BandwidthAuthoritiesOutOfSync,
        IssueKind::AuthorityUnreachable,
        IssueKind::SlowConsensusDownload,
    ];

    /// Template id, as used for the message and suppression configuration
    pub fn as_str(self) -> &'static str {
        match self {
            IssueKind::AuthorityUnavailable => "AUTHORITY_UNAVAILABLE",
            IssueKind::MissingLatestConsensus => "MISSING_LATEST_CONSENSUS",
            IssueKind::ConsensusMethodUnsupported => "CONSENSUS_METHOD_UNSUPPORTED",
            IssueKind::DifferentRecommendedVersion => "DIFFERENT_RECOMMENDED_VERSION",
            IssueKind::UnknownConsensusParameters => "UNKNOWN_CONSENSUS_PARAMETERS",
            IssueKind::MismatchConsensusParameters => "MISMATCH_CONSENSUS_PARAMETERS",
            IssueKind::CertificateAboutToExpire => "CERTIFICATE_ABOUT_TO_EXPIRE",
            IssueKind::MissingVotes => "MISSING_VOTES",
            IssueKind::MissingSignature => "MISSING_SIGNATURE",
            IssueKind::MissingBandwidthScanners => "MISSING_BANDWIDTH_SCANNERS",
            IssueKind::ExtraBandwidthScanners => "EXTRA_BANDWIDTH_SCANNERS",
            IssueKind::TooManyUnmeasuredRelays => "TOO_MANY_UNMEASURED_RELAYS",
            IssueKind::MissingAuthorities => "MISSING_AUTHORITIES",
            IssueKind::ExtraAuthorities => "EXTRA_AUTHORITIES",
            IssueKind::TorOutOfDate => "TOR_OUT_OF_DATE",
            IssueKind::FingerprintMismatch => "FINGERPRINT_MISMATCH",
            IssueKind::BadExitOutOfSync => "BADEXIT_OUT_OF_SYNC",
            IssueKind::BandwidthAuthoritiesOutOfSync => "BANDWIDTH_AUTHORITIES_OUT_OF_SYNC",
            IssueKind::AuthorityUnreachable => "AUTHORITY_UNREACHABLE",
            IssueKind::SlowConsensusDownload => "SLOW_CONSENSUS_DOWNLOAD",
        }
    }

    /// Attributes that fluctuate from run to run without the underlying
    /// condition changing
    ///
    /// They are zeroed out before deriving the suppression key.
    pub fn volatile_attributes(self) -> &'static [&'static str] {
        match self {
            IssueKind::TooManyUnmeasuredRelays => &["unmeasured", "total", "percentage"],
            IssueKind::BandwidthAuthoritiesOutOfSync => &["authorities"],
            IssueKind::SlowConsensusDownload => &["duration", "median"],
            IssueKind::AuthorityUnreachable => &["error"],
            _ => &[],
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value of a single message attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Text(String),
    Number(i64),
}

impl AttrValue {
    /// Neutral value of the same type
    pub fn zeroed(&self) -> Self {
        match self {
            AttrValue::Text(_) => AttrValue::Text(String::new()),
            AttrValue::Number(_) => AttrValue::Number(0),
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Text(s) => f.write_str(s),
            AttrValue::Number(n) => n.fmt(f),
        }
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Text(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Text(value.to_owned())
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Number(value)
    }
}

impl From<usize> for AttrValue {
    fn from(value: usize) -> Self {
        AttrValue::Number(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<u64> for AttrValue {
    fn from(value: u64) -> Self {
        AttrValue::Number(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

pub type Attributes = BTreeMap<&'static str, AttrValue>;

/// One detected problem, to be reported at the end of the run
///
/// Created fresh by a check every run and never mutated afterwards. The
/// concerned authorities only decide who gets notified; they play no part
/// in suppression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    runlevel: Runlevel,
    kind: IssueKind,
    attrs: Attributes,
    concerned: BTreeSet<String>,
}

impl Issue {
    pub fn new(runlevel: Runlevel, kind: IssueKind) -> Self {
        Self {
            runlevel,
            kind,
            attrs: Attributes::new(),
            concerned: BTreeSet::new(),
        }
    }

    pub fn attr(mut self, name: &'static str, value: impl Into<AttrValue>) -> Self {
        self.attrs.insert(name, value.into());
        self
    }

    pub fn concerning<I, S>(mut self, authorities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.concerned.extend(authorities.into_iter().map(Into::into));
        self
    }

    pub fn runlevel(&self) -> Runlevel {
        self.runlevel
    }

    pub fn kind(&self) -> IssueKind {
        self.kind
    }

    pub fn attrs(&self) -> &Attributes {
        &self.attrs
    }

    pub fn get_attr(&self, name: &str) -> Option<&AttrValue> {
        self.attrs.get(name)
    }

    pub fn concerned_authorities(&self) -> &BTreeSet<String> {
        &self.concerned
    }

    /// Attributes with the volatile ones zeroed, see
    /// [`IssueKind::volatile_attributes`]
    pub fn stable_attrs(&self) -> Attributes {
        let volatile = self.kind.volatile_attributes();
        self.attrs
            .iter()
            .map(|(name, value)| {
                if volatile.contains(name) {
                    (*name, value.zeroed())
                } else {
                    (*name, value.clone())
                }
            })
            .collect()
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.runlevel, self.kind)?;
        for (name, value) in &self.attrs {
            write!(f, " {name}={:?}", value.to_string())?;
        }
        Ok(())
    }
}

/// An [`Issue`] with its message and suppression parameters resolved
/// against a [`crate::catalog::MessageCatalog`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedIssue {
    pub issue: Issue,
    pub message: String,
    pub suppression_key: String,
    pub suppression_hours: u32,
}

impl fmt::Display for RenderedIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.issue.runlevel(), self.message)
    }
}

#[cfg(test)]
mod tests;
