//! Consensus and vote documents, as handed to us by the document fetcher

use std::collections::{BTreeMap, BTreeSet};
use std::net::IpAddr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::fingerprint::Fingerprint;
use crate::flag::Flag;
use crate::version::TorVersion;

/// Per-relay record inside a consensus or a vote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterEntry {
    pub nickname: String,
    pub fingerprint: Fingerprint,
    pub address: IpAddr,
    pub or_port: u16,
    #[serde(default)]
    pub dir_port: Option<u16>,
    #[serde(default)]
    pub flags: BTreeSet<Flag>,
    #[serde(default)]
    pub version: Option<TorVersion>,
    /// Self-advertised bandwidth
    #[serde(default)]
    pub bandwidth: Option<u64>,
    /// Bandwidth as measured by a bandwidth scanner, if any
    #[serde(default)]
    pub measured: Option<u64>,
}

impl RouterEntry {
    pub fn has_flag(&self, flag: &Flag) -> bool {
        self.flags.contains(flag)
    }

    pub fn is_measured(&self) -> bool {
        self.measured.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyCertificate {
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub published: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub expires: OffsetDateTime,
}

/// `dir-source` entry: an authority that contributed to a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryAuthority {
    pub nickname: String,
    /// v3 identity of the authority
    pub fingerprint: Fingerprint,
    pub address: IpAddr,
    pub dir_port: u16,
    pub or_port: u16,
    /// Only present in votes
    #[serde(default)]
    pub key_certificate: Option<KeyCertificate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectorySignature {
    /// v3 identity of the signing authority
    pub identity: Fingerprint,
    #[serde(default)]
    pub signing_key_digest: Option<String>,
}

/// The network status document the authorities agreed on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consensus {
    #[serde(with = "time::serde::rfc3339")]
    pub valid_after: OffsetDateTime,
    pub consensus_method: u32,
    #[serde(default)]
    pub client_versions: Vec<String>,
    #[serde(default)]
    pub server_versions: Vec<String>,
    #[serde(default)]
    pub params: BTreeMap<String, i64>,
    #[serde(default)]
    pub routers: BTreeMap<Fingerprint, RouterEntry>,
    #[serde(default)]
    pub directory_authorities: Vec<DirectoryAuthority>,
    #[serde(default)]
    pub signatures: Vec<DirectorySignature>,
}

impl Consensus {
    /// v3 identities of all authorities whose votes went into this consensus
    pub fn voting_identities(&self) -> BTreeSet<&Fingerprint> {
        self.directory_authorities
            .iter()
            .map(|authority| &authority.fingerprint)
            .collect()
    }

    /// v3 identities of all authorities that signed this consensus
    pub fn signing_identities(&self) -> BTreeSet<&Fingerprint> {
        self.signatures.iter().map(|sig| &sig.identity).collect()
    }
}

/// A single authority's opinion, prior to consensus aggregation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    #[serde(with = "time::serde::rfc3339")]
    pub valid_after: OffsetDateTime,
    #[serde(default)]
    pub consensus_methods: BTreeSet<u32>,
    #[serde(default)]
    pub client_versions: Vec<String>,
    #[serde(default)]
    pub server_versions: Vec<String>,
    #[serde(default)]
    pub params: BTreeMap<String, i64>,
    /// Flags this authority votes on at all
    #[serde(default)]
    pub known_flags: BTreeSet<Flag>,
    #[serde(default)]
    pub routers: BTreeMap<Fingerprint, RouterEntry>,
    /// A vote carries exactly one entry: its issuer
    #[serde(default)]
    pub directory_authorities: Vec<DirectoryAuthority>,
}

impl Vote {
    pub fn issuer(&self) -> Option<&DirectoryAuthority> {
        self.directory_authorities.first()
    }

    /// Whether any router in this vote carries a bandwidth measurement
    pub fn has_measurements(&self) -> bool {
        self.routers.values().any(RouterEntry::is_measured)
    }

    pub fn num_measured(&self) -> usize {
        self.routers.values().filter(|r| r.is_measured()).count()
    }

    /// Whether this authority takes part in voting on `flag`
    ///
    /// Either it lists it among its known flags, or it assigns it to at
    /// least one router.
    pub fn votes_on(&self, flag: &Flag) -> bool {
        self.known_flags.contains(flag) || self.routers.values().any(|r| r.has_flag(flag))
    }
}
