//! The static list of directory authorities we expect on the network

use std::collections::{BTreeMap, BTreeSet};
use std::net::{IpAddr, SocketAddr};

use serde::{Deserialize, Serialize};

use crate::fingerprint::Fingerprint;

/// A known directory authority
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authority {
    pub nickname: String,
    /// v3 identity, `None` if this authority doesn't vote
    #[serde(default)]
    pub v3ident: Option<Fingerprint>,
    /// Relay identity of the authority's own router entry
    pub fingerprint: Fingerprint,
    pub address: IpAddr,
    pub dir_port: u16,
    pub or_port: u16,
    #[serde(default)]
    pub orport_v6: Option<SocketAddr>,
    #[serde(default)]
    pub is_bandwidth_authority: bool,
}

impl Authority {
    pub fn is_voting(&self) -> bool {
        self.v3ident.is_some()
    }

    /// All OR-port endpoints this authority advertises
    pub fn or_endpoints(&self) -> Vec<SocketAddr> {
        let mut endpoints = vec![SocketAddr::new(self.address, self.or_port)];
        endpoints.extend(self.orport_v6);
        endpoints
    }

    pub fn dir_endpoint(&self) -> SocketAddr {
        SocketAddr::new(self.address, self.dir_port)
    }
}

/// Known authorities, keyed by nickname
///
/// Ignored authorities (e.g. ones in a long known outage) stay listed, but
/// are left out of [`Self::active`] so they're neither queried nor expected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorityDirectory {
    authorities: BTreeMap<String, Authority>,
    ignored: BTreeSet<String>,
}

impl AuthorityDirectory {
    pub fn new(
        authorities: impl IntoIterator<Item = Authority>,
        ignored: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            authorities: authorities
                .into_iter()
                .map(|authority| (authority.nickname.clone(), authority))
                .collect(),
            ignored: ignored.into_iter().collect(),
        }
    }

    pub fn get(&self, nickname: &str) -> Option<&Authority> {
        self.authorities.get(nickname)
    }

    pub fn is_ignored(&self, nickname: &str) -> bool {
        self.ignored.contains(nickname)
    }

    pub fn is_bandwidth_authority(&self, nickname: &str) -> bool {
        self.get(nickname)
            .is_some_and(|authority| authority.is_bandwidth_authority)
    }

    /// Every listed authority, ignored ones included
    pub fn all(&self) -> impl Iterator<Item = &Authority> {
        self.authorities.values()
    }

    /// Authorities that are not ignored
    pub fn active(&self) -> impl Iterator<Item = &Authority> {
        self.authorities
            .values()
            .filter(|authority| !self.ignored.contains(&authority.nickname))
    }

    /// Active authorities that take part in voting
    pub fn voting(&self) -> impl Iterator<Item = &Authority> {
        self.active().filter(|authority| authority.is_voting())
    }

    pub fn by_v3ident(&self, v3ident: &Fingerprint) -> Option<&Authority> {
        self.authorities
            .values()
            .find(|authority| authority.v3ident.as_ref() == Some(v3ident))
    }

    /// Nickname for a v3 identity, or the identity itself if it's unknown
    pub fn nickname_for_v3ident(&self, v3ident: &Fingerprint) -> String {
        self.by_v3ident(v3ident)
            .map(|authority| authority.nickname.clone())
            .unwrap_or_else(|| v3ident.to_string())
    }
}
