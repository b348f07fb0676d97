//! Documents collected during a run, keyed by authority nickname

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::time::Duration;

use dirhealth_doc_core::document::{Consensus, Vote};

/// Outcome of a connection attempt to an authority's OR port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortProbe {
    pub endpoint: SocketAddr,
    /// `None` if the connection was accepted
    pub error: Option<String>,
}

impl PortProbe {
    pub fn reachable(endpoint: SocketAddr) -> Self {
        Self {
            endpoint,
            error: None,
        }
    }

    pub fn unreachable(endpoint: SocketAddr, error: impl Into<String>) -> Self {
        Self {
            endpoint,
            error: Some(error.into()),
        }
    }

    pub fn is_reachable(&self) -> bool {
        self.error.is_none()
    }
}

/// Everything the checks get to look at, built once per run
#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    pub consensuses: BTreeMap<String, Consensus>,
    pub votes: BTreeMap<String, Vote>,
    /// How long downloading each authority's consensus took
    pub consensus_fetch_times: BTreeMap<String, Duration>,
    pub reachability: BTreeMap<String, Vec<PortProbe>>,
}

impl DocumentStore {
    /// Checks need at least one consensus and one vote to compare
    pub fn is_checkable(&self) -> bool {
        !self.consensuses.is_empty() && !self.votes.is_empty()
    }

    /// The consensus with the most recent `valid_after`
    ///
    /// On a tie the first one (in authority order) wins.
    pub fn latest_consensus(&self) -> Option<(&str, &Consensus)> {
        let mut latest: Option<(&str, &Consensus)> = None;

        for (authority, consensus) in &self.consensuses {
            if latest.is_none_or(|(_, l)| l.valid_after < consensus.valid_after) {
                latest = Some((authority, consensus));
            }
        }

        latest
    }
}
