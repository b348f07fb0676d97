//! Retrieval of consensus and vote documents from the directory authorities
//!
//! The actual document fetching is behind the [`DocumentFetcher`] trait;
//! [`collect_documents`] queries every authority concurrently and turns
//! failures into issues, and [`probe_authorities`] checks the authorities'
//! OR ports.

mod collect;
mod http;
mod probe;

use std::fmt;

use async_trait::async_trait;
use dirhealth_doc_core::authority::Authority;
use dirhealth_doc_core::document::{Consensus, Vote};
use dirhealth_doc_core::fingerprint::Fingerprint;
use snafu::{Location, Snafu};

pub use self::collect::{Collected, collect_documents};
pub use self::http::HttpFetcher;
pub use self::probe::probe_authorities;

const LOG_TARGET: &str = "dirhealth::fetch";

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum FetchError {
    #[snafu(display("Failed to build HTTP client"))]
    Client {
        source: reqwest::Error,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("Request to {url} failed"))]
    Request {
        url: String,
        source: reqwest::Error,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("{url} responded with {status}"))]
    Status {
        url: String,
        status: reqwest::StatusCode,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("Malformed document from {url}"))]
    Decode {
        url: String,
        source: reqwest::Error,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("{reason}"))]
    Unavailable {
        reason: String,
        #[snafu(implicit)]
        location: Location,
    },
}

pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// A document an authority's directory port serves
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    Consensus,
    /// The authority's own vote
    Vote,
    /// Some authority's vote, as mirrored by another one
    MirroredVote(Fingerprint),
}

impl Resource {
    pub fn path(&self) -> String {
        match self {
            Resource::Consensus => "/tor/status-vote/current/consensus".to_owned(),
            Resource::Vote => "/tor/status-vote/current/authority".to_owned(),
            Resource::MirroredVote(v3ident) => format!("/tor/status-vote/current/{v3ident}"),
        }
    }

    /// Document type, as reported in fetch failures
    pub fn fetch_type(&self) -> &'static str {
        match self {
            Resource::Consensus => "consensus",
            Resource::Vote | Resource::MirroredVote(_) => "vote",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Where documents come from
///
/// Every call is a single, bounded attempt: retries and fallbacks are up to
/// the caller.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    fn url(&self, authority: &Authority, resource: &Resource) -> String {
        format!("http://{}{}", authority.dir_endpoint(), resource.path())
    }

    async fn fetch_consensus(&self, authority: &Authority) -> FetchResult<Consensus>;

    async fn fetch_vote(&self, authority: &Authority, resource: &Resource) -> FetchResult<Vote>;
}
