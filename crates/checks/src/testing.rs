//! Document fixtures for tests, here and in other crates (`test-util`)

use std::collections::{BTreeMap, BTreeSet};

use dirhealth_doc_core::authority::{Authority, AuthorityDirectory};
use dirhealth_doc_core::document::{
    Consensus, DirectoryAuthority, DirectorySignature, KeyCertificate, RouterEntry, Vote,
};
use dirhealth_doc_core::fingerprint::Fingerprint;
use dirhealth_doc_core::flag::Flag;
use time::macros::datetime;
use time::{Duration, OffsetDateTime};

use crate::context::CheckContext;
use crate::engine::{CheckFn, CheckInput};
use crate::issue::Issue;
use crate::store::DocumentStore;

pub const TEST_VERSIONS: [&str; 2] = ["0.4.8.12", "0.4.9.1-alpha"];
pub const TEST_METHOD: u32 = 33;

pub fn test_now() -> OffsetDateTime {
    datetime!(2024-03-01 12:30:00 UTC)
}

pub fn fingerprint(n: u32) -> Fingerprint {
    format!("{n:040X}").parse().expect("Valid fingerprint")
}

/// Voting authority number `idx`, not a bandwidth authority
pub fn authority(nickname: &str, idx: u8) -> Authority {
    Authority {
        nickname: nickname.to_owned(),
        v3ident: Some(fingerprint(1000 + u32::from(idx))),
        fingerprint: fingerprint(u32::from(idx)),
        address: [192, 0, 2, idx].into(),
        dir_port: 80,
        or_port: 443,
        orport_v6: None,
        is_bandwidth_authority: false,
    }
}

pub fn directory(nicknames: &[&str]) -> AuthorityDirectory {
    AuthorityDirectory::new(
        nicknames.iter().zip(1..).map(|(nick, idx)| authority(nick, idx)),
        [],
    )
}

pub fn router(nickname: &str, fingerprint: Fingerprint) -> RouterEntry {
    RouterEntry {
        nickname: nickname.to_owned(),
        fingerprint,
        address: [198, 51, 100, 1].into(),
        or_port: 9001,
        dir_port: None,
        flags: BTreeSet::from([Flag::Running, Flag::Valid]),
        version: Some(TEST_VERSIONS[0].parse().expect("Valid version")),
        bandwidth: Some(1000),
        measured: None,
    }
}

/// Router entry of an authority itself, carrying the `Authority` flag
pub fn authority_router(authority: &Authority) -> RouterEntry {
    let mut entry = router(&authority.nickname, authority.fingerprint.clone());
    entry.flags.insert(Flag::Authority);
    entry
}

pub fn dir_source(authority: &Authority) -> DirectoryAuthority {
    DirectoryAuthority {
        nickname: authority.nickname.clone(),
        fingerprint: authority.v3ident.clone().expect("Voting authority"),
        address: authority.address,
        dir_port: authority.dir_port,
        or_port: authority.or_port,
        key_certificate: None,
    }
}

pub struct ConsensusBuilder {
    consensus: Consensus,
}

impl ConsensusBuilder {
    pub fn new(valid_after: OffsetDateTime) -> Self {
        Self {
            consensus: Consensus {
                valid_after,
                consensus_method: TEST_METHOD,
                client_versions: TEST_VERSIONS.map(String::from).to_vec(),
                server_versions: TEST_VERSIONS.map(String::from).to_vec(),
                params: BTreeMap::new(),
                routers: BTreeMap::new(),
                directory_authorities: vec![],
                signatures: vec![],
            },
        }
    }

    pub fn method(mut self, method: u32) -> Self {
        self.consensus.consensus_method = method;
        self
    }

    pub fn server_versions(mut self, versions: &[&str]) -> Self {
        self.consensus.server_versions = versions.iter().map(|v| v.to_string()).collect();
        self
    }

    pub fn param(mut self, name: &str, value: i64) -> Self {
        self.consensus.params.insert(name.to_owned(), value);
        self
    }

    pub fn router(mut self, entry: RouterEntry) -> Self {
        self.consensus
            .routers
            .insert(entry.fingerprint.clone(), entry);
        self
    }

    /// Authority voted on this consensus (and signed it)
    pub fn voter(self, authority: &Authority) -> Self {
        self.voter_without_signature(authority)
            .signed_by(authority.v3ident.clone().expect("Voting authority"))
    }

    pub fn voter_without_signature(mut self, authority: &Authority) -> Self {
        self.consensus
            .directory_authorities
            .push(dir_source(authority));
        self
    }

    pub fn signed_by(mut self, identity: Fingerprint) -> Self {
        self.consensus.signatures.push(DirectorySignature {
            identity,
            signing_key_digest: None,
        });
        self
    }

    pub fn build(self) -> Consensus {
        self.consensus
    }
}

pub struct VoteBuilder {
    vote: Vote,
}

impl VoteBuilder {
    pub fn new(valid_after: OffsetDateTime) -> Self {
        Self {
            vote: Vote {
                valid_after,
                consensus_methods: BTreeSet::from([TEST_METHOD - 1, TEST_METHOD, TEST_METHOD + 1]),
                client_versions: TEST_VERSIONS.map(String::from).to_vec(),
                server_versions: TEST_VERSIONS.map(String::from).to_vec(),
                params: BTreeMap::new(),
                known_flags: BTreeSet::from([Flag::Running, Flag::Valid]),
                routers: BTreeMap::new(),
                directory_authorities: vec![],
            },
        }
    }

    pub fn methods(mut self, methods: &[u32]) -> Self {
        self.vote.consensus_methods = methods.iter().copied().collect();
        self
    }

    pub fn client_versions(mut self, versions: &[&str]) -> Self {
        self.vote.client_versions = versions.iter().map(|v| v.to_string()).collect();
        self
    }

    pub fn server_versions(mut self, versions: &[&str]) -> Self {
        self.vote.server_versions = versions.iter().map(|v| v.to_string()).collect();
        self
    }

    pub fn param(mut self, name: &str, value: i64) -> Self {
        self.vote.params.insert(name.to_owned(), value);
        self
    }

    pub fn known_flag(mut self, flag: Flag) -> Self {
        self.vote.known_flags.insert(flag);
        self
    }

    pub fn router(mut self, entry: RouterEntry) -> Self {
        self.vote.routers.insert(entry.fingerprint.clone(), entry);
        self
    }

    /// `n` routers with a bandwidth measurement, fingerprints starting at
    /// `first`
    pub fn measured_routers(mut self, first: u32, n: u32) -> Self {
        for i in first..first + n {
            let mut entry = router(&format!("relay{i}"), fingerprint(i));
            entry.measured = Some(500);
            self = self.router(entry);
        }
        self
    }

    pub fn issuer(mut self, authority: &Authority, cert_expires: OffsetDateTime) -> Self {
        let mut source = dir_source(authority);
        source.key_certificate = Some(KeyCertificate {
            published: Some(cert_expires - Duration::days(365)),
            expires: cert_expires,
        });
        self.vote.directory_authorities = vec![source];
        self
    }

    pub fn build(self) -> Vote {
        self.vote
    }
}

/// A network where every check passes: one fresh consensus, and a vote
/// from every authority agreeing with it
pub fn healthy_network(nicknames: &[&str]) -> (CheckContext, DocumentStore) {
    let now = test_now();
    let directory = directory(nicknames);
    let valid_after = now - Duration::minutes(30);

    let mut consensus = ConsensusBuilder::new(valid_after).param("circwindow", 1000);
    for authority in directory.all() {
        consensus = consensus.voter(authority).router(authority_router(authority));
    }

    let mut store = DocumentStore::default();
    store.consensuses.insert(
        nicknames.first().expect("At least one").to_string(),
        consensus.build(),
    );

    for authority in directory.all() {
        store.votes.insert(
            authority.nickname.clone(),
            VoteBuilder::new(valid_after)
                .param("circwindow", 1000)
                .issuer(authority, now + Duration::days(365))
                .build(),
        );
    }

    let ctx = CheckContext::builder()
        .now(now)
        .directory(directory)
        .known_params(BTreeSet::from(["circwindow".to_owned()]))
        .build();

    (ctx, store)
}

/// Run a single check against the store's latest consensus
pub fn run_check(check: CheckFn, store: &DocumentStore, ctx: &CheckContext) -> Vec<Issue> {
    let (_, latest) = store.latest_consensus().expect("Store has a consensus");
    check(&CheckInput { latest, store, ctx }).expect("Check succeeds")
}

/// Attribute rendered as text, empty if absent
pub fn attr(issue: &Issue, name: &str) -> String {
    issue
        .get_attr(name)
        .map(ToString::to_string)
        .unwrap_or_default()
}
