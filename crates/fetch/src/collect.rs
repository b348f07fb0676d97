use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use dirhealth_checks::issue::{Issue, IssueKind, Runlevel};
use dirhealth_checks::store::DocumentStore;
use dirhealth_doc_core::authority::{Authority, AuthorityDirectory};
use dirhealth_doc_core::document::{Consensus, Vote};
use dirhealth_util_error::fmt::FmtCompact as _;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::{DocumentFetcher, FetchError, FetchResult, LOG_TARGET, Resource, UnavailableSnafu};

/// Documents retrieved from the authorities, and what went wrong doing so
#[derive(Debug, Default)]
pub struct Collected {
    pub store: DocumentStore,
    /// `AUTHORITY_UNAVAILABLE` issues, consensus failures first
    pub issues: Vec<Issue>,
}

struct Failure {
    authority: Authority,
    resource: Resource,
    err: FetchError,
}

/// Fetch the consensus and the vote of every voting, non-ignored authority
///
/// All the authorities are queried concurrently. A vote that can't be
/// fetched from its authority is tried from every other authority's mirror
/// before giving up on it.
pub async fn collect_documents<F>(fetcher: Arc<F>, directory: &AuthorityDirectory) -> Collected
where
    F: DocumentFetcher + 'static,
{
    let authorities: Vec<Authority> = directory.voting().cloned().collect();
    info!(
        target: LOG_TARGET,
        num_authorities = authorities.len(),
        "Fetching consensuses and votes…"
    );

    let mut consensus_tasks = JoinSet::new();
    let mut vote_tasks = JoinSet::new();

    for authority in &authorities {
        consensus_tasks.spawn(fetch_consensus(fetcher.clone(), authority.clone()));

        let mirrors: Vec<Authority> = authorities
            .iter()
            .filter(|mirror| mirror.nickname != authority.nickname)
            .cloned()
            .collect();
        vote_tasks.spawn(fetch_vote(fetcher.clone(), authority.clone(), mirrors));
    }

    let mut collected = Collected::default();
    let mut consensus_failures = BTreeMap::new();
    let mut vote_failures = BTreeMap::new();

    while let Some(res) = consensus_tasks.join_next().await {
        match res {
            Ok((authority, Ok((consensus, elapsed)))) => {
                collected
                    .store
                    .consensus_fetch_times
                    .insert(authority.nickname.clone(), elapsed);
                collected
                    .store
                    .consensuses
                    .insert(authority.nickname, consensus);
            }
            Ok((authority, Err(err))) => {
                consensus_failures.insert(
                    authority.nickname.clone(),
                    Failure {
                        authority,
                        resource: Resource::Consensus,
                        err,
                    },
                );
            }
            Err(err) => {
                error!(target: LOG_TARGET, err = %err.fmt_compact(), "Consensus fetch task failed");
            }
        }
    }
    // Authorities whose task died without an outcome
    for authority in &authorities {
        if !collected.store.consensuses.contains_key(&authority.nickname)
            && !consensus_failures.contains_key(&authority.nickname)
        {
            consensus_failures.insert(
                authority.nickname.clone(),
                task_failure(authority, Resource::Consensus),
            );
        }
    }

    while let Some(res) = vote_tasks.join_next().await {
        match res {
            Ok((authority, Ok(vote))) => {
                collected.store.votes.insert(authority.nickname, vote);
            }
            Ok((authority, Err(err))) => {
                vote_failures.insert(
                    authority.nickname.clone(),
                    Failure {
                        authority,
                        resource: Resource::Vote,
                        err,
                    },
                );
            }
            Err(err) => {
                error!(target: LOG_TARGET, err = %err.fmt_compact(), "Vote fetch task failed");
            }
        }
    }
    for authority in &authorities {
        if !collected.store.votes.contains_key(&authority.nickname)
            && !vote_failures.contains_key(&authority.nickname)
        {
            vote_failures.insert(
                authority.nickname.clone(),
                task_failure(authority, Resource::Vote),
            );
        }
    }

    collected.issues = consensus_failures
        .into_values()
        .chain(vote_failures.into_values())
        .map(|failure| unavailable_issue(fetcher.as_ref(), failure))
        .collect();

    debug!(
        target: LOG_TARGET,
        consensuses = collected.store.consensuses.len(),
        votes = collected.store.votes.len(),
        failures = collected.issues.len(),
        "Finished fetching documents"
    );

    collected
}

async fn fetch_consensus<F>(
    fetcher: Arc<F>,
    authority: Authority,
) -> (Authority, FetchResult<(Consensus, Duration)>)
where
    F: DocumentFetcher,
{
    let start = Instant::now();
    let res = fetcher.fetch_consensus(&authority).await;
    let elapsed = start.elapsed();

    if let Err(err) = &res {
        warn!(
            target: LOG_TARGET,
            authority = %authority.nickname,
            err = %err.fmt_compact(),
            "Failed to fetch consensus"
        );
    }

    let res = res.map(|consensus| (consensus, elapsed));
    (authority, res)
}

async fn fetch_vote<F>(
    fetcher: Arc<F>,
    authority: Authority,
    mirrors: Vec<Authority>,
) -> (Authority, FetchResult<Vote>)
where
    F: DocumentFetcher,
{
    let err = match fetcher.fetch_vote(&authority, &Resource::Vote).await {
        Ok(vote) => return (authority, Ok(vote)),
        Err(err) => err,
    };
    warn!(
        target: LOG_TARGET,
        authority = %authority.nickname,
        err = %err.fmt_compact(),
        "Failed to fetch vote, trying mirrors"
    );

    if let Some(v3ident) = &authority.v3ident {
        let resource = Resource::MirroredVote(v3ident.clone());

        for mirror in &mirrors {
            match fetcher.fetch_vote(mirror, &resource).await {
                Ok(vote) => {
                    info!(
                        target: LOG_TARGET,
                        authority = %authority.nickname,
                        mirror = %mirror.nickname,
                        "Fetched vote from mirror"
                    );
                    return (authority, Ok(vote));
                }
                Err(mirror_err) => {
                    debug!(
                        target: LOG_TARGET,
                        authority = %authority.nickname,
                        mirror = %mirror.nickname,
                        err = %mirror_err.fmt_compact(),
                        "Mirror doesn't have the vote either"
                    );
                }
            }
        }
    }

    (authority, Err(err))
}

fn task_failure(authority: &Authority, resource: Resource) -> Failure {
    Failure {
        authority: authority.clone(),
        resource,
        err: UnavailableSnafu {
            reason: "fetch task failed",
        }
        .build(),
    }
}

fn unavailable_issue<F>(fetcher: &F, failure: Failure) -> Issue
where
    F: DocumentFetcher + ?Sized,
{
    let Failure {
        authority,
        resource,
        err,
    } = failure;

    Issue::new(Runlevel::Error, IssueKind::AuthorityUnavailable)
        .attr("fetch_type", resource.fetch_type())
        .attr("authority", authority.nickname.as_str())
        .attr("url", fetcher.url(&authority, &resource))
        .attr("error", err.fmt_compact().to_string())
        .concerning([authority.nickname.as_str()])
}
