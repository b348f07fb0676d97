use std::collections::BTreeSet;

use dirhealth_doc_core::document::Vote;

use super::join;
use crate::CheckResult;
use crate::engine::CheckInput;
use crate::issue::{Issue, IssueKind, Runlevel};

/// Checks that the recommended tor versions for clients match the present
/// consensus
pub fn different_recommended_client_version(input: &CheckInput<'_>) -> CheckResult<Vec<Issue>> {
    Ok(different_versions(
        "client",
        &input.latest.client_versions,
        input.store.votes.iter().map(|(a, v)| (a.as_str(), v)),
        |vote| &vote.client_versions,
    ))
}

/// Checks that the recommended tor versions for servers match the present
/// consensus
pub fn different_recommended_server_version(input: &CheckInput<'_>) -> CheckResult<Vec<Issue>> {
    Ok(different_versions(
        "server",
        &input.latest.server_versions,
        input.store.votes.iter().map(|(a, v)| (a.as_str(), v)),
        |vote| &vote.server_versions,
    ))
}

fn different_versions<'a>(
    version_type: &'static str,
    consensus_versions: &[String],
    votes: impl Iterator<Item = (&'a str, &'a Vote)>,
    versions_of: impl Fn(&Vote) -> &Vec<String>,
) -> Vec<Issue> {
    let consensus_versions: BTreeSet<&str> = consensus_versions.iter().map(String::as_str).collect();

    let mut authorities = vec![];
    let mut differences = vec![];

    for (authority, vote) in votes {
        let vote_versions: BTreeSet<&str> = versions_of(vote).iter().map(String::as_str).collect();

        // An authority that doesn't recommend anything has no opinion
        if vote_versions.is_empty() || vote_versions == consensus_versions {
            continue;
        }

        differences.push(version_difference(
            authority,
            &consensus_versions,
            &vote_versions,
        ));
        authorities.push(authority);
    }

    if differences.is_empty() {
        return vec![];
    }

    vec![
        Issue::new(Runlevel::Notice, IssueKind::DifferentRecommendedVersion)
            .attr("type", version_type)
            .attr("differences", join(&differences))
            .concerning(authorities),
    ]
}

/// Delta between the consensus and vote versions, like
/// `moria1 +0.4.9.1-alpha -0.4.7.16`
fn version_difference(
    authority: &str,
    consensus_versions: &BTreeSet<&str>,
    vote_versions: &BTreeSet<&str>,
) -> String {
    let mut msg = authority.to_owned();

    for extra in vote_versions.difference(consensus_versions) {
        msg.push_str(" +");
        msg.push_str(extra);
    }
    for missing in consensus_versions.difference(vote_versions) {
        msg.push_str(" -");
        msg.push_str(missing);
    }

    msg
}

#[cfg(test)]
mod tests;
