use std::collections::BTreeSet;

use super::freshness::FRESHNESS;
use super::join;
use crate::CheckResult;
use crate::engine::CheckInput;
use crate::issue::{Issue, IssueKind, Runlevel};

/// Checks that all fresh consensuses are made up of the same votes
pub fn consensuses_have_same_votes(input: &CheckInput<'_>) -> CheckResult<Vec<Issue>> {
    let fresh: Vec<_> = input
        .store
        .consensuses
        .iter()
        .filter(|(_, consensus)| input.ctx.now - consensus.valid_after < FRESHNESS)
        .map(|(authority, consensus)| (authority.as_str(), consensus.voting_identities()))
        .collect();

    let all_votes: BTreeSet<_> = fresh
        .iter()
        .flat_map(|(_, voters)| voters.iter().copied())
        .collect();

    let missing_votes: Vec<&str> = fresh
        .iter()
        .filter(|(_, voters)| *voters != all_votes)
        .map(|(authority, _)| *authority)
        .collect();

    if missing_votes.is_empty() {
        return Ok(vec![]);
    }

    Ok(vec![
        Issue::new(Runlevel::Notice, IssueKind::MissingVotes)
            .attr("authorities", join(&missing_votes))
            .concerning(missing_votes),
    ])
}

/// Checks that the consensuses have signatures for authorities that voted
/// on them
pub fn has_all_signatures(input: &CheckInput<'_>) -> CheckResult<Vec<Issue>> {
    let mut issues = vec![];

    for (consensus_of, consensus) in &input.store.consensuses {
        let signing = consensus.signing_identities();

        // Translated to nicknames where we know them
        let missing: BTreeSet<String> = consensus
            .voting_identities()
            .difference(&signing)
            .map(|v3ident| input.ctx.directory.nickname_for_v3ident(v3ident))
            .collect();

        if !missing.is_empty() {
            issues.push(
                Issue::new(Runlevel::Notice, IssueKind::MissingSignature)
                    .attr("consensus_of", consensus_of.as_str())
                    .attr("authorities", join(&missing))
                    .concerning(missing),
            );
        }
    }

    Ok(issues)
}
