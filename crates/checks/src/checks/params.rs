use super::join;
use crate::CheckResult;
use crate::engine::CheckInput;
use crate::issue::{Issue, IssueKind, Runlevel};

/// Checks that votes don't contain any parameters that we don't recognize
pub fn unknown_consensus_parameters(input: &CheckInput<'_>) -> CheckResult<Vec<Issue>> {
    let mut authorities = vec![];
    let mut entries = vec![];

    for (authority, vote) in &input.store.votes {
        let unknown: Vec<String> = vote
            .params
            .iter()
            .filter(|(name, _)| !input.ctx.is_known_param(name))
            .map(|(name, value)| format!("{name}={value}"))
            .collect();

        if !unknown.is_empty() {
            entries.push(format!("{authority} {}", unknown.join(" ")));
            authorities.push(authority.as_str());
        }
    }

    if entries.is_empty() {
        return Ok(vec![]);
    }

    Ok(vec![
        Issue::new(Runlevel::Notice, IssueKind::UnknownConsensusParameters)
            .attr("parameters", join(&entries))
            .concerning(authorities),
    ])
}

/// Checks that all vote parameters appear in the consensus with the same
/// value
pub fn vote_parameters_mismatch_consensus(input: &CheckInput<'_>) -> CheckResult<Vec<Issue>> {
    let mut authorities = vec![];
    let mut entries = vec![];

    for (authority, vote) in &input.store.votes {
        let mismatching: Vec<String> = vote
            .params
            .iter()
            .filter(|(name, value)| input.latest.params.get(*name) != Some(*value))
            .map(|(name, value)| format!("{name}={value}"))
            .collect();

        if !mismatching.is_empty() {
            entries.push(format!("{authority} {}", mismatching.join(" ")));
            authorities.push(authority.as_str());
        }
    }

    if entries.is_empty() {
        return Ok(vec![]);
    }

    Ok(vec![
        Issue::new(Runlevel::Notice, IssueKind::MismatchConsensusParameters)
            .attr("parameters", join(&entries))
            .concerning(authorities),
    ])
}

#[cfg(test)]
mod tests;
