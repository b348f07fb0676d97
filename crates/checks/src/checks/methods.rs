use super::join;
use crate::CheckResult;
use crate::engine::CheckInput;
use crate::issue::{Issue, IssueKind, Runlevel};

/// Checks that all of the votes support the present consensus method
pub fn consensus_method_unsupported(input: &CheckInput<'_>) -> CheckResult<Vec<Issue>> {
    let method = input.latest.consensus_method;
    let incompatible: Vec<&str> = input
        .store
        .votes
        .iter()
        .filter(|(_, vote)| !vote.consensus_methods.contains(&method))
        .map(|(authority, _)| authority.as_str())
        .collect();

    if incompatible.is_empty() {
        return Ok(vec![]);
    }

    Ok(vec![
        Issue::new(Runlevel::Warning, IssueKind::ConsensusMethodUnsupported)
            .attr("authorities", join(&incompatible))
            .concerning(incompatible),
    ])
}
