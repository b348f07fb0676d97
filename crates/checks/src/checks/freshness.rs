use time::Duration;

use super::join;
use crate::CheckResult;
use crate::engine::CheckInput;
use crate::issue::{Issue, IssueKind, Runlevel};

/// How old a consensus can get before it's considered stale
pub(crate) const FRESHNESS: Duration = Duration::HOUR;

/// Stale consensuses from more than this many authorities are an error
const MAX_STALE_BEFORE_ERROR: usize = 3;

/// Checks that none of the consensuses are more than an hour old
pub fn missing_latest_consensus(input: &CheckInput<'_>) -> CheckResult<Vec<Issue>> {
    let stale: Vec<&str> = input
        .store
        .consensuses
        .iter()
        .filter(|(_, consensus)| FRESHNESS < input.ctx.now - consensus.valid_after)
        .map(|(authority, _)| authority.as_str())
        .collect();

    if stale.is_empty() {
        return Ok(vec![]);
    }

    let runlevel = if MAX_STALE_BEFORE_ERROR < stale.len() {
        Runlevel::Error
    } else {
        Runlevel::Warning
    };

    Ok(vec![
        Issue::new(runlevel, IssueKind::MissingLatestConsensus)
            .attr("authorities", join(&stale))
            .concerning(stale),
    ])
}
