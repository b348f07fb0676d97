use std::time::Duration;

use crate::CheckResult;
use crate::engine::CheckInput;
use crate::issue::{Issue, IssueKind, Runlevel};

/// Downloads slower than this multiple of the median are outliers
const SLOW_DOWNLOAD_FACTOR: u32 = 5;

/// Checks that every authority accepted connections on its OR ports
pub fn authorities_reachable(input: &CheckInput<'_>) -> CheckResult<Vec<Issue>> {
    let mut issues = vec![];

    for (authority, probes) in &input.store.reachability {
        if input.ctx.directory.is_ignored(authority) {
            continue;
        }

        for probe in probes {
            let Some(error) = &probe.error else {
                continue;
            };
            issues.push(
                Issue::new(Runlevel::Warning, IssueKind::AuthorityUnreachable)
                    .attr("authority", authority.as_str())
                    .attr("address", probe.endpoint.to_string())
                    .attr("error", error.as_str())
                    .concerning([authority.as_str()]),
            );
        }
    }

    Ok(issues)
}

/// Checks for authorities that took much longer than the rest to serve
/// their consensus
pub fn slow_consensus_downloads(input: &CheckInput<'_>) -> CheckResult<Vec<Issue>> {
    let times = &input.store.consensus_fetch_times;
    let Some(median) = median(times.values().copied()) else {
        return Ok(vec![]);
    };
    if median.is_zero() {
        return Ok(vec![]);
    }

    let threshold = median.saturating_mul(SLOW_DOWNLOAD_FACTOR);

    Ok(times
        .iter()
        .filter(|(_, duration)| threshold < **duration)
        .map(|(authority, duration)| {
            Issue::new(Runlevel::Notice, IssueKind::SlowConsensusDownload)
                .attr("authority", authority.as_str())
                .attr("duration", millis(*duration))
                .attr("median", millis(median))
                .concerning([authority.as_str()])
        })
        .collect())
}

fn median(durations: impl Iterator<Item = Duration>) -> Option<Duration> {
    let mut durations: Vec<_> = durations.collect();
    if durations.is_empty() {
        return None;
    }
    durations.sort_unstable();

    let mid = durations.len() / 2;
    Some(if durations.len() % 2 == 0 {
        (durations[mid - 1] + durations[mid]) / 2
    } else {
        durations[mid]
    })
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
