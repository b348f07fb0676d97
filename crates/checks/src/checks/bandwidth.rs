use std::collections::BTreeSet;

use super::join;
use crate::CheckResult;
use crate::engine::CheckInput;
use crate::issue::{Issue, IssueKind, Runlevel};

/// Bandwidth authorities may leave at most this share of relays unmeasured
const MAX_UNMEASURED_PERCENT: u64 = 5;

/// Allowed deviation of a measurement count from the average, in percent
const MEASUREMENT_COUNT_TOLERANCE_PERCENT: u64 = 20;

/// Checks that we have bandwidth scanner results from the authorities that
/// are supposed to run them, and only from them
pub fn voting_bandwidth_scanners(input: &CheckInput<'_>) -> CheckResult<Vec<Issue>> {
    let mut missing = vec![];
    let mut extra = vec![];

    for (authority, vote) in &input.store.votes {
        let is_bandwidth_authority = input.ctx.directory.is_bandwidth_authority(authority);

        match (is_bandwidth_authority, vote.has_measurements()) {
            (true, false) => missing.push(authority.as_str()),
            (false, true) => extra.push(authority.as_str()),
            _ => {}
        }
    }

    let mut issues = vec![];

    if !missing.is_empty() {
        let runlevel = if 1 < missing.len() {
            Runlevel::Error
        } else {
            Runlevel::Warning
        };
        issues.push(
            Issue::new(runlevel, IssueKind::MissingBandwidthScanners)
                .attr("authorities", join(&missing))
                .concerning(missing),
        );
    }

    if !extra.is_empty() {
        issues.push(
            Issue::new(Runlevel::Notice, IssueKind::ExtraBandwidthScanners)
                .attr("authorities", join(&extra))
                .concerning(extra),
        );
    }

    Ok(issues)
}

/// Checks that the bandwidth authorities have measured nearly all the
/// relays in the consensus
pub fn unmeasured_relays(input: &CheckInput<'_>) -> CheckResult<Vec<Issue>> {
    let mut issues = vec![];

    for (authority, vote) in &input.store.votes {
        if !input.ctx.directory.is_bandwidth_authority(authority) {
            continue;
        }

        let (measured, unmeasured) = vote
            .routers
            .values()
            .filter(|router| input.latest.routers.contains_key(&router.fingerprint))
            .fold((0u64, 0u64), |(measured, unmeasured), router| {
                if router.is_measured() {
                    (measured + 1, unmeasured)
                } else {
                    (measured, unmeasured + 1)
                }
            });

        let total = measured + unmeasured;
        if total == 0 {
            continue;
        }

        let percentage = 100 * unmeasured / total;
        if MAX_UNMEASURED_PERCENT <= percentage {
            issues.push(
                Issue::new(Runlevel::Notice, IssueKind::TooManyUnmeasuredRelays)
                    .attr("authority", authority.as_str())
                    .attr("unmeasured", unmeasured)
                    .attr("total", total)
                    .attr("percentage", percentage)
                    .concerning([authority.as_str()]),
            );
        }
    }

    Ok(issues)
}

/// Checks that the bandwidth authorities report roughly the same number of
/// measurements
///
/// Alarms if any of them deviates by more than 20% from the average.
pub fn bandwidth_authorities_in_sync(input: &CheckInput<'_>) -> CheckResult<Vec<Issue>> {
    let counts: Vec<(&str, u64)> = input
        .store
        .votes
        .iter()
        .filter(|(authority, _)| input.ctx.directory.is_bandwidth_authority(authority))
        .map(|(authority, vote)| (authority.as_str(), vote.num_measured() as u64))
        .filter(|(_, count)| 0 < *count)
        .collect();

    if counts.is_empty() {
        return Ok(vec![]);
    }

    // Compare `count * n` to `sum * (100 ± tolerance) / 100` to stay in integers
    let n = counts.len() as u64;
    let sum: u64 = counts.iter().map(|(_, count)| count).sum();
    let out_of_sync = counts.iter().any(|(_, count)| {
        let scaled = count * n * 100;
        sum * (100 + MEASUREMENT_COUNT_TOLERANCE_PERCENT) < scaled
            || scaled < sum * (100 - MEASUREMENT_COUNT_TOLERANCE_PERCENT)
    });

    if !out_of_sync {
        return Ok(vec![]);
    }

    let entries: Vec<String> = counts
        .iter()
        .map(|(authority, count)| format!("{authority} ({count})"))
        .collect();
    let authorities: BTreeSet<&str> = counts.iter().map(|(authority, _)| *authority).collect();

    Ok(vec![
        Issue::new(Runlevel::Notice, IssueKind::BandwidthAuthoritiesOutOfSync)
            .attr("authorities", join(&entries))
            .concerning(authorities),
    ])
}
