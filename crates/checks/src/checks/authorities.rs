use std::collections::BTreeSet;

use dirhealth_doc_core::flag::Flag;
use dirhealth_doc_core::version::TorVersion;

use super::join;
use crate::CheckResult;
use crate::engine::CheckInput;
use crate::issue::{Issue, IssueKind, Runlevel};

/// Checks that the authorities have the `Authority` flag in the present
/// consensus, and nobody else does
pub fn has_authority_flag(input: &CheckInput<'_>) -> CheckResult<Vec<Issue>> {
    let seen: BTreeSet<&str> = input
        .latest
        .routers
        .values()
        .filter(|router| router.has_flag(&Flag::Authority))
        .map(|router| router.nickname.as_str())
        .collect();

    let directory = &input.ctx.directory;
    let missing: Vec<&str> = directory
        .active()
        .map(|authority| authority.nickname.as_str())
        .filter(|nickname| !seen.contains(nickname))
        .collect();
    let extra: Vec<&str> = seen
        .iter()
        .copied()
        .filter(|nickname| directory.get(nickname).is_none())
        .collect();

    let mut issues = vec![];

    if !missing.is_empty() {
        issues.push(
            Issue::new(Runlevel::Warning, IssueKind::MissingAuthorities)
                .attr("authorities", join(&missing))
                .concerning(missing),
        );
    }

    if !extra.is_empty() {
        issues.push(
            Issue::new(Runlevel::Notice, IssueKind::ExtraAuthorities)
                .attr("authorities", join(&extra))
                .concerning(extra),
        );
    }

    Ok(issues)
}

/// Checks that the authorities run at least the oldest recommended server
/// version
pub fn is_recommended_versions(input: &CheckInput<'_>) -> CheckResult<Vec<Issue>> {
    let Some(min_version) = input
        .latest
        .server_versions
        .iter()
        .filter_map(|version| version.parse::<TorVersion>().ok())
        .min()
    else {
        return Ok(vec![]);
    };

    let mut outdated = vec![];
    let mut entries = vec![];

    for authority in input.ctx.directory.active() {
        let Some(version) = input
            .latest
            .routers
            .get(&authority.fingerprint)
            .and_then(|router| router.version.as_ref())
        else {
            continue;
        };

        if *version < min_version {
            entries.push(format!("{} ({version})", authority.nickname));
            outdated.push(authority.nickname.as_str());
        }
    }

    if outdated.is_empty() {
        return Ok(vec![]);
    }

    Ok(vec![
        Issue::new(Runlevel::Warning, IssueKind::TorOutOfDate)
            .attr("authorities", join(&entries))
            .concerning(outdated),
    ])
}

/// Checks that routers named after authorities have the fingerprints we
/// expect
pub fn has_expected_fingerprints(input: &CheckInput<'_>) -> CheckResult<Vec<Issue>> {
    let mut issues = vec![];

    for router in input.latest.routers.values() {
        if !router.has_flag(&Flag::Named) {
            continue;
        }
        let Some(authority) = input.ctx.directory.get(&router.nickname) else {
            continue;
        };

        if router.fingerprint != authority.fingerprint {
            issues.push(
                Issue::new(Runlevel::Error, IssueKind::FingerprintMismatch)
                    .attr("authority", router.nickname.as_str())
                    .attr("expected", authority.fingerprint.to_string())
                    .attr("actual", router.fingerprint.to_string())
                    .concerning([router.nickname.as_str()]),
            );
        }
    }

    Ok(issues)
}

#[cfg(test)]
mod tests;
