use std::collections::{BTreeMap, BTreeSet};

use dirhealth_doc_core::fingerprint::Fingerprint;
use dirhealth_doc_core::flag::Flag;

use super::join;
use crate::CheckResult;
use crate::engine::CheckInput;
use crate::issue::{Issue, IssueKind, Runlevel};

/// Checks that the authorities voting on the `BadExit` flag agree with each
/// other
///
/// A relay is only out of sync if some authority actively left it without
/// the flag: an authority that didn't list the relay at all has no opinion.
/// Relays gone from the latest consensus are ignored as churn.
pub fn bad_exits_in_sync(input: &CheckInput<'_>) -> CheckResult<Vec<Issue>> {
    let flag = Flag::BadExit;

    let voting: BTreeMap<&str, BTreeSet<&Fingerprint>> = input
        .store
        .votes
        .iter()
        .filter(|(_, vote)| vote.votes_on(&flag))
        .map(|(authority, vote)| {
            let flagged: BTreeSet<&Fingerprint> = vote
                .routers
                .values()
                .filter(|router| router.has_flag(&flag))
                .map(|router| &router.fingerprint)
                .collect();
            (authority.as_str(), flagged)
        })
        .collect();

    let all_flagged: BTreeSet<&Fingerprint> = voting.values().flatten().copied().collect();

    let mut issues = vec![];

    for fingerprint in all_flagged {
        if !input.latest.routers.contains_key(fingerprint) {
            continue;
        }

        let mut with_flag = vec![];
        let mut without_flag = vec![];
        for (authority, flagged) in &voting {
            if flagged.contains(fingerprint) {
                with_flag.push(*authority);
            } else if input.store.votes[*authority]
                .routers
                .contains_key(fingerprint)
            {
                without_flag.push(*authority);
            }
        }

        if without_flag.is_empty() {
            continue;
        }

        issues.push(
            Issue::new(Runlevel::Notice, IssueKind::BadExitOutOfSync)
                .attr("fingerprint", fingerprint.to_string())
                .attr("with_flag", join(&with_flag))
                .attr("without_flag", join(&without_flag))
                .concerning(voting.keys().copied()),
        );
    }

    Ok(issues)
}
