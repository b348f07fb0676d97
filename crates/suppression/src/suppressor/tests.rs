use dirhealth_checks::issue::{Issue, IssueKind, RenderedIssue, Runlevel};
use dirhealth_doc_core::timestamp::Timestamp;

use super::{GRACE_PERIOD_SECS, Suppressor};
use crate::{FileSuppressionStore, MemorySuppressionStore, SuppressionStore as _};

const NOW: u64 = 1_700_000_000;
const HOUR: u64 = 3600;

fn rendered(key: &str, hours: u32) -> RenderedIssue {
    RenderedIssue {
        issue: Issue::new(Runlevel::Notice, IssueKind::MissingVotes),
        message: key.replace('_', " "),
        suppression_key: key.to_owned(),
        suppression_hours: hours,
    }
}

#[test_log::test(tokio::test)]
async fn suppressed_until_duration_and_grace_elapse() {
    let mut suppressor = Suppressor::new(MemorySuppressionStore::new());
    let issue = rendered("Missing_votes_from_dizum", 4);
    let now = Timestamp::from(NOW);

    // Checking doesn't change anything
    assert!(!suppressor.is_suppressed(&issue, now));
    assert!(!suppressor.is_suppressed(&issue, now));

    suppressor.record_sent(&issue, now).await.expect("Records");
    assert!(suppressor.is_suppressed(&issue, now));

    let window = 4 * HOUR + GRACE_PERIOD_SECS;
    assert!(suppressor.is_suppressed(&issue, now.saturating_add_secs(4 * HOUR)));
    assert!(suppressor.is_suppressed(&issue, now.saturating_add_secs(window - 1)));
    assert!(!suppressor.is_suppressed(&issue, now.saturating_add_secs(window)));

    // Keyed by the suppression key only
    let other = rendered("Missing_votes_from_tor26", 4);
    assert!(!suppressor.is_suppressed(&other, now));
}

#[test_log::test(tokio::test)]
async fn zero_duration_is_never_suppressed() {
    let mut suppressor = Suppressor::new(MemorySuppressionStore::new());
    let issue = rendered("Unable_to_retrieve_the_consensus", 0);
    let now = Timestamp::from(NOW);

    suppressor.record_sent(&issue, now).await.expect("Records");
    assert!(!suppressor.is_suppressed(&issue, now));
    assert!(suppressor.store().is_empty());
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
async fn record_sent_persists_immediately() {
    let dir = tempfile::tempdir().expect("Tempdir");
    let path = dir.path().join("state.json");
    let issue = rendered("Extra_authorities:_impostor", 24);
    let now = Timestamp::from(NOW);

    let mut suppressor = Suppressor::new(FileSuppressionStore::open(&path).await.expect("Opens"));
    suppressor.record_sent(&issue, now).await.expect("Records");

    let reopened = Suppressor::new(FileSuppressionStore::open(&path).await.expect("Opens"));
    assert_eq!(reopened.store().get(&issue.suppression_key), Some(now));
    assert!(reopened.is_suppressed(&issue, now.saturating_add_secs(23 * HOUR)));
    assert!(!reopened.is_suppressed(&issue, now.saturating_add_secs(25 * HOUR)));
}
