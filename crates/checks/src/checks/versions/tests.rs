use super::{different_recommended_client_version, different_recommended_server_version};
use crate::testing::{TEST_VERSIONS, VoteBuilder, attr, healthy_network, run_check};

#[test]
fn matching_versions_are_fine() {
    let (ctx, mut store) = healthy_network(&["moria1", "tor26", "dizum"]);
    assert!(run_check(different_recommended_client_version, &store, &ctx).is_empty());

    // Same versions in a different order, and a vote with no opinion
    let valid_after = store.votes["tor26"].valid_after;
    store.votes.insert(
        "tor26".into(),
        VoteBuilder::new(valid_after)
            .client_versions(&[TEST_VERSIONS[1], TEST_VERSIONS[0]])
            .build(),
    );
    store.votes.insert(
        "dizum".into(),
        VoteBuilder::new(valid_after).client_versions(&[]).build(),
    );
    assert!(run_check(different_recommended_client_version, &store, &ctx).is_empty());
}

#[test]
fn one_extra_client_version() {
    let (ctx, mut store) = healthy_network(&["moria1", "tor26", "dizum"]);
    let valid_after = store.votes["tor26"].valid_after;
    store.votes.insert(
        "tor26".into(),
        VoteBuilder::new(valid_after)
            .client_versions(&[TEST_VERSIONS[0], TEST_VERSIONS[1], "0.4.9.2-alpha"])
            .build(),
    );

    let issues = run_check(different_recommended_client_version, &store, &ctx);
    assert_eq!(issues.len(), 1);
    assert_eq!(attr(&issues[0], "type"), "client");
    let differences = attr(&issues[0], "differences");
    assert_eq!(differences, "tor26 +0.4.9.2-alpha");
    assert!(!differences.contains(" -"));
    assert!(run_check(different_recommended_server_version, &store, &ctx).is_empty());
}

#[test]
fn server_versions_report_both_directions() {
    let (ctx, mut store) = healthy_network(&["moria1", "tor26", "dizum"]);
    let valid_after = store.votes["dizum"].valid_after;
    store.votes.insert(
        "dizum".into(),
        VoteBuilder::new(valid_after)
            .server_versions(&[TEST_VERSIONS[0], "0.4.9.2-alpha"])
            .build(),
    );

    let issues = run_check(different_recommended_server_version, &store, &ctx);
    assert_eq!(attr(&issues[0], "type"), "server");
    assert_eq!(
        attr(&issues[0], "differences"),
        "dizum +0.4.9.2-alpha -0.4.9.1-alpha"
    );
    assert!(issues[0].concerned_authorities().contains("dizum"));
}
