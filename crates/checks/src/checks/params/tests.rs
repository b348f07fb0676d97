use super::{unknown_consensus_parameters, vote_parameters_mismatch_consensus};
use crate::testing::{VoteBuilder, attr, healthy_network, run_check};

#[test]
fn unknown_parameters_are_reported() {
    let (ctx, mut store) = healthy_network(&["moria1", "tor26", "dizum"]);
    assert!(run_check(unknown_consensus_parameters, &store, &ctx).is_empty());

    let valid_after = store.votes["moria1"].valid_after;
    store.votes.insert(
        "moria1".into(),
        VoteBuilder::new(valid_after)
            .param("circwindow", 1000)
            .param("bwauthpid", 1)
            .param("frobnicate", 7)
            .param("zz_extra", -1)
            .build(),
    );

    let issues = run_check(unknown_consensus_parameters, &store, &ctx);
    assert_eq!(issues.len(), 1);
    assert_eq!(
        attr(&issues[0], "parameters"),
        "moria1 frobnicate=7 zz_extra=-1"
    );
}

#[test]
fn mismatching_parameters_are_reported() {
    let (ctx, mut store) = healthy_network(&["moria1", "tor26", "dizum"]);
    assert!(run_check(vote_parameters_mismatch_consensus, &store, &ctx).is_empty());

    let valid_after = store.votes["moria1"].valid_after;
    store.votes.insert(
        "moria1".into(),
        VoteBuilder::new(valid_after).param("circwindow", 500).build(),
    );
    store.votes.insert(
        "tor26".into(),
        VoteBuilder::new(valid_after)
            .param("circwindow", 1000)
            .param("bwauthpid", 1)
            .build(),
    );

    let issues = run_check(vote_parameters_mismatch_consensus, &store, &ctx);
    assert_eq!(
        attr(&issues[0], "parameters"),
        "moria1 circwindow=500, tor26 bwauthpid=1"
    );
    assert_eq!(issues[0].concerned_authorities().len(), 2);
}
