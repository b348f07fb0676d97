use dirhealth_doc_core::flag::Flag;

use super::{has_authority_flag, has_expected_fingerprints, is_recommended_versions};
use crate::issue::IssueKind;
use crate::testing::{
    ConsensusBuilder, attr, authority_router, fingerprint, healthy_network, router, run_check,
};

#[test]
fn missing_and_extra_authority_flags() {
    let (ctx, mut store) = healthy_network(&["moria1", "tor26", "dizum"]);
    assert!(run_check(has_authority_flag, &store, &ctx).is_empty());

    let moria1 = ctx.directory.get("moria1").expect("Known");
    let mut impostor = router("impostor", fingerprint(777));
    impostor.flags.insert(Flag::Authority);

    let valid_after = store.consensuses["moria1"].valid_after;
    store.consensuses.insert(
        "moria1".into(),
        ConsensusBuilder::new(valid_after)
            .router(authority_router(moria1))
            .router(router("tor26", ctx.directory.get("tor26").expect("Known").fingerprint.clone()))
            .router(impostor)
            .build(),
    );

    let issues = run_check(has_authority_flag, &store, &ctx);
    assert_eq!(issues.len(), 2);
    assert_eq!(issues[0].kind(), IssueKind::MissingAuthorities);
    assert_eq!(attr(&issues[0], "authorities"), "dizum, tor26");
    assert_eq!(issues[1].kind(), IssueKind::ExtraAuthorities);
    assert_eq!(attr(&issues[1], "authorities"), "impostor");
}

#[test]
fn outdated_authorities() {
    let (ctx, mut store) = healthy_network(&["moria1", "tor26", "dizum"]);
    assert!(run_check(is_recommended_versions, &store, &ctx).is_empty());

    let mut consensus = store.consensuses["moria1"].clone();
    let tor26 = &ctx.directory.get("tor26").expect("Known").fingerprint;
    if let Some(entry) = consensus.routers.get_mut(tor26) {
        entry.version = Some("0.4.7.16".parse().expect("Valid version"));
    }
    store.consensuses.insert("moria1".into(), consensus);

    let issues = run_check(is_recommended_versions, &store, &ctx);
    assert_eq!(issues.len(), 1);
    assert_eq!(attr(&issues[0], "authorities"), "tor26 (0.4.7.16)");
    assert!(issues[0].concerned_authorities().contains("tor26"));

    // Without any parseable recommendation there's nothing to compare to
    let mut consensus = store.consensuses["moria1"].clone();
    consensus.server_versions = vec!["bogus".into()];
    store.consensuses.insert("moria1".into(), consensus);
    assert!(run_check(is_recommended_versions, &store, &ctx).is_empty());
}

#[test]
fn named_authority_with_wrong_fingerprint() {
    let (ctx, mut store) = healthy_network(&["moria1", "tor26", "dizum"]);
    let mut named = router("moria1", fingerprint(4242));
    named.flags.insert(Flag::Named);
    let mut unnamed_impostor = router("tor26", fingerprint(4243));
    unnamed_impostor.flags.insert(Flag::Unnamed);

    let valid_after = store.consensuses["moria1"].valid_after;
    store.consensuses.insert(
        "moria1".into(),
        ConsensusBuilder::new(valid_after)
            .router(named)
            .router(unnamed_impostor)
            .build(),
    );

    let issues = run_check(has_expected_fingerprints, &store, &ctx);
    assert_eq!(issues.len(), 1);
    assert_eq!(attr(&issues[0], "authority"), "moria1");
    assert_eq!(attr(&issues[0], "expected"), fingerprint(1).to_string());
    assert_eq!(attr(&issues[0], "actual"), fingerprint(4242).to_string());
}
