use super::{AttrValue, Issue, IssueKind, Runlevel};

#[test]
fn runlevels_are_ordered_by_severity() {
    assert!(Runlevel::Notice < Runlevel::Warning);
    assert!(Runlevel::Warning < Runlevel::Error);
    assert_eq!(Runlevel::Notice.default_suppression_hours(), 24);
    assert_eq!(Runlevel::Warning.default_suppression_hours(), 4);
    assert_eq!(Runlevel::Error.default_suppression_hours(), 0);
}

#[test]
fn issue_kind_ids_are_unique() {
    let mut ids: Vec<_> = IssueKind::ALL.iter().map(|k| k.as_str()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), IssueKind::ALL.len());
}

#[test]
fn stable_attrs_zero_only_volatile_ones() {
    let issue = Issue::new(Runlevel::Notice, IssueKind::TooManyUnmeasuredRelays)
        .attr("authority", "moria1")
        .attr("unmeasured", 40usize)
        .attr("total", 400usize)
        .attr("percentage", 10i64)
        .concerning(["moria1"]);

    let stable = issue.stable_attrs();
    assert_eq!(stable.get("authority"), Some(&AttrValue::from("moria1")));
    assert_eq!(stable.get("unmeasured"), Some(&AttrValue::Number(0)));
    assert_eq!(stable.get("total"), Some(&AttrValue::Number(0)));
    assert_eq!(stable.get("percentage"), Some(&AttrValue::Number(0)));

    // original untouched
    assert_eq!(issue.get_attr("total"), Some(&AttrValue::Number(400)));
    assert_eq!(
        issue.concerned_authorities().iter().collect::<Vec<_>>(),
        ["moria1"]
    );
}

#[test]
fn text_attributes_zero_to_empty() {
    let issue = Issue::new(Runlevel::Notice, IssueKind::BandwidthAuthoritiesOutOfSync)
        .attr("authorities", "moria1 (100), tor26 (50)");

    assert_eq!(
        issue.stable_attrs().get("authorities"),
        Some(&AttrValue::Text(String::new()))
    );
}
