use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt as _};

use super::{MessageCatalog, SuppressionSetting};
use crate::issue::{Issue, IssueKind, Runlevel};

fn catalog() -> MessageCatalog {
    MessageCatalog::new(
        BTreeMap::from([
            (
                "TOO_MANY_UNMEASURED_RELAYS".to_owned(),
                "As a bandwidth authority {authority} lacked a measurement for {unmeasured} of {total} relays ({percentage}%)".to_owned(),
            ),
            (
                "MISSING_VOTES".to_owned(),
                "The consensuses downloaded from the following authorities are missing votes: {authorities}".to_owned(),
            ),
            (
                "CONSENSUS_METHOD_UNSUPPORTED".to_owned(),
                "Unsupported method: {nope}".to_owned(),
            ),
        ]),
        BTreeMap::from([
            ("MISSING_VOTES".to_owned(), SuppressionSetting::Hours(12)),
            (
                "MISSING_SIGNATURE".to_owned(),
                SuppressionSetting::Text("six".to_owned()),
            ),
            (
                "EXTRA_AUTHORITIES".to_owned(),
                SuppressionSetting::Text(" 48 ".to_owned()),
            ),
        ]),
    )
}

fn unmeasured(unmeasured: usize, total: usize, percentage: i64) -> Issue {
    Issue::new(Runlevel::Notice, IssueKind::TooManyUnmeasuredRelays)
        .attr("authority", "moria1")
        .attr("unmeasured", unmeasured)
        .attr("total", total)
        .attr("percentage", percentage)
        .concerning(["moria1"])
}

#[test_log::test]
fn message_renders_template() {
    let catalog = catalog();
    assert_eq!(
        catalog.message(&unmeasured(40, 400, 10)),
        "As a bandwidth authority moria1 lacked a measurement for 40 of 400 relays (10%)"
    );
}

#[test_log::test]
fn missing_or_broken_template_yields_empty_message() {
    let catalog = catalog();
    let missing = Issue::new(Runlevel::Warning, IssueKind::MissingAuthorities)
        .attr("authorities", "moria1");
    assert_eq!(catalog.message(&missing), "");

    let broken = Issue::new(Runlevel::Warning, IssueKind::ConsensusMethodUnsupported)
        .attr("authorities", "moria1");
    assert_eq!(catalog.message(&broken), "");
}

#[test_log::test]
fn suppression_key_ignores_volatile_counts() {
    let catalog = catalog();
    let key = catalog.suppression_key(&unmeasured(40, 400, 10));

    assert_eq!(key, catalog.suppression_key(&unmeasured(41, 402, 11)));
    assert_eq!(
        key,
        "As_a_bandwidth_authority_moria1_lacked_a_measurement_for_0_of_0_relays_(0%)"
    );
}

#[test_log::test]
fn suppression_key_distinguishes_stable_attributes() {
    let catalog = catalog();
    let a = Issue::new(Runlevel::Notice, IssueKind::MissingVotes).attr("authorities", "moria1");
    let b = Issue::new(Runlevel::Notice, IssueKind::MissingVotes).attr("authorities", "tor26");

    assert_ne!(catalog.suppression_key(&a), catalog.suppression_key(&b));
    assert!(!catalog.suppression_key(&a).contains(' '));
}

#[test_log::test]
fn suppression_key_falls_back_without_template() {
    let catalog = catalog();
    let a = Issue::new(Runlevel::Warning, IssueKind::MissingAuthorities).attr("authorities", "a");
    let b = Issue::new(Runlevel::Warning, IssueKind::MissingAuthorities).attr("authorities", "b");

    assert_eq!(
        catalog.suppression_key(&a),
        "MISSING_AUTHORITIES_authorities=a"
    );
    assert_ne!(catalog.suppression_key(&a), catalog.suppression_key(&b));
}

#[test_log::test]
fn suppression_hours_overrides_and_defaults() {
    let catalog = catalog();

    let votes = Issue::new(Runlevel::Notice, IssueKind::MissingVotes);
    assert_eq!(catalog.suppression_hours(&votes), 12);

    // malformed override falls back to the runlevel default
    let signature = Issue::new(Runlevel::Notice, IssueKind::MissingSignature);
    assert_eq!(catalog.suppression_hours(&signature), 24);

    let extra = Issue::new(Runlevel::Notice, IssueKind::ExtraAuthorities);
    assert_eq!(catalog.suppression_hours(&extra), 48);

    let warning = Issue::new(Runlevel::Warning, IssueKind::MissingAuthorities);
    assert_eq!(catalog.suppression_hours(&warning), 4);

    let error = Issue::new(Runlevel::Error, IssueKind::AuthorityUnavailable);
    assert_eq!(catalog.suppression_hours(&error), 0);
}

#[test_log::test]
fn rendered_issue_displays_runlevel_and_message() {
    let rendered = catalog().render(unmeasured(40, 400, 10));
    assert_eq!(
        rendered.to_string(),
        "NOTICE: As a bandwidth authority moria1 lacked a measurement for 40 of 400 relays (10%)"
    );
    assert_eq!(rendered.suppression_hours, 24);
}

#[test]
fn missing_templates_lists_unconfigured_kinds() {
    let missing = catalog().missing_templates();
    assert!(missing.contains(&IssueKind::AuthorityUnavailable));
    assert!(!missing.contains(&IssueKind::MissingVotes));
}

/// Counts `ERROR` events
#[derive(Clone, Default)]
struct ErrorCounter(Arc<AtomicUsize>);

impl<S: Subscriber> Layer<S> for ErrorCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::ERROR {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

fn errors_logged_by(f: impl FnOnce()) -> usize {
    let counter = ErrorCounter::default();
    let subscriber = tracing_subscriber::registry().with(counter.clone());
    tracing::subscriber::with_default(subscriber, f);
    counter.0.load(Ordering::SeqCst)
}

#[test]
fn render_reports_an_unusable_template_once() {
    let catalog = catalog();

    let missing = Issue::new(Runlevel::Notice, IssueKind::ExtraAuthorities)
        .attr("authorities", "impostor");
    assert_eq!(
        errors_logged_by(|| {
            let rendered = catalog.render(missing);
            assert_eq!(rendered.message, "");
            assert_eq!(rendered.suppression_key, "EXTRA_AUTHORITIES_authorities=impostor");
        }),
        1
    );

    let broken = Issue::new(Runlevel::Warning, IssueKind::ConsensusMethodUnsupported)
        .attr("authorities", "moria1");
    assert_eq!(
        errors_logged_by(|| {
            catalog.render(broken);
        }),
        1
    );
}
