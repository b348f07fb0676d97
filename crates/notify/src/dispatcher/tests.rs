use std::fmt;
use std::sync::{Arc, Mutex};

use dirhealth_checks::issue::{Issue, IssueKind, RenderedIssue, Runlevel};
use dirhealth_doc_core::timestamp::Timestamp;
use dirhealth_suppression::{MemorySuppressionStore, SuppressionStore as _, Suppressor};

use super::{DispatchOutcome, Dispatcher, Recipients, destination_labels};
use crate::{ContactBook, RecordingNotifier};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt as _};

const NOW: u64 = 1_700_000_000;

fn rendered(runlevel: Runlevel, message: &str, hours: u32, concerned: &[&str]) -> RenderedIssue {
    RenderedIssue {
        issue: Issue::new(runlevel, IssueKind::MissingVotes).concerning(concerned.iter().copied()),
        message: message.to_owned(),
        suppression_key: message.replace(' ', "_"),
        suppression_hours: hours,
    }
}

fn contacts() -> ContactBook {
    ContactBook::new(
        [
            ("moria1".to_owned(), "moria1@example.org".to_owned()),
            ("tor26".to_owned(), "tor26@example.org".to_owned()),
        ],
        ["tor26".to_owned()],
    )
}

fn dispatcher(
    notifier: RecordingNotifier,
) -> Dispatcher<RecordingNotifier, MemorySuppressionStore> {
    Dispatcher::new(
        notifier,
        Suppressor::new(MemorySuppressionStore::new()),
        contacts(),
        Recipients::builder()
            .operators(vec!["operators@example.org".to_owned()])
            .announce(vec!["bots@example.org".to_owned()])
            .errors(vec!["admin@example.org".to_owned()])
            .build(),
    )
}

#[test_log::test(tokio::test)]
async fn nothing_to_send() {
    let notifier = RecordingNotifier::new();
    let mut dispatcher = dispatcher(notifier.clone());

    let outcome = dispatcher
        .dispatch(&[], Timestamp::from(NOW))
        .await
        .expect("Dispatches");
    assert_eq!(outcome, DispatchOutcome::NoIssues);
    assert!(notifier.sent().is_empty());
}

#[test_log::test(tokio::test)]
async fn sends_batch_with_routing_and_announcement() {
    let notifier = RecordingNotifier::new();
    let mut dispatcher = dispatcher(notifier.clone());
    let issues = [
        rendered(Runlevel::Notice, "Missing votes from dizum", 24, &["dizum", "moria1"]),
        rendered(Runlevel::Warning, "Signature missing", 4, &["tor26"]),
    ];

    let outcome = dispatcher
        .dispatch(&issues, Timestamp::from(NOW))
        .await
        .expect("Dispatches");
    assert_eq!(outcome, DispatchOutcome::Sent { count: 2 });

    let sent = notifier.sent();
    assert_eq!(sent.len(), 2);

    let report = &sent[0];
    assert_eq!(report.subject, "Consensus issues");
    assert_eq!(report.to, ["operators@example.org"]);
    assert_eq!(report.cc, ["moria1@example.org"]);
    assert_eq!(report.bcc, ["tor26@example.org"]);
    assert_eq!(
        report.body,
        "NOTICE: Missing votes from dizum\nWARNING: Signature missing"
    );

    let announcement = &sent[1];
    assert_eq!(announcement.subject, "Announce or");
    assert_eq!(announcement.to, ["bots@example.org"]);
    assert_eq!(
        announcement.body,
        "[consensus-health] NOTICE: Missing votes from dizum\n\
         [consensus-health] WARNING: Signature missing"
    );

    let store = dispatcher.suppressor().store();
    assert_eq!(
        store.get("Missing_votes_from_dizum"),
        Some(Timestamp::from(NOW))
    );
    assert_eq!(store.len(), 2);
}

#[test_log::test(tokio::test)]
async fn all_or_nothing() {
    let notifier = RecordingNotifier::new();
    let mut dispatcher = dispatcher(notifier.clone());
    let old = rendered(Runlevel::Notice, "Old news", 24, &["moria1"]);
    let now = Timestamp::from(NOW);

    dispatcher
        .dispatch(std::slice::from_ref(&old), now)
        .await
        .expect("Dispatches");
    assert_eq!(notifier.sent().len(), 2);

    // Same issue again an hour later: suppressed
    let later = now.saturating_add_secs(3600);
    let outcome = dispatcher
        .dispatch(std::slice::from_ref(&old), later)
        .await
        .expect("Dispatches");
    assert_eq!(outcome, DispatchOutcome::AllSuppressed { count: 1 });
    assert_eq!(notifier.sent().len(), 2);

    // A new issue drags the suppressed one along
    let new = rendered(Runlevel::Warning, "Breaking news", 4, &["moria1"]);
    let outcome = dispatcher
        .dispatch(&[old.clone(), new], later)
        .await
        .expect("Dispatches");
    assert_eq!(outcome, DispatchOutcome::Sent { count: 2 });
    let sent = notifier.sent();
    assert_eq!(sent.len(), 4);
    assert!(sent[2].body.contains("Old news"));
    assert_eq!(
        dispatcher.suppressor().store().get("Old_news"),
        Some(later)
    );
}

#[test_log::test(tokio::test)]
async fn errors_are_never_suppressed() {
    let notifier = RecordingNotifier::new();
    let mut dispatcher = dispatcher(notifier.clone());
    let error = rendered(Runlevel::Error, "Unable to reach moria1", 0, &["moria1"]);
    let now = Timestamp::from(NOW);

    for _ in 0..2 {
        let outcome = dispatcher
            .dispatch(std::slice::from_ref(&error), now)
            .await
            .expect("Dispatches");
        assert_eq!(outcome, DispatchOutcome::Sent { count: 1 });
    }
    assert_eq!(notifier.sent().len(), 4);
    assert!(dispatcher.suppressor().store().is_empty());
}

#[test_log::test(tokio::test)]
async fn failed_send_records_nothing() {
    let mut dispatcher = dispatcher(RecordingNotifier::failing());
    let issue = rendered(Runlevel::Notice, "Unsent", 24, &["moria1"]);

    assert!(
        dispatcher
            .dispatch(&[issue], Timestamp::from(NOW))
            .await
            .is_err()
    );
    assert!(dispatcher.suppressor().store().is_empty());
}

#[test_log::test(tokio::test)]
async fn script_errors_go_to_the_admin() {
    let notifier = RecordingNotifier::new();
    let dispatcher = dispatcher(notifier.clone());

    dispatcher
        .report_script_error("Check has_all_signatures failed: boom")
        .await
        .expect("Sends");

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "Script Error");
    assert_eq!(sent[0].to, ["admin@example.org"]);
}

#[test]
fn labels_for_every_kind_of_destination() {
    let contacts = contacts();
    let destinations = ["dizum", "moria1", "tor26"]
        .into_iter()
        .map(|authority| (authority.to_owned(), contacts.destination(authority)))
        .collect();

    assert_eq!(
        destination_labels(&destinations),
        [
            "dizum has no contact information",
            "moria1 at moria1@example.org",
            "tor26 at tor26@example.org via bcc",
        ]
    );
}

/// Collects the messages of INFO-level events.
#[derive(Clone, Default)]
struct InfoMessages(Arc<Mutex<Vec<String>>>);

struct MessageField<'a>(&'a mut String);

impl Visit for MessageField<'_> {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            *self.0 = format!("{value:?}");
        }
    }
}

impl<S: Subscriber> Layer<S> for InfoMessages {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::INFO {
            let mut message = String::new();
            event.record(&mut MessageField(&mut message));
            self.0.lock().expect("Locking failed").push(message);
        }
    }
}

#[tokio::test]
async fn missing_contacts_are_logged_at_info() {
    let messages = InfoMessages::default();
    let _guard =
        tracing::subscriber::set_default(tracing_subscriber::registry().with(messages.clone()));

    let notifier = RecordingNotifier::new();
    let mut dispatcher = dispatcher(notifier.clone());
    let issues = [rendered(
        Runlevel::Warning,
        "Missing votes from dizum",
        4,
        &["dizum", "moria1"],
    )];

    dispatcher
        .dispatch(&issues, Timestamp::from(NOW))
        .await
        .expect("Dispatches");

    let messages = messages.0.lock().expect("Locking failed");
    assert!(
        messages
            .iter()
            .any(|message| message.contains("dizum has no contact information")),
        "{messages:?}"
    );
}
