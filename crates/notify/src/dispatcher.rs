use std::collections::BTreeMap;

use dirhealth_checks::issue::RenderedIssue;
use dirhealth_doc_core::timestamp::Timestamp;
use dirhealth_suppression::{SuppressionStore, Suppressor};
use snafu::ResultExt as _;
use tracing::info;

use crate::contacts::{ContactBook, Destination};
use crate::{LOG_TARGET, Message, Notifier, NotifyResult, SuppressionSnafu};

pub const DEFAULT_SUBJECT: &str = "Consensus issues";
pub const DEFAULT_ANNOUNCE_SUBJECT: &str = "Announce or";
pub const DEFAULT_ERROR_SUBJECT: &str = "Script Error";
pub const ANNOUNCE_PREFIX: &str = "[consensus-health]";

/// Fixed recipients of the notifications
#[derive(Debug, Clone)]
pub struct Recipients {
    pub operators: Vec<String>,
    pub subject: String,
    /// Gets a condensed copy of every notification
    pub announce: Vec<String>,
    pub announce_subject: String,
    /// Gets operational errors of the checker itself
    pub errors: Vec<String>,
    pub error_subject: String,
}

#[bon::bon]
impl Recipients {
    #[builder]
    pub fn new(
        #[builder(default)] operators: Vec<String>,
        #[builder(default = DEFAULT_SUBJECT.to_owned())] subject: String,
        #[builder(default)] announce: Vec<String>,
        #[builder(default = DEFAULT_ANNOUNCE_SUBJECT.to_owned())] announce_subject: String,
        #[builder(default)] errors: Vec<String>,
        #[builder(default = DEFAULT_ERROR_SUBJECT.to_owned())] error_subject: String,
    ) -> Self {
        Self {
            operators,
            subject,
            announce,
            announce_subject,
            errors,
            error_subject,
        }
    }
}

impl Recipients {
    /// A failure of the checker itself, addressed to the error recipients
    pub fn script_error(&self, body: &str) -> Message {
        Message::new(&self.error_subject, body).to(self.errors.iter().cloned())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    NoIssues,
    /// Everything was sent recently, nothing went out
    AllSuppressed { count: usize },
    Sent { count: usize },
}

/// Decides whether this run's issues get sent and to whom
///
/// Sending is all or nothing: as soon as a single issue isn't suppressed,
/// the whole batch goes out, so the recipients always see the full picture.
pub struct Dispatcher<N, S> {
    notifier: N,
    suppressor: Suppressor<S>,
    contacts: ContactBook,
    recipients: Recipients,
}

impl<N, S> Dispatcher<N, S>
where
    N: Notifier,
    S: SuppressionStore,
{
    pub fn new(
        notifier: N,
        suppressor: Suppressor<S>,
        contacts: ContactBook,
        recipients: Recipients,
    ) -> Self {
        Self {
            notifier,
            suppressor,
            contacts,
            recipients,
        }
    }

    pub fn suppressor(&self) -> &Suppressor<S> {
        &self.suppressor
    }

    pub async fn dispatch(
        &mut self,
        issues: &[RenderedIssue],
        now: Timestamp,
    ) -> NotifyResult<DispatchOutcome> {
        if issues.is_empty() {
            info!(target: LOG_TARGET, "No issues found.");
            return Ok(DispatchOutcome::NoIssues);
        }

        if issues
            .iter()
            .all(|issue| self.suppressor.is_suppressed(issue, now))
        {
            info!(
                target: LOG_TARGET,
                "All {} issues were suppressed. Not sending a notification.",
                issues.len()
            );
            return Ok(DispatchOutcome::AllSuppressed {
                count: issues.len(),
            });
        }

        let destinations = self.destinations(issues);
        info!(
            target: LOG_TARGET,
            "Sending notification for issues ({})",
            destination_labels(&destinations).join(", ")
        );

        let body = issues
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n");
        let (bcc, cc): (Vec<_>, Vec<_>) = destinations.values().flatten().partition(|d| d.bcc);

        let message = Message::new(&self.recipients.subject, body)
            .to(self.recipients.operators.iter().cloned())
            .cc(cc.into_iter().map(|d| d.address.clone()))
            .bcc(bcc.into_iter().map(|d| d.address.clone()));
        self.notifier.send(&message).await?;

        if !self.recipients.announce.is_empty() {
            let body = issues
                .iter()
                .map(|issue| format!("{ANNOUNCE_PREFIX} {issue}"))
                .collect::<Vec<_>>()
                .join("\n");
            let announcement = Message::new(&self.recipients.announce_subject, body)
                .to(self.recipients.announce.iter().cloned());
            self.notifier.send(&announcement).await?;
        }

        for issue in issues {
            self.suppressor
                .record_sent(issue, now)
                .await
                .context(SuppressionSnafu)?;
        }

        Ok(DispatchOutcome::Sent {
            count: issues.len(),
        })
    }

    /// Mail a failure of the checker itself to the error recipients
    pub async fn report_script_error(&self, body: &str) -> NotifyResult<()> {
        self.notifier
            .send(&self.recipients.script_error(body))
            .await
    }

    /// Concerned authorities of all the issues, with where to reach them
    fn destinations(&self, issues: &[RenderedIssue]) -> BTreeMap<String, Option<Destination>> {
        issues
            .iter()
            .flat_map(|issue| issue.issue.concerned_authorities())
            .map(|authority| (authority.clone(), self.contacts.destination(authority)))
            .collect()
    }
}

fn destination_labels(destinations: &BTreeMap<String, Option<Destination>>) -> Vec<String> {
    destinations
        .iter()
        .map(|(authority, destination)| match destination {
            None => format!("{authority} has no contact information"),
            Some(Destination {
                address,
                bcc: false,
            }) => format!("{authority} at {address}"),
            Some(Destination { address, bcc: true }) => format!("{authority} at {address} via bcc"),
        })
        .collect()
}

#[cfg(test)]
mod tests;
