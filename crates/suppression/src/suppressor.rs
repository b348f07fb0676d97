use dirhealth_checks::issue::RenderedIssue;
use dirhealth_doc_core::timestamp::Timestamp;
use tracing::debug;

use crate::error::StoreResult;
use crate::{LOG_TARGET, SuppressionStore};

/// Added on top of every suppression duration
///
/// Runs are scheduled hourly, so without it a run landing a little early
/// would race exactly against the suppression boundary.
pub const GRACE_PERIOD_SECS: u64 = 30 * 60;

const SECS_PER_HOUR: u64 = 60 * 60;

/// Suppression policy over a [`SuppressionStore`]
pub struct Suppressor<S> {
    store: S,
    grace_period_secs: u64,
}

impl<S> Suppressor<S>
where
    S: SuppressionStore,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            grace_period_secs: GRACE_PERIOD_SECS,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Whether the issue was sent recently enough to be left out
    ///
    /// Issues with a suppression duration of zero are never suppressed.
    pub fn is_suppressed(&self, issue: &RenderedIssue, now: Timestamp) -> bool {
        if issue.suppression_hours == 0 {
            return false;
        }
        let Some(last_sent) = self.store.get(&issue.suppression_key) else {
            return false;
        };

        let window = u64::from(issue.suppression_hours) * SECS_PER_HOUR + self.grace_period_secs;
        let elapsed = now.secs_since(last_sent);

        if window <= elapsed {
            return false;
        }

        let remaining_hours = (window - elapsed) / SECS_PER_HOUR;
        debug!(
            target: LOG_TARGET,
            key = %issue.suppression_key,
            remaining_hours,
            "Issue is suppressed, {remaining_hours} hours remaining"
        );
        true
    }

    /// Record that the issue was just sent, persisting the store right away
    pub async fn record_sent(&mut self, issue: &RenderedIssue, now: Timestamp) -> StoreResult<()> {
        if issue.suppression_hours == 0 {
            return Ok(());
        }

        self.store.set(&issue.suppression_key, now);
        self.store.persist().await
    }
}

#[cfg(test)]
mod tests;
