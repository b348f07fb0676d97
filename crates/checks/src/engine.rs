//! Checker registry and the loop running it

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use dirhealth_doc_core::document::Consensus;
use tracing::{debug, error, warn};

use crate::context::CheckContext;
use crate::issue::Issue;
use crate::store::DocumentStore;
use crate::{CheckResult, LOG_TARGET, checks};

/// Input every check gets
pub struct CheckInput<'a> {
    /// Most recent consensus across all authorities
    pub latest: &'a Consensus,
    pub store: &'a DocumentStore,
    pub ctx: &'a CheckContext,
}

/// A check: pure function from the input to an ordered list of issues
pub type CheckFn = fn(&CheckInput<'_>) -> CheckResult<Vec<Issue>>;

#[derive(Clone, Copy)]
pub struct Check {
    pub name: &'static str,
    pub run: CheckFn,
    pub enabled_by_default: bool,
}

impl Check {
    pub const fn new(name: &'static str, run: CheckFn) -> Self {
        Self {
            name,
            run,
            enabled_by_default: true,
        }
    }

    pub const fn disabled_by_default(mut self) -> Self {
        self.enabled_by_default = false;
        self
    }
}

/// A check that errored or panicked instead of producing issues
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckFailure {
    pub check: &'static str,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct CheckReport {
    /// Issues in check registration order, and in the order each check
    /// produced them
    pub issues: Vec<Issue>,
    pub failures: Vec<CheckFailure>,
}

/// Ordered list of checks, each of which can be switched off
pub struct CheckRegistry {
    checks: Vec<(Check, bool)>,
}

impl Default for CheckRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl CheckRegistry {
    pub fn empty() -> Self {
        Self { checks: vec![] }
    }

    /// All the built-in checks, see [`checks::ALL`]
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        for check in checks::ALL {
            registry.register(check);
        }
        registry
    }

    pub fn register(&mut self, check: Check) {
        if self.checks.iter().any(|(c, _)| c.name == check.name) {
            panic!("Multiple checks with the same name {}", check.name);
        }
        self.checks.push((check, check.enabled_by_default));
    }

    /// Switch a check on or off, returning `false` if there is no such check
    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> bool {
        match self.checks.iter_mut().find(|(check, _)| check.name == name) {
            Some((_, state)) => {
                *state = enabled;
                true
            }
            None => false,
        }
    }

    pub fn is_enabled(&self, name: &str) -> Option<bool> {
        self.checks
            .iter()
            .find(|(check, _)| check.name == name)
            .map(|(_, enabled)| *enabled)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.checks.iter().map(|(check, _)| check.name)
    }

    /// Run every enabled check against the store
    ///
    /// Each check runs in its own failure boundary: an error or a panic is
    /// recorded in [`CheckReport::failures`] and the remaining checks still
    /// run. The store must hold at least one consensus and one vote,
    /// otherwise nothing is checked.
    pub fn run(&self, store: &DocumentStore, ctx: &CheckContext) -> CheckReport {
        let mut report = CheckReport::default();

        let Some((latest_of, latest)) = store.latest_consensus() else {
            warn!(target: LOG_TARGET, "No consensus to check against");
            return report;
        };
        if store.votes.is_empty() {
            warn!(target: LOG_TARGET, "No votes to check");
            return report;
        }
        debug!(
            target: LOG_TARGET,
            latest_of,
            valid_after = %latest.valid_after,
            "Running checks"
        );

        let input = CheckInput { latest, store, ctx };

        for (check, enabled) in &self.checks {
            if !enabled {
                debug!(target: LOG_TARGET, check = check.name, "Check disabled");
                continue;
            }

            match panic::catch_unwind(AssertUnwindSafe(|| (check.run)(&input))) {
                Ok(Ok(issues)) => {
                    for issue in issues {
                        debug!(target: LOG_TARGET, check = check.name, %issue, "Issue found");
                        report.issues.push(issue);
                    }
                }
                Ok(Err(err)) => {
                    error!(target: LOG_TARGET, check = check.name, %err, "Check failed");
                    report.failures.push(CheckFailure {
                        check: check.name,
                        reason: err.to_string(),
                    });
                }
                Err(payload) => {
                    let reason = panic_reason(payload.as_ref());
                    error!(target: LOG_TARGET, check = check.name, %reason, "Check panicked");
                    report.failures.push(CheckFailure {
                        check: check.name,
                        reason,
                    });
                }
            }
        }

        report
    }
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_owned()
    }
}
