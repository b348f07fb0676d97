// SPDX-License-Identifier: MIT

//! Consensus health checker
//!
//! One invocation is one run: fetch every authority's consensus and vote,
//! run the checks, and mail whatever isn't suppressed.

pub mod config;
mod logging;
mod opts;

use std::path::Path;
use std::sync::Arc;

use clap::Parser as _;
use config::Config;
use dirhealth_checks::engine::{CheckFailure, CheckRegistry};
use dirhealth_doc_core::timestamp::Timestamp;
use dirhealth_fetch::{DocumentFetcher, HttpFetcher, collect_documents, probe_authorities};
use dirhealth_notify::{DispatchOutcome, Dispatcher, Notifier, SendmailNotifier, StdoutNotifier};
use dirhealth_suppression::{FileSuppressionStore, SuppressionStore, Suppressor};
use dirhealth_util_error::WhateverResult;
use dirhealth_util_error::fmt::FmtCompact as _;
use opts::Opts;
use snafu::ResultExt as _;
use time::OffsetDateTime;
use tokio::time::Instant;
use tracing::{debug, error, warn};

const LOG_TARGET: &str = "dirhealth";

/// What a single run amounted to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub outcome: DispatchOutcome,
    pub check_failures: Vec<CheckFailure>,
}

/// Fetch, check and notify, once
///
/// Checks that failed are reported to the error recipients, but don't
/// fail the run.
pub async fn check_once<F, N, S>(
    config: &Config,
    registry: &CheckRegistry,
    fetcher: Arc<F>,
    dispatcher: &mut Dispatcher<N, S>,
    now: OffsetDateTime,
) -> WhateverResult<RunSummary>
where
    F: DocumentFetcher + 'static,
    N: Notifier,
    S: SuppressionStore,
{
    let started = Instant::now();
    let ctx = config.check_context(now);
    let catalog = config.catalog();

    let collected = collect_documents(fetcher, &ctx.directory).await;
    let mut store = collected.store;
    let mut issues = collected.issues;

    if config.fetch.probe {
        store.reachability = probe_authorities(&ctx.directory, config.probe_timeout()).await;
    }

    let mut check_failures = vec![];
    if store.is_checkable() {
        let report = registry.run(&store, &ctx);
        issues.extend(report.issues);
        check_failures = report.failures;
    } else {
        warn!(target: LOG_TARGET, "Unable to retrieve any votes. Skipping checks.");
    }

    let rendered: Vec<_> = issues.into_iter().map(|issue| catalog.render(issue)).collect();
    let outcome = dispatcher
        .dispatch(&rendered, Timestamp::from_datetime(now))
        .await
        .whatever_context("Failed to send notification")?;

    if !check_failures.is_empty() {
        let body = check_failures
            .iter()
            .map(|failure| format!("Unable to run {}: {}", failure.check, failure.reason))
            .collect::<Vec<_>>()
            .join("\n");
        dispatcher
            .report_script_error(&body)
            .await
            .whatever_context("Failed to report check failures")?;
    }

    debug!(
        target: LOG_TARGET,
        issues = rendered.len(),
        failures = check_failures.len(),
        "Checks took {:.2}s",
        started.elapsed().as_secs_f64()
    );

    Ok(RunSummary {
        outcome,
        check_failures,
    })
}

pub async fn run() -> WhateverResult<()> {
    logging::init_logging()?;

    let opts = Opts::parse();

    // Without a configuration there is nobody to tell, stderr will have to do
    let config = Config::load(&opts.config)
        .await
        .whatever_context("Failed to load configuration")?;

    let notifier: Arc<dyn Notifier> = if opts.dry_run {
        Arc::new(StdoutNotifier)
    } else {
        Arc::new(SendmailNotifier::new(&opts.sendmail, &opts.from))
    };

    run_configured(config, notifier, &opts.contacts, &opts.state).await
}

/// Everything of a run past loading the configuration
///
/// A failure is mailed to the error recipients before being returned.
pub async fn run_configured<N>(
    mut config: Config,
    notifier: Arc<N>,
    contacts: &Path,
    state: &Path,
) -> WhateverResult<()>
where
    N: Notifier + ?Sized + 'static,
{
    let recipients = config.recipients();

    let res = check_with_state(&mut config, notifier.clone(), contacts, state).await;

    if let Err(err) = &res {
        let body = format!("{}", err.fmt_compact());
        if let Err(report_err) = notifier.send(&recipients.script_error(&body)).await {
            error!(
                target: LOG_TARGET,
                err = %report_err.fmt_compact(),
                "Failed to report script error"
            );
        }
    }

    res
}

async fn check_with_state<N>(
    config: &mut Config,
    notifier: Arc<N>,
    contacts: &Path,
    state: &Path,
) -> WhateverResult<()>
where
    N: Notifier + ?Sized + 'static,
{
    config
        .load_contacts(contacts)
        .await
        .whatever_context("Failed to load contacts")?;

    for kind in config.catalog().missing_templates() {
        warn!(target: LOG_TARGET, kind = %kind.as_str(), "No message template");
    }

    let registry = config.registry().whatever_context("Invalid check selection")?;

    let store = FileSuppressionStore::open(state)
        .await
        .whatever_context("Failed to open notification state")?;

    let mut dispatcher = Dispatcher::new(
        notifier,
        Suppressor::new(store),
        config.contacts.clone(),
        config.recipients(),
    );

    let fetcher =
        HttpFetcher::new(config.fetch_timeout()).whatever_context("Failed to build HTTP client")?;

    check_once(
        config,
        &registry,
        Arc::new(fetcher),
        &mut dispatcher,
        OffsetDateTime::now_utc(),
    )
    .await?;

    Ok(())
}
