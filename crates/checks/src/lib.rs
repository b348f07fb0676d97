// SPDX-License-Identifier: MIT

//! Consensus health rule engine
//!
//! Takes the consensus and vote documents retrieved from every authority
//! and runs a battery of independent consistency checks against them. Each
//! check is a pure function of its input (see [`engine::CheckInput`]), so
//! the whole engine is deterministic and side-effect free: fetching
//! documents, rate-limiting and sending notifications all happen elsewhere.
//!
//! See [`checks`] for the list of checks, and [`issue`] for what they
//! produce.

pub mod catalog;
pub mod checks;
pub mod context;
pub mod engine;
pub mod issue;
pub mod store;
pub mod template;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

use snafu::{Location, Snafu};

const LOG_TARGET: &str = "dirhealth::checks";

/// Failure of a single check
///
/// A check failing is a defect in either the check or the documents it
/// got; the engine isolates it so the other checks still report.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum CheckError {
    #[snafu(display("Malformed vote from {authority}: {reason}"))]
    MalformedVote {
        authority: String,
        reason: String,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("Failed to format timestamp"))]
    TimeFormat {
        source: time::error::Format,
        #[snafu(implicit)]
        location: Location,
    },
}

pub type CheckResult<T> = std::result::Result<T, CheckError>;
