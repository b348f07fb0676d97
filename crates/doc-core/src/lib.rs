// SPDX-License-Identifier: MIT

//! Core types of the directory documents being health-checked
//!
//! Documents arrive already parsed (the directory wire format is decoded
//! elsewhere), so this crate is only about a strongly typed model of them,
//! plus the static [`authority::AuthorityDirectory`] of authorities we expect
//! to take part in the consensus.

pub mod authority;
pub mod document;
pub mod fingerprint;
pub mod flag;
pub mod timestamp;
pub mod version;

use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum DocError {
    #[snafu(display("Invalid fingerprint: {value}"))]
    InvalidFingerprint { value: String },
    #[snafu(display("Invalid tor version: {value}"))]
    InvalidVersion { value: String },
}

pub type DocResult<T> = std::result::Result<T, DocError>;
