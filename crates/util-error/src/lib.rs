// SPDX-License-Identifier: MIT

//! Error plumbing shared by the `dirhealth` crates
//!
//! Library crates define their own `snafu` enums; the binary and the
//! scenario tests only need to bubble errors up, which is what [`Whatever`]
//! is for.

use snafu::Snafu;

pub mod fmt;

pub use self::fmt::FmtCompact;

pub type WhateverResult<T> = std::result::Result<T, Whatever>;

/// Snafu's `Whatever`, but `Send + Sync`, so it can cross task boundaries
#[derive(Debug, Snafu)]
#[snafu(whatever, display("{message}"))]
pub struct Whatever {
    #[snafu(source(from(Box<dyn std::error::Error + Send + Sync>, Some)))]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,

    message: String,
}
