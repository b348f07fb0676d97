use std::io::{self, IsTerminal as _};

use dirhealth_util_error::WhateverResult;
use snafu::whatever;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// Log to stderr, at `INFO` unless `RUST_LOG` says otherwise
///
/// Runs from cron get their stderr mailed, so colors are only used on a
/// terminal.
pub fn init_logging() -> WhateverResult<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    if tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_env_filter(filter)
        .try_init()
        .is_err()
    {
        whatever!("Failed to initialize logging");
    }

    Ok(())
}
