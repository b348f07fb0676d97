use std::io;
use std::path::PathBuf;

use snafu::{Location, Snafu};
use tokio::task::JoinError;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum StoreError {
    #[snafu(display("Failed to read suppression state from {}", path.display()))]
    Read {
        path: PathBuf,
        source: io::Error,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("Malformed suppression state in {}", path.display()))]
    Decode {
        path: PathBuf,
        source: serde_json::Error,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("Failed to write suppression state to {}", path.display()))]
    Write {
        path: PathBuf,
        source: io::Error,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("Failed to replace suppression state at {}", path.display()))]
    Persist {
        path: PathBuf,
        source: tempfile::PersistError,
        #[snafu(implicit)]
        location: Location,
    },
    Encode {
        source: serde_json::Error,
        #[snafu(implicit)]
        location: Location,
    },
    Join {
        source: JoinError,
        #[snafu(implicit)]
        location: Location,
    },
    InvalidPath {
        path: PathBuf,
        #[snafu(implicit)]
        location: Location,
    },
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
