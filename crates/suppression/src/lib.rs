//! Rate limiting of repeated notifications
//!
//! Every issue that gets sent out has its suppression key recorded along
//! with the time it was sent. Until the issue's suppression duration (plus
//! a grace period) elapses, the same issue is considered suppressed.

pub mod error;
mod suppressor;

use std::collections::BTreeMap;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use dirhealth_doc_core::timestamp::Timestamp;
use error::{
    DecodeSnafu, EncodeSnafu, InvalidPathSnafu, JoinSnafu, PersistSnafu, ReadSnafu, StoreResult,
    WriteSnafu,
};
use snafu::{OptionExt as _, ResultExt as _};
use tracing::debug;

pub use self::suppressor::{GRACE_PERIOD_SECS, Suppressor};

const LOG_TARGET: &str = "dirhealth::suppression";

/// Persistent map of suppression key to the time it was last sent
#[async_trait]
pub trait SuppressionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<Timestamp>;

    fn set(&mut self, key: &str, sent: Timestamp);

    /// Write out the whole state
    async fn persist(&self) -> StoreResult<()>;
}

/// Store that lives only for the duration of the process
#[derive(Debug, Default, Clone)]
pub struct MemorySuppressionStore {
    entries: BTreeMap<String, Timestamp>,
}

impl MemorySuppressionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl SuppressionStore for MemorySuppressionStore {
    fn get(&self, key: &str) -> Option<Timestamp> {
        self.entries.get(key).copied()
    }

    fn set(&mut self, key: &str, sent: Timestamp) {
        self.entries.insert(key.to_owned(), sent);
    }

    async fn persist(&self) -> StoreResult<()> {
        Ok(())
    }
}

/// Store backed by a JSON file
///
/// Writes go to a temporary file in the same directory which then replaces
/// the original, so a crash never leaves a half-written state behind.
#[derive(Debug)]
pub struct FileSuppressionStore {
    path: PathBuf,
    entries: BTreeMap<String, Timestamp>,
}

impl FileSuppressionStore {
    /// Load the state at `path`, a missing file meaning no history at all
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();

        let entries = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.is_empty() => BTreeMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes).context(DecodeSnafu { path: &path })?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(target: LOG_TARGET, path = %path.display(), "No suppression state yet");
                BTreeMap::new()
            }
            Err(source) => {
                return Err(source).context(ReadSnafu { path: &path });
            }
        };

        debug!(
            target: LOG_TARGET,
            path = %path.display(),
            entries = entries.len(),
            "Loaded suppression state"
        );

        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_atomically(
        path: &Path,
        entries: &BTreeMap<String, Timestamp>,
    ) -> StoreResult<()> {
        let dir = match path.parent() {
            Some(parent) if parent.as_os_str().is_empty() => Path::new("."),
            parent => parent.context(InvalidPathSnafu { path })?,
        };
        std::fs::create_dir_all(dir).context(WriteSnafu { path })?;

        let encoded = serde_json::to_vec_pretty(entries).context(EncodeSnafu)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir).context(WriteSnafu { path })?;
        tmp.write_all(&encoded).context(WriteSnafu { path })?;
        tmp.as_file().sync_all().context(WriteSnafu { path })?;
        tmp.persist(path).context(PersistSnafu { path })?;

        Ok(())
    }
}

#[async_trait]
impl SuppressionStore for FileSuppressionStore {
    fn get(&self, key: &str) -> Option<Timestamp> {
        self.entries.get(key).copied()
    }

    fn set(&mut self, key: &str, sent: Timestamp) {
        self.entries.insert(key.to_owned(), sent);
    }

    async fn persist(&self) -> StoreResult<()> {
        let path = self.path.clone();
        let entries = self.entries.clone();

        tokio::task::spawn_blocking(move || Self::write_atomically(&path, &entries))
            .await
            .context(JoinSnafu)??;

        debug!(
            target: LOG_TARGET,
            path = %self.path.display(),
            entries = self.entries.len(),
            "Persisted suppression state"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests;
