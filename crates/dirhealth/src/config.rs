//! The checker's TOML configuration

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use dirhealth_checks::catalog::{MessageCatalog, SuppressionSetting};
use dirhealth_checks::context::CheckContext;
use dirhealth_checks::engine::CheckRegistry;
use dirhealth_doc_core::authority::{Authority, AuthorityDirectory};
use dirhealth_notify::{ContactBook, Recipients};
use serde::Deserialize;
use snafu::{Location, ResultExt as _, Snafu, ensure};
use time::OffsetDateTime;
use tracing::debug;

use crate::LOG_TARGET;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ConfigError {
    #[snafu(display("Failed to read {}", path.display()))]
    Read {
        path: PathBuf,
        source: io::Error,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("Invalid configuration in {}", path.display()))]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("Unknown check {name} in [checks]"))]
    UnknownCheck {
        name: String,
        #[snafu(implicit)]
        location: Location,
    },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Message template for every issue kind
    #[serde(default)]
    pub msg: BTreeMap<String, String>,
    /// Suppression duration overrides in hours, by issue kind
    #[serde(default)]
    pub suppression: BTreeMap<String, SuppressionSetting>,
    #[serde(default)]
    pub known_params: BTreeSet<String>,
    /// Authorities that are known to be down, and not to be checked
    #[serde(default)]
    pub ignored_authorities: BTreeSet<String>,
    /// Switch individual checks on or off
    #[serde(default)]
    pub checks: BTreeMap<String, bool>,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default, rename = "authority")]
    pub authorities: Vec<Authority>,
    #[serde(flatten)]
    pub contacts: ContactBook,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotifyConfig {
    #[serde(default)]
    pub operators: Vec<String>,
    pub subject: Option<String>,
    #[serde(default)]
    pub announce: Vec<String>,
    pub announce_subject: Option<String>,
    #[serde(default)]
    pub errors: Vec<String>,
    pub error_subject: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_fetch_timeout_secs")]
    pub timeout_secs: u64,
    /// Whether to try connecting to the authorities' OR ports
    #[serde(default = "default_probe")]
    pub probe: bool,
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_fetch_timeout_secs(),
            probe: default_probe(),
            probe_timeout_secs: default_probe_timeout_secs(),
        }
    }
}

fn default_fetch_timeout_secs() -> u64 {
    60
}

fn default_probe() -> bool {
    true
}

fn default_probe_timeout_secs() -> u64 {
    10
}

impl Config {
    pub async fn load(path: &Path) -> ConfigResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .context(ReadSnafu { path })?;
        let config = Self::parse(&content).context(ParseSnafu { path })?;

        debug!(
            target: LOG_TARGET,
            path = %path.display(),
            authorities = config.authorities.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Merge in a separate contacts file, if there is one
    pub async fn load_contacts(&mut self, path: &Path) -> ConfigResult<()> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(target: LOG_TARGET, path = %path.display(), "No contacts file");
                return Ok(());
            }
            Err(source) => return Err(source).context(ReadSnafu { path }),
        };

        let contacts: ContactBook = toml::from_str(&content).context(ParseSnafu { path })?;
        self.contacts.extend(contacts);
        Ok(())
    }

    pub fn directory(&self) -> AuthorityDirectory {
        AuthorityDirectory::new(
            self.authorities.iter().cloned(),
            self.ignored_authorities.iter().cloned(),
        )
    }

    pub fn check_context(&self, now: OffsetDateTime) -> CheckContext {
        CheckContext::builder()
            .now(now)
            .directory(self.directory())
            .known_params(self.known_params.clone())
            .build()
    }

    pub fn catalog(&self) -> MessageCatalog {
        MessageCatalog::new(self.msg.clone(), self.suppression.clone())
    }

    /// The standard checks, with the `[checks]` toggles applied
    pub fn registry(&self) -> ConfigResult<CheckRegistry> {
        let mut registry = CheckRegistry::standard();
        for (name, enabled) in &self.checks {
            ensure!(
                registry.set_enabled(name, *enabled),
                UnknownCheckSnafu { name }
            );
        }
        Ok(registry)
    }

    pub fn recipients(&self) -> Recipients {
        let notify = &self.notify;
        Recipients::builder()
            .operators(notify.operators.clone())
            .maybe_subject(notify.subject.clone())
            .announce(notify.announce.clone())
            .maybe_announce_subject(notify.announce_subject.clone())
            .errors(notify.errors.clone())
            .maybe_error_subject(notify.error_subject.clone())
            .build()
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch.timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch.probe_timeout_secs)
    }
}
