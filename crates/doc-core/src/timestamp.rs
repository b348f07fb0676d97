use std::fmt;

use derive_more::From;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Second-precision absolute timestamp, UTC
#[derive(
    Debug, Clone, Copy, From, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Timestamp {
    pub const ZERO: Self = Self(0);

    pub fn now() -> Self {
        Self::from_datetime(OffsetDateTime::now_utc())
    }

    /// Convert from a datetime, clamping anything before the epoch to zero
    pub fn from_datetime(datetime: OffsetDateTime) -> Self {
        Self(u64::try_from(datetime.unix_timestamp()).unwrap_or_default())
    }

    /// Convert to datetime, if in range
    pub fn to_datetime(self) -> Option<OffsetDateTime> {
        let secs = i64::try_from(self.0).ok()?;
        OffsetDateTime::from_unix_timestamp(secs).ok()
    }

    pub fn to_number(self) -> u64 {
        self.0
    }

    /// Seconds elapsed since `earlier`, zero if `earlier` is in the future
    pub fn secs_since(self, earlier: Timestamp) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    pub fn saturating_add_secs(self, secs: u64) -> Self {
        Self(self.0.saturating_add(secs))
    }
}

#[cfg(test)]
mod tests;
