use std::fmt;

use chrono::{DateTime, Utc};

/// Identifier of a fixed-length time window, counted from the Unix epoch.
///
/// Band `n` covers `[n * interval, (n + 1) * interval)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeBand {
    id: i64,
    interval_minutes: u64,
}

impl TimeBand {
    #[cfg(test)]
    pub(crate) fn from_id(id: i64) -> Self {
        Self {
            id,
            interval_minutes: 0,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    /// Inclusive lower bound of the band. `None` when the instant is outside
    /// chrono's range.
    pub fn start(&self) -> Option<DateTime<Utc>> {
        let interval_secs = i64::try_from(self.interval_minutes).ok()?.checked_mul(60)?;
        if interval_secs == 0 {
            return None;
        }
        DateTime::from_timestamp(self.id.checked_mul(interval_secs)?, 0)
    }

    /// Start of the band as `YYYYMMDDHHMM`.
    pub fn timecode(&self) -> Option<String> {
        self.start().map(|start| start.format("%Y%m%d%H%M").to_string())
    }
}

impl fmt::Display for TimeBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// Map a UTC instant to its time band.
///
/// `interval_minutes` must be positive and small enough that its length in
/// seconds fits an `i64`; [`Config`](crate::Config) guarantees both.
/// Floor division keeps pre-epoch instants in the correct band.
pub fn band(timestamp: DateTime<Utc>, interval_minutes: u64) -> TimeBand {
    debug_assert!(interval_minutes > 0);
    let interval_secs = (interval_minutes as i64).saturating_mul(60).max(60);
    TimeBand {
        id: timestamp.timestamp().div_euclid(interval_secs),
        interval_minutes,
    }
}
