//! Time-to-live arithmetic
//!
//! Expirations are stored as absolute Unix timestamps in fractional seconds
//! with microsecond precision. A TTL that pushes the timestamp outside the
//! range chrono can represent is rejected rather than clamped.

use chrono::{DateTime, TimeDelta, Utc};
use std::time::Duration;
use thiserror::Error;

/// How long a stored value stays fresh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ttl {
    /// Never expires
    #[default]
    Never,
    /// Whole seconds, negative values produce an expired entry
    Seconds(i64),
    /// A standard library duration
    Duration(Duration),
    /// A signed calendar-free interval
    Interval(TimeDelta),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TtlError {
    #[error("ttl of {0} is outside the representable range")]
    OutOfRange(String),
}

impl Ttl {
    /// Absolute expiration for an entry written at `now`
    pub fn expiration_at(&self, now: DateTime<Utc>) -> Result<Option<f64>, TtlError> {
        let delta = match *self {
            Self::Never => return Ok(None),
            Self::Seconds(seconds) => TimeDelta::try_seconds(seconds)
                .ok_or_else(|| TtlError::OutOfRange(format!("{seconds}s")))?,
            Self::Duration(duration) => TimeDelta::from_std(duration)
                .map_err(|_| TtlError::OutOfRange(format!("{duration:?}")))?,
            Self::Interval(interval) => interval,
        };

        let expires = now
            .checked_add_signed(delta)
            .ok_or_else(|| TtlError::OutOfRange(delta.to_string()))?;
        Ok(Some(to_timestamp(expires)))
    }

    /// Absolute expiration for an entry written now
    pub fn expiration(&self) -> Result<Option<f64>, TtlError> {
        self.expiration_at(Utc::now())
    }
}

impl From<i64> for Ttl {
    fn from(seconds: i64) -> Self {
        Self::Seconds(seconds)
    }
}

impl From<Duration> for Ttl {
    fn from(duration: Duration) -> Self {
        Self::Duration(duration)
    }
}

impl From<TimeDelta> for Ttl {
    fn from(interval: TimeDelta) -> Self {
        Self::Interval(interval)
    }
}

impl<T: Into<Ttl>> From<Option<T>> for Ttl {
    fn from(ttl: Option<T>) -> Self {
        ttl.map_or(Self::Never, Into::into)
    }
}

/// Current time as fractional Unix seconds
pub fn now_timestamp() -> f64 {
    to_timestamp(Utc::now())
}

/// An expiration is reached once it is at or before `now`; `None` never is
pub fn is_expired_at(expiration: Option<f64>, now: f64) -> bool {
    matches!(expiration, Some(expiration) if expiration <= now)
}

fn to_timestamp(at: DateTime<Utc>) -> f64 {
    at.timestamp() as f64 + f64::from(at.timestamp_subsec_micros()) / 1_000_000.0
}
