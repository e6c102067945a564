use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::AppError;

/// Candle width. Buckets are aligned to the Unix epoch in UTC, so `Day`
/// buckets start at UTC midnight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1h")]
    Hour,
    #[serde(rename = "4h")]
    FourHours,
    #[default]
    #[serde(rename = "1d")]
    Day,
}

impl Interval {
    pub fn step(self) -> TimeDelta {
        match self {
            Self::Hour => TimeDelta::hours(1),
            Self::FourHours => TimeDelta::hours(4),
            Self::Day => TimeDelta::days(1),
        }
    }

    pub fn step_secs(self) -> i64 {
        self.step().num_seconds()
    }

    /// Start of the bucket containing `timestamp` (seconds), or `None` if the
    /// timestamp is outside chrono's representable range.
    pub fn truncate(self, timestamp: i64) -> Option<i64> {
        let at = DateTime::<Utc>::from_timestamp(timestamp, 0)?;
        at.duration_trunc(self.step()).ok().map(|t| t.timestamp())
    }
}

impl FromStr for Interval {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1h" | "hour" => Ok(Self::Hour),
            "4h" => Ok(Self::FourHours),
            "1d" | "day" => Ok(Self::Day),
            other => Err(AppError::Config(format!("unknown candle interval '{other}'"))),
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hour => f.write_str("1h"),
            Self::FourHours => f.write_str("4h"),
            Self::Day => f.write_str("1d"),
        }
    }
}
