//! Candle bucket widths shared by every connector.

use std::fmt;
use std::str::FromStr;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::BackfillError;

/// Bucket width of a candle series.
///
/// The string form follows exchange kline codes (`"1m"`, `"4h"`, `"1d"`,
/// `"1M"`). Parsing also accepts a bare number of seconds (`"86400"`), the
/// form granularity-based endpoints use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
#[non_exhaustive]
pub enum Interval {
    /// One minute.
    M1,
    /// Three minutes.
    M3,
    /// Five minutes.
    M5,
    /// Fifteen minutes.
    M15,
    /// Thirty minutes.
    M30,
    /// One hour.
    H1,
    /// Two hours.
    H2,
    /// Four hours.
    H4,
    /// Six hours.
    H6,
    /// Eight hours.
    H8,
    /// Twelve hours.
    H12,
    /// One day.
    D1,
    /// Three days.
    D3,
    /// One week.
    W1,
    /// One calendar month.
    Mo1,
}

impl Interval {
    /// Every interval in ascending order.
    pub const ALL: &'static [Self] = &[
        Self::M1,
        Self::M3,
        Self::M5,
        Self::M15,
        Self::M30,
        Self::H1,
        Self::H2,
        Self::H4,
        Self::H6,
        Self::H8,
        Self::H12,
        Self::D1,
        Self::D3,
        Self::W1,
        Self::Mo1,
    ];

    /// Kline code, e.g. `"15m"` or `"1d"`.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::M1 => "1m",
            Self::M3 => "3m",
            Self::M5 => "5m",
            Self::M15 => "15m",
            Self::M30 => "30m",
            Self::H1 => "1h",
            Self::H2 => "2h",
            Self::H4 => "4h",
            Self::H6 => "6h",
            Self::H8 => "8h",
            Self::H12 => "12h",
            Self::D1 => "1d",
            Self::D3 => "3d",
            Self::W1 => "1w",
            Self::Mo1 => "1M",
        }
    }

    /// Fixed bucket width in seconds. Calendar months have none.
    #[must_use]
    pub const fn seconds(self) -> Option<i64> {
        let s = match self {
            Self::M1 => 60,
            Self::M3 => 180,
            Self::M5 => 300,
            Self::M15 => 900,
            Self::M30 => 1_800,
            Self::H1 => 3_600,
            Self::H2 => 7_200,
            Self::H4 => 14_400,
            Self::H6 => 21_600,
            Self::H8 => 28_800,
            Self::H12 => 43_200,
            Self::D1 => 86_400,
            Self::D3 => 259_200,
            Self::W1 => 604_800,
            Self::Mo1 => return None,
        };
        Some(s)
    }

    /// Fixed bucket width as a `TimeDelta`.
    #[must_use]
    pub fn duration(self) -> Option<TimeDelta> {
        self.seconds().map(TimeDelta::seconds)
    }

    /// Look up the interval with exactly `secs` seconds of width.
    #[must_use]
    pub fn from_seconds(secs: i64) -> Option<Self> {
        Self::ALL.iter().copied().find(|iv| iv.seconds() == Some(secs))
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Interval {
    type Err = BackfillError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(iv) = Self::ALL.iter().copied().find(|iv| iv.code() == s) {
            return Ok(iv);
        }
        if let Ok(secs) = s.parse::<i64>() {
            return Self::from_seconds(secs).ok_or_else(|| {
                BackfillError::InvalidArg(format!("no interval is {secs} seconds wide"))
            });
        }
        Err(BackfillError::InvalidArg(format!("unknown interval '{s}'")))
    }
}

impl TryFrom<String> for Interval {
    type Error = BackfillError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Interval> for String {
    fn from(iv: Interval) -> Self {
        iv.code().to_string()
    }
}
