//! Request windows and the step used to cut them.

use std::fmt;

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Interval;

/// Half-open time range `[start, end)` requested from a source in one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Window {
    /// Inclusive start.
    pub start: DateTime<Utc>,
    /// Exclusive end.
    pub end: DateTime<Utc>,
    /// Candle bucket width requested for this window.
    pub interval: Interval,
}

impl Window {
    /// Build a window; `start` must not be after `end`.
    #[must_use]
    pub const fn new(start: DateTime<Utc>, end: DateTime<Utc>, interval: Interval) -> Self {
        Self {
            start,
            end,
            interval,
        }
    }

    /// True when `ts` falls inside `[start, end)`.
    #[must_use]
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start <= ts && ts < self.end
    }

    /// Start in epoch milliseconds.
    #[must_use]
    pub fn start_ms(&self) -> i64 {
        self.start.timestamp_millis()
    }

    /// Exclusive end in epoch milliseconds.
    #[must_use]
    pub fn end_ms(&self) -> i64 {
        self.end.timestamp_millis()
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Sub-day windows need the time of day to stay distinguishable.
        let fmt = if is_midnight(self.start) && is_midnight(self.end) {
            "%Y-%m-%d"
        } else {
            "%Y-%m-%dT%H:%MZ"
        };
        write!(
            f,
            "[{}, {}) {}",
            self.start.format(fmt),
            self.end.format(fmt),
            self.interval
        )
    }
}

fn is_midnight(t: DateTime<Utc>) -> bool {
    t.time() == NaiveTime::MIN
}

/// Size of each planned window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepSize {
    /// Fixed number of days.
    Days(u32),
    /// Calendar years, anchored on the range start's month and day.
    Years(u32),
    /// Fixed number of hours, for intervals whose page cap spans less than a day.
    Hours(u32),
}

impl StepSize {
    /// True for a zero-length step.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        matches!(self, Self::Days(0) | Self::Years(0) | Self::Hours(0))
    }

    /// Largest step whose windows stay below a page of `limit` rows at
    /// `interval`.
    ///
    /// Windows hold at most `limit - 1` buckets, so a full page still signals
    /// real truncation. Whole days are preferred; spans shorter than a day
    /// fall back to whole hours (at least one). Returns `None` for a zero
    /// limit or an interval without a fixed width (`1M`).
    ///
    /// ```
    /// use backfill_types::{Interval, StepSize};
    ///
    /// assert_eq!(StepSize::within_page_limit(1000, Interval::H1), Some(StepSize::Days(41)));
    /// assert_eq!(StepSize::within_page_limit(300, Interval::M1), Some(StepSize::Hours(4)));
    /// ```
    #[must_use]
    pub fn within_page_limit(limit: usize, interval: Interval) -> Option<Self> {
        let width = interval.seconds()?;
        let buckets = i64::try_from(limit).ok()?.checked_sub(1)?;
        if buckets == 0 {
            return None;
        }
        let span = buckets.saturating_mul(width);
        let clamp = |n: i64| u32::try_from(n).unwrap_or(u32::MAX);
        Some(match span / 86_400 {
            0 => Self::Hours(clamp((span / 3_600).max(1))),
            days => Self::Days(clamp(days)),
        })
    }
}

impl fmt::Display for StepSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Days(n) => write!(f, "{n}d"),
            Self::Years(n) => write!(f, "{n}y"),
            Self::Hours(n) => write!(f, "{n}h"),
        }
    }
}
