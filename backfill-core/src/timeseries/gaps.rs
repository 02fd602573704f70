use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::{Candle, Interval};

/// Run of missing buckets between two consecutive candles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gap {
    /// `open_time` of the candle before the gap.
    pub after: DateTime<Utc>,
    /// `open_time` of the candle after the gap.
    pub before: DateTime<Utc>,
    /// Number of whole buckets missing in between.
    pub missing: i64,
}

/// Estimate a representative step (in seconds) from positive adjacent
/// timestamp deltas.
///
/// Prefers the mode (most frequent positive delta); if there is no unique
/// mode, returns the lower median. Input order does not matter and duplicate
/// timestamps are ignored. Returns `None` with fewer than two distinct
/// timestamps.
#[must_use]
pub fn estimate_step_seconds(candles: &[Candle]) -> Option<i64> {
    let mut deltas = positive_deltas(candles);
    if deltas.is_empty() {
        return None;
    }
    deltas.sort_unstable();

    let mut best_delta = deltas[0];
    let mut best_count = 0usize;
    let mut ties = 0usize;
    let mut cur_delta = deltas[0];
    let mut cur_count = 0usize;
    for &d in &deltas {
        if d == cur_delta {
            cur_count += 1;
            continue;
        }
        tally(cur_delta, cur_count, &mut best_delta, &mut best_count, &mut ties);
        cur_delta = d;
        cur_count = 1;
    }
    tally(cur_delta, cur_count, &mut best_delta, &mut best_count, &mut ties);

    if ties == 1 {
        return Some(best_delta);
    }
    // Lower median
    Some(deltas[(deltas.len() - 1) / 2])
}

fn tally(delta: i64, count: usize, best_delta: &mut i64, best_count: &mut usize, ties: &mut usize) {
    if count > *best_count {
        *best_delta = delta;
        *best_count = count;
        *ties = 1;
    } else if count == *best_count {
        *ties += 1;
    }
}

/// Report runs of missing buckets in `candles`.
///
/// The bucket width is taken from `interval`; intervals without a fixed width
/// (monthly) fall back to [`estimate_step_seconds`]. Candles are considered in
/// `open_time` order regardless of input order.
#[must_use]
pub fn detect_gaps(candles: &[Candle], interval: Interval) -> Vec<Gap> {
    let Some(step) = interval
        .seconds()
        .or_else(|| estimate_step_seconds(candles))
        .filter(|s| *s > 0)
    else {
        return Vec::new();
    };

    let mut ts: Vec<DateTime<Utc>> = candles.iter().map(|c| c.open_time).collect();
    ts.sort_unstable();
    ts.dedup();

    ts.windows(2)
        .filter_map(|pair| {
            let delta = (pair[1] - pair[0]).num_seconds();
            (delta > step).then(|| Gap {
                after: pair[0],
                before: pair[1],
                missing: delta / step - 1,
            })
        })
        .filter(|g| g.missing > 0)
        .collect()
}

fn positive_deltas(candles: &[Candle]) -> Vec<i64> {
    let mut ts: Vec<DateTime<Utc>> = candles.iter().map(|c| c.open_time).collect();
    ts.sort_unstable();
    ts.windows(2)
        .map(|p| p[1] - p[0])
        .filter(|dt| *dt > TimeDelta::zero())
        .map(|dt| dt.num_seconds())
        .collect()
}
