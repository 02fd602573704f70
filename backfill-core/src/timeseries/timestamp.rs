use chrono::{DateTime, TimeDelta, Utc};

use crate::BackfillError;

/// Convert epoch milliseconds to a UTC instant.
///
/// Fractional milliseconds are kept down to nanosecond resolution. Negative
/// values map to instants before 1970.
///
/// ```
/// use backfill_core::epoch_ms_to_utc;
///
/// let t = epoch_ms_to_utc(1_499_040_000_000.0).unwrap();
/// assert_eq!(t.to_rfc3339(), "2017-07-03T00:00:00+00:00");
/// ```
///
/// # Errors
/// Returns `BackfillError::Data` for NaN, infinities, and values outside the
/// range `chrono` can represent.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn epoch_ms_to_utc(ms: f64) -> Result<DateTime<Utc>, BackfillError> {
    if !ms.is_finite() {
        return Err(BackfillError::Data(format!("non-finite epoch millis: {ms}")));
    }
    let whole = ms.floor();
    // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive.
    if whole < i64::MIN as f64 || whole >= i64::MAX as f64 {
        return Err(out_of_range(ms));
    }
    let whole_ms = whole as i64;
    let nanos = ((ms - whole) * 1_000_000.0).round() as i64;

    epoch_ms_to_utc_i64(whole_ms)?
        .checked_add_signed(TimeDelta::nanoseconds(nanos))
        .ok_or_else(|| out_of_range(ms))
}

/// Convert integral epoch milliseconds to a UTC instant.
///
/// # Errors
/// Returns `BackfillError::Data` when the value is outside `chrono`'s range.
pub fn epoch_ms_to_utc_i64(ms: i64) -> Result<DateTime<Utc>, BackfillError> {
    DateTime::from_timestamp_millis(ms).ok_or_else(|| out_of_range(ms))
}

/// Epoch milliseconds of `ts`, truncating any sub-millisecond part.
#[must_use]
pub fn utc_to_epoch_ms(ts: DateTime<Utc>) -> i64 {
    ts.timestamp_millis()
}

fn out_of_range(ms: impl std::fmt::Display) -> BackfillError {
    BackfillError::Data(format!("epoch millis out of range: {ms}"))
}
