use backfill_core::{RawRow, Schema, Window};
use chrono::{DateTime, Months, TimeDelta, Utc};
use serde_json::{Value, json};

/// Bucket open instants covering `window`, oldest first.
pub fn bucket_starts(window: &Window) -> Vec<DateTime<Utc>> {
    let mut out = Vec::new();
    let mut t = window.start;
    while t < window.end {
        out.push(t);
        let next = match window.interval.duration() {
            Some(step) => t.checked_add_signed(step),
            None => t.checked_add_months(Months::new(1)),
        };
        match next {
            Some(n) => t = n,
            None => break,
        }
    }
    out
}

fn price(t: DateTime<Utc>) -> f64 {
    let day = t.timestamp().div_euclid(86_400);
    #[allow(clippy::cast_precision_loss)]
    let wobble = day.rem_euclid(50) as f64;
    100.0 + wobble
}

/// Deterministic 12-field kline row for the bucket opening at `t`.
pub fn kline_row(t: DateTime<Utc>, width: TimeDelta) -> RawRow {
    let open = price(t);
    let close = open + 0.5;
    let volume = 10.0 + open / 10.0;
    let close_time = t + width - TimeDelta::milliseconds(1);
    vec![
        json!(t.timestamp_millis()),
        json!(format!("{open:.8}")),
        json!(format!("{:.8}", close + 1.0)),
        json!(format!("{:.8}", open - 1.0)),
        json!(format!("{close:.8}")),
        json!(format!("{volume:.8}")),
        json!(close_time.timestamp_millis()),
        json!(format!("{:.8}", volume * open)),
        json!(t.timestamp().rem_euclid(1000) + 1),
        json!(format!("{:.8}", volume / 2.0)),
        json!(format!("{:.8}", volume * open / 2.0)),
        json!("0"),
    ]
}

/// Deterministic 6-field candle row `[time(s), low, high, open, close, volume]`.
pub fn simple_row(t: DateTime<Utc>) -> RawRow {
    let open = price(t);
    vec![
        json!(t.timestamp()),
        json!(open - 1.0),
        json!(open + 1.5),
        json!(open),
        json!(open + 0.5),
        json!(10.0 + open / 10.0),
    ]
}

/// Rows covering `window` in the order and encoding of `schema`'s exchange.
///
/// Full-stats rows come oldest first; simple rows come newest first.
pub fn rows_for(window: &Window, schema: Schema) -> Vec<RawRow> {
    let starts = bucket_starts(window);
    match schema {
        Schema::FullStats => {
            let width = window.interval.duration().unwrap_or_else(|| TimeDelta::days(30));
            starts.into_iter().map(|t| kline_row(t, width)).collect()
        }
        Schema::Simple => starts.into_iter().rev().map(simple_row).collect(),
    }
}

/// A row that fails normalization under every schema.
pub fn malformed_row() -> RawRow {
    vec![Value::String("not-a-timestamp".into())]
}
