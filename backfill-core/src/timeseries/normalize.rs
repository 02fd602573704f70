use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::timeseries::timestamp::{epoch_ms_to_utc, epoch_ms_to_utc_i64};
use crate::{BackfillError, Candle, Field, FieldKind, MalformedRowPolicy, RawRow, Schema};

/// Candles parsed from one batch plus the rows that were rejected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedBatch {
    /// Candles in the order their rows were received.
    pub candles: Vec<Candle>,
    /// One `MalformedRow` error per skipped row.
    pub rejected: Vec<BackfillError>,
}

/// Parse one raw row according to `schema`.
///
/// Decimal positions accept JSON numbers or numeric strings. Integer positions
/// accept integral numbers or integral strings. Epoch-second times are scaled
/// to milliseconds before conversion.
///
/// # Errors
/// Returns `BackfillError::MalformedRow` (with `row = 0`) when the width does
/// not match the schema or a value does not parse.
pub fn normalize_row(row: &RawRow, schema: Schema) -> Result<Candle, BackfillError> {
    parse_row(row, schema).map_err(|reason| BackfillError::malformed(0, reason))
}

/// Parse a batch of raw rows, applying `policy` to rows that fail.
///
/// With [`MalformedRowPolicy::Skip`] failing rows are dropped and reported in
/// [`NormalizedBatch::rejected`]; with [`MalformedRowPolicy::Abort`] the first
/// failure is returned.
///
/// # Errors
/// Returns the first `BackfillError::MalformedRow` under the abort policy.
pub fn normalize_batch(
    rows: &[RawRow],
    schema: Schema,
    policy: MalformedRowPolicy,
) -> Result<NormalizedBatch, BackfillError> {
    let mut out = NormalizedBatch {
        candles: Vec::with_capacity(rows.len()),
        rejected: Vec::new(),
    };
    for (i, row) in rows.iter().enumerate() {
        match parse_row(row, schema) {
            Ok(c) => out.candles.push(c),
            Err(reason) => {
                let err = BackfillError::malformed(i, reason);
                if policy == MalformedRowPolicy::Abort {
                    return Err(err);
                }
                #[cfg(feature = "tracing")]
                tracing::warn!(row = i, error = %err, "skipping malformed row");
                out.rejected.push(err);
            }
        }
    }
    Ok(out)
}

fn parse_row(row: &RawRow, schema: Schema) -> Result<Candle, String> {
    if row.len() != schema.width() {
        return Err(format!(
            "expected {} fields, got {}",
            schema.width(),
            row.len()
        ));
    }

    let mut open_time = None;
    let mut close_time = None;
    let mut ohlcv = [None::<f64>; 5];
    let mut quote_asset_volume = None;
    let mut number_of_trades = None;
    let mut taker_base = None;
    let mut taker_quote = None;

    for (col, value) in schema.columns().iter().zip(row) {
        let name = || format!("{:?}", col.field);
        match col.kind {
            FieldKind::Ignored => {}
            FieldKind::EpochMillis | FieldKind::EpochSeconds => {
                let ts = parse_time(value, col.kind).map_err(|e| format!("{}: {e}", name()))?;
                match col.field {
                    Field::OpenTime => open_time = Some(ts),
                    Field::CloseTime => close_time = Some(ts),
                    other => return Err(format!("{other:?} is not a time field")),
                }
            }
            FieldKind::Decimal => {
                let v = parse_decimal(value).map_err(|e| format!("{}: {e}", name()))?;
                match col.field {
                    Field::Open => ohlcv[0] = Some(v),
                    Field::High => ohlcv[1] = Some(v),
                    Field::Low => ohlcv[2] = Some(v),
                    Field::Close => ohlcv[3] = Some(v),
                    Field::Volume => ohlcv[4] = Some(v),
                    Field::QuoteAssetVolume => quote_asset_volume = Some(v),
                    Field::TakerBuyBaseAssetVolume => taker_base = Some(v),
                    Field::TakerBuyQuoteAssetVolume => taker_quote = Some(v),
                    other => return Err(format!("{other:?} is not a decimal field")),
                }
            }
            FieldKind::Integer => {
                let v = parse_integer(value).map_err(|e| format!("{}: {e}", name()))?;
                match col.field {
                    Field::NumberOfTrades => number_of_trades = Some(v),
                    other => return Err(format!("{other:?} is not an integer field")),
                }
            }
        }
    }

    let [open, high, low, close, volume] = ohlcv;
    let missing = |f: &str| format!("schema has no {f} column");
    let mut candle = Candle::ohlcv(
        open_time.ok_or_else(|| missing("open time"))?,
        open.ok_or_else(|| missing("open"))?,
        high.ok_or_else(|| missing("high"))?,
        low.ok_or_else(|| missing("low"))?,
        close.ok_or_else(|| missing("close"))?,
        volume.ok_or_else(|| missing("volume"))?,
    );
    candle.close_time = close_time;
    candle.quote_asset_volume = quote_asset_volume;
    candle.number_of_trades = number_of_trades;
    candle.taker_buy_base_asset_volume = taker_base;
    candle.taker_buy_quote_asset_volume = taker_quote;
    Ok(candle)
}

fn parse_decimal(v: &Value) -> Result<f64, String> {
    let x = match v {
        Value::Number(n) => n.as_f64().ok_or_else(|| format!("{n} is not a float"))?,
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("'{s}' is not numeric"))?,
        other => return Err(format!("expected number or numeric string, got {other}")),
    };
    if x.is_finite() {
        Ok(x)
    } else {
        Err(format!("{x} is not finite"))
    }
}

fn parse_integer(v: &Value) -> Result<u64, String> {
    match v {
        Value::Number(n) => n.as_u64().ok_or_else(|| format!("{n} is not a non-negative integer")),
        Value::String(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| format!("'{s}' is not a non-negative integer")),
        other => Err(format!("expected integer, got {other}")),
    }
}

fn parse_time(v: &Value, kind: FieldKind) -> Result<DateTime<Utc>, String> {
    let scale: i64 = if kind == FieldKind::EpochSeconds { 1000 } else { 1 };
    let integral = match v {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    if let Some(i) = integral {
        let ms = i
            .checked_mul(scale)
            .ok_or_else(|| format!("{i} overflows epoch millis"))?;
        return epoch_ms_to_utc_i64(ms).map_err(|e| e.to_string());
    }
    #[allow(clippy::cast_precision_loss)]
    let ms = parse_decimal(v)? * scale as f64;
    epoch_ms_to_utc(ms).map_err(|e| e.to_string())
}
