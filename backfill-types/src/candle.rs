//! Candle records and the assembled series.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Schema;

/// One OHLCV observation.
///
/// `close_time` and the trade statistics are only reported by sources with
/// the full kline schema; the simpler candle schema leaves them `None`.
/// OHLC ordering (`low <= open, close <= high`) is not validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Bucket open instant.
    pub open_time: DateTime<Utc>,
    /// Opening price.
    pub open: f64,
    /// Highest traded price.
    pub high: f64,
    /// Lowest traded price.
    pub low: f64,
    /// Closing price.
    pub close: f64,
    /// Base asset volume.
    pub volume: f64,
    /// Bucket close instant (inclusive, last millisecond of the bucket).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub close_time: Option<DateTime<Utc>>,
    /// Quote asset volume.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub quote_asset_volume: Option<f64>,
    /// Number of trades in the bucket.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub number_of_trades: Option<u64>,
    /// Taker buy base asset volume.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub taker_buy_base_asset_volume: Option<f64>,
    /// Taker buy quote asset volume.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub taker_buy_quote_asset_volume: Option<f64>,
}

impl Candle {
    /// Build a candle with only the OHLCV fields populated.
    #[must_use]
    pub const fn ohlcv(
        open_time: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            open_time,
            open,
            high,
            low,
            close,
            volume,
            close_time: None,
            quote_asset_volume: None,
            number_of_trades: None,
            taker_buy_base_asset_volume: None,
            taker_buy_quote_asset_volume: None,
        }
    }
}

/// Ordered candle series produced by the assembler.
///
/// Insertion order is chronological when windows are requested in
/// increasing time order; the assembler may additionally sort it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    /// Schema the candles were normalized from; drives artifact columns.
    pub schema: Schema,
    /// Candles in series order.
    pub candles: Vec<Candle>,
}

impl Series {
    /// Empty series for `schema`.
    #[must_use]
    pub const fn empty(schema: Schema) -> Self {
        Self {
            schema,
            candles: Vec::new(),
        }
    }

    /// Number of candles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.candles.len()
    }

    /// True when the series holds no candles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// First and last `open_time`, if any.
    #[must_use]
    pub fn span(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        Some((self.candles.first()?.open_time, self.candles.last()?.open_time))
    }
}

/// Latest traded price for a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticker {
    /// Exchange symbol, e.g. `BTCUSDT`.
    pub symbol: String,
    /// Last price.
    pub price: f64,
}
