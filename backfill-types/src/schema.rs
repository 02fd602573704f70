//! Positional layouts of raw candle rows.

use serde::{Deserialize, Serialize};

/// Named candle field a raw position maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Bucket open instant.
    OpenTime,
    /// Opening price.
    Open,
    /// Highest price.
    High,
    /// Lowest price.
    Low,
    /// Closing price.
    Close,
    /// Base asset volume.
    Volume,
    /// Bucket close instant.
    CloseTime,
    /// Quote asset volume.
    QuoteAssetVolume,
    /// Trade count.
    NumberOfTrades,
    /// Taker buy base asset volume.
    TakerBuyBaseAssetVolume,
    /// Taker buy quote asset volume.
    TakerBuyQuoteAssetVolume,
    /// Trailing placeholder the exchange documents as unused.
    Ignore,
}

/// How the value at a raw position is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Epoch milliseconds, integer or fractional.
    EpochMillis,
    /// Epoch seconds, integer or fractional.
    EpochSeconds,
    /// Floating-point value, JSON number or numeric string.
    Decimal,
    /// Non-negative integer, JSON number or numeric string.
    Integer,
    /// Not parsed.
    Ignored,
}

/// One raw row position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    /// Target field.
    pub field: Field,
    /// Encoding at this position.
    pub kind: FieldKind,
    /// Artifact header; `None` for positions dropped from the output.
    pub header: Option<&'static str>,
}

const fn col(field: Field, kind: FieldKind, header: &'static str) -> Column {
    Column {
        field,
        kind,
        header: Some(header),
    }
}

const FULL_STATS: &[Column] = &[
    col(Field::OpenTime, FieldKind::EpochMillis, "Open Time"),
    col(Field::Open, FieldKind::Decimal, "Open"),
    col(Field::High, FieldKind::Decimal, "High"),
    col(Field::Low, FieldKind::Decimal, "Low"),
    col(Field::Close, FieldKind::Decimal, "Close"),
    col(Field::Volume, FieldKind::Decimal, "Volume"),
    col(Field::CloseTime, FieldKind::EpochMillis, "Close Time"),
    col(Field::QuoteAssetVolume, FieldKind::Decimal, "Quote Asset Volume"),
    col(Field::NumberOfTrades, FieldKind::Integer, "Number of Trades"),
    col(
        Field::TakerBuyBaseAssetVolume,
        FieldKind::Decimal,
        "Taker Buy Base Asset Volume",
    ),
    col(
        Field::TakerBuyQuoteAssetVolume,
        FieldKind::Decimal,
        "Taker Buy Quote Asset Volume",
    ),
    Column {
        field: Field::Ignore,
        kind: FieldKind::Ignored,
        header: None,
    },
];

const SIMPLE: &[Column] = &[
    col(Field::OpenTime, FieldKind::EpochSeconds, "Time"),
    col(Field::Low, FieldKind::Decimal, "Low"),
    col(Field::High, FieldKind::Decimal, "High"),
    col(Field::Open, FieldKind::Decimal, "Open"),
    col(Field::Close, FieldKind::Decimal, "Close"),
    col(Field::Volume, FieldKind::Decimal, "Volume"),
];

/// Raw row layout of a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Schema {
    /// 12-wide kline rows: open time (ms), OHLCV as strings, close time (ms),
    /// quote volume, trade count, taker buy volumes and an unused trailer.
    FullStats,
    /// 6-wide candle rows: time (s), low, high, open, close, volume.
    Simple,
}

impl Schema {
    /// Positions in raw row order.
    #[must_use]
    pub const fn columns(self) -> &'static [Column] {
        match self {
            Self::FullStats => FULL_STATS,
            Self::Simple => SIMPLE,
        }
    }

    /// Expected raw row width.
    #[must_use]
    pub const fn width(self) -> usize {
        self.columns().len()
    }

    /// Artifact header in column order.
    #[must_use]
    pub fn headers(self) -> Vec<&'static str> {
        self.columns().iter().filter_map(|c| c.header).collect()
    }

    /// Output fields in column order, matching [`Schema::headers`].
    #[must_use]
    pub fn output_fields(self) -> Vec<Field> {
        self.columns()
            .iter()
            .filter(|c| c.header.is_some())
            .map(|c| c.field)
            .collect()
    }

    /// Whether time columns are written as calendar dates.
    #[must_use]
    pub const fn date_only(self) -> bool {
        matches!(self, Self::Simple)
    }
}
