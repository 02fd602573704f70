//! Artifact writer: serializes an assembled series to a file.

use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use backfill_core::{BackfillError, Candle, Field, Series};
use chrono::{DateTime, Utc};

/// On-disk layout of the artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArtifactFormat {
    /// Comma-separated values with a header row named after the source columns.
    #[default]
    Csv,
    /// Pretty-printed JSON array of candle records.
    Json,
}

impl FromStr for ArtifactFormat {
    type Err = BackfillError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(BackfillError::InvalidArg(format!(
                "unknown output format '{other}' (expected csv or json)"
            ))),
        }
    }
}

impl fmt::Display for ArtifactFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Csv => "csv",
            Self::Json => "json",
        })
    }
}

/// Write `series` to `path`, replacing any existing file.
///
/// The parent directory is created when missing. An empty series still
/// produces a header-only CSV (or `[]` for JSON).
///
/// # Errors
/// Returns `BackfillError::FileWrite` for any IO or serialization failure.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        name = "backfill::artifact::write_series",
        skip(series, path),
        fields(path = %path.as_ref().display(), rows = series.len()),
    )
)]
pub fn write_series(
    series: &Series,
    path: impl AsRef<Path>,
    format: ArtifactFormat,
) -> Result<(), BackfillError> {
    let path = path.as_ref();
    let io_err = |e: io::Error| BackfillError::file_write(path.display().to_string(), e.to_string());

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let file = File::create(path).map_err(io_err)?;
    let mut out = BufWriter::new(file);
    write_series_to(series, &mut out, format).map_err(|e| relabel(e, path))?;
    out.flush().map_err(io_err)
}

/// Write `series` to any writer.
///
/// # Errors
/// Returns `BackfillError::FileWrite` (with an empty path) on failure.
pub fn write_series_to<W: Write>(
    series: &Series,
    writer: W,
    format: ArtifactFormat,
) -> Result<(), BackfillError> {
    match format {
        ArtifactFormat::Csv => write_csv(series, writer),
        ArtifactFormat::Json => serde_json::to_writer_pretty(writer, &series.candles)
            .map_err(|e| BackfillError::file_write("", e.to_string())),
    }
}

fn write_csv<W: Write>(series: &Series, writer: W) -> Result<(), BackfillError> {
    let schema = series.schema;
    let fields = schema.output_fields();
    let date_only = schema.date_only();
    let csv_err = |e: csv::Error| BackfillError::file_write("", e.to_string());

    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(schema.headers()).map_err(csv_err)?;
    for candle in &series.candles {
        let record = fields.iter().map(|f| cell(candle, *f, date_only));
        wtr.write_record(record).map_err(csv_err)?;
    }
    wtr.flush()
        .map_err(|e| BackfillError::file_write("", e.to_string()))
}

fn cell(c: &Candle, field: Field, date_only: bool) -> String {
    let time = |t: DateTime<Utc>| {
        if date_only {
            t.format("%Y-%m-%d").to_string()
        } else {
            t.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
        }
    };
    let opt = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();
    match field {
        Field::OpenTime => time(c.open_time),
        Field::Open => c.open.to_string(),
        Field::High => c.high.to_string(),
        Field::Low => c.low.to_string(),
        Field::Close => c.close.to_string(),
        Field::Volume => c.volume.to_string(),
        Field::CloseTime => c.close_time.map(time).unwrap_or_default(),
        Field::QuoteAssetVolume => opt(c.quote_asset_volume),
        Field::NumberOfTrades => c
            .number_of_trades
            .map(|n| n.to_string())
            .unwrap_or_default(),
        Field::TakerBuyBaseAssetVolume => opt(c.taker_buy_base_asset_volume),
        Field::TakerBuyQuoteAssetVolume => opt(c.taker_buy_quote_asset_volume),
        Field::Ignore => String::new(),
    }
}

fn relabel(e: BackfillError, path: &Path) -> BackfillError {
    match e {
        BackfillError::FileWrite { msg, .. } => {
            BackfillError::file_write(path.display().to_string(), msg)
        }
        other => other,
    }
}
