//! Backfill drives one exchange connector through a planned set of request
//! windows and assembles the result into a single candle series.
//!
//! Overview
//! - Plans contiguous half-open windows over `[start, end)` with a day, hour
//!   or calendar-year step; unless told otherwise the step is sized to stay
//!   under the connector's page cap.
//! - Requests each window from a connector implementing the `backfill_core`
//!   contracts, optionally with several requests in flight.
//! - Normalizes raw rows against the connector's schema and assembles them in
//!   window order, with optional sort and first-wins deduplication.
//! - Writes the series as CSV (or a JSON records view) with the source's
//!   column names.
//!
//! Failure handling
//! - `FetchFailurePolicy::Skip` (default) leaves a failed window as a gap and
//!   records the error in `BackfillReport::warnings`; `Abort` ends the run.
//! - `MalformedRowPolicy` applies the same choice to individual rows.
//! - A window that fills a whole page is kept and reported as truncated.
//!
//! Example
//! ```rust,ignore
//! use std::sync::Arc;
//! use backfill::{Backfill, ArtifactFormat, StepSize, Interval, write_series};
//! use backfill_binance::BinanceConnector;
//! use chrono::NaiveDate;
//!
//! let binance = Arc::new(BinanceConnector::new(credentials)?);
//! let backfill = Backfill::builder().with_connector(binance).build()?;
//!
//! let report = backfill
//!     .job("BTCUSDT")
//!     .interval(Interval::D1)
//!     .period(
//!         NaiveDate::from_ymd_opt(2017, 8, 17).unwrap(),
//!         NaiveDate::from_ymd_opt(2025, 8, 17).unwrap(),
//!     )
//!     .step(StepSize::Years(1))
//!     .run()
//!     .await?;
//!
//! write_series(&report.series, "data/btcusdt_data.csv", ArtifactFormat::Csv)?;
//! ```
#![warn(missing_docs)]

mod artifact;
mod core;
mod job;

pub use artifact::{ArtifactFormat, write_series, write_series_to};
pub use core::{Backfill, BackfillBuilder};
pub use job::{DEFAULT_STEP, JobBuilder};

pub use backfill_core::{
    AssembleOptions, BackfillConfig, BackfillConnector, BackfillError, BackfillReport, Candle,
    CandleSource, FetchFailurePolicy, Interval, MalformedRowPolicy, RawRow, Schema, Series,
    StepSize, Ticker, TickerProvider, Window, WindowOutcome,
};
