//! backfill-core
//!
//! Core types, traits, and utilities shared across the backfill workspace.
//!
//! - `types`: re-exported data structures (candles, windows, schemas, errors).
//! - `connector`: the `BackfillConnector` trait and capability provider traits.
//! - `timeseries`: timestamp conversion, window planning, row normalization,
//!   series assembly and gap detection.
#![warn(missing_docs)]

/// Connector capability traits and the primary `BackfillConnector` interface.
pub mod connector;
/// Time-series utilities: timestamps, windows, normalization, assembly.
pub mod timeseries;
pub mod types;

pub use connector::{BackfillConnector, CandleSource, TickerProvider};
pub use timeseries::assemble::{SeriesAssembler, assemble};
pub use timeseries::gaps::{Gap, detect_gaps, estimate_step_seconds};
pub use timeseries::normalize::{NormalizedBatch, normalize_batch, normalize_row};
pub use timeseries::timestamp::{epoch_ms_to_utc, epoch_ms_to_utc_i64, utc_to_epoch_ms};
pub use timeseries::window::{WindowPlan, plan_windows};
pub use types::*;
