//! Time-series utilities shared by connectors and orchestrator.
//!
//! Modules include:
//! - `timestamp`: epoch milliseconds to UTC and back
//! - `window`: plan contiguous request windows over a date range
//! - `normalize`: turn positional raw rows into typed candles
//! - `assemble`: concatenate per-window batches into one series
//! - `gaps`: infer cadence and report missing buckets
/// Series assembly with optional sort and deduplication.
pub mod assemble;
/// Cadence inference and gap detection.
pub mod gaps;
/// Raw row normalization.
pub mod normalize;
/// Epoch timestamp conversion.
pub mod timestamp;
/// Window planning.
pub mod window;
