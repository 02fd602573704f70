//! Run configuration shared by the orchestrator and the CLI.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// What to do when a window's request fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum FetchFailurePolicy {
    /// Record a warning, leave the window as a gap, and continue with the next one.
    #[default]
    Skip,
    /// Stop the run and return the window's error.
    Abort,
}

/// What to do when a returned row does not match the source schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum MalformedRowPolicy {
    /// Drop the row, record a warning, keep the rest of the batch.
    #[default]
    Skip,
    /// Stop the run and return the row's error.
    Abort,
}

/// Post-processing applied to the concatenated series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssembleOptions {
    /// Stable sort by `open_time` after concatenation.
    pub sort_by_open_time: bool,
    /// Keep only the first candle seen for each `open_time`.
    pub dedup_by_open_time: bool,
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            sort_by_open_time: true,
            dedup_by_open_time: false,
        }
    }
}

/// Global configuration for a `Backfill` run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackfillConfig {
    /// Handling of per-window fetch failures.
    pub fetch_failure: FetchFailurePolicy,
    /// Handling of rows that fail normalization.
    pub malformed_rows: MalformedRowPolicy,
    /// Series post-processing.
    pub assemble: AssembleOptions,
    /// Maximum number of window requests in flight. `1` fetches strictly in order.
    pub max_in_flight: usize,
    /// Optional timeout applied to each window request.
    pub request_timeout: Option<Duration>,
}

impl Default for BackfillConfig {
    fn default() -> Self {
        Self {
            fetch_failure: FetchFailurePolicy::default(),
            malformed_rows: MalformedRowPolicy::default(),
            assemble: AssembleOptions::default(),
            max_in_flight: 1,
            request_timeout: None,
        }
    }
}
