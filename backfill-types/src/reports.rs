//! Report envelopes produced by the orchestrator.

use serde::{Deserialize, Serialize};

use crate::error::BackfillError;
use crate::{Series, Window};

/// Outcome of one window within a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WindowOutcome {
    /// Rows fetched; `rows` candles kept after normalization.
    Fetched {
        /// Requested window.
        window: Window,
        /// Raw rows returned by the source.
        raw: usize,
        /// Candles kept after normalization.
        rows: usize,
    },
    /// The request failed and the window was left as a gap.
    Skipped {
        /// Requested window.
        window: Window,
    },
}

impl WindowOutcome {
    /// The window this outcome belongs to.
    #[must_use]
    pub const fn window(&self) -> &Window {
        match self {
            Self::Fetched { window, .. } | Self::Skipped { window } => window,
        }
    }
}

/// Summary of a backfill run.
///
/// Wraps the assembled [`Series`], one [`WindowOutcome`] per planned window
/// in window order, and any non-fatal `warnings` (failed windows, skipped
/// rows, truncated pages).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackfillReport {
    /// Symbol that was fetched.
    pub symbol: String,
    /// Connector name that served the run.
    pub connector: String,
    /// Assembled series.
    pub series: Series,
    /// Per-window outcomes in window order.
    pub windows: Vec<WindowOutcome>,
    /// Non-fatal issues encountered while building the report.
    pub warnings: Vec<BackfillError>,
}

impl BackfillReport {
    /// Windows that were left as gaps.
    pub fn skipped_windows(&self) -> impl Iterator<Item = &Window> {
        self.windows.iter().filter_map(|w| match w {
            WindowOutcome::Skipped { window } => Some(window),
            WindowOutcome::Fetched { .. } => None,
        })
    }
}
