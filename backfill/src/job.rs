use backfill_core::{
    BackfillError, BackfillReport, FetchFailurePolicy, Interval, SeriesAssembler, StepSize,
    WindowOutcome, normalize_batch, plan_windows,
};
use chrono::NaiveDate;
use futures::StreamExt;

use crate::Backfill;

/// Step used when none is set and the source reports no page cap: small
/// enough that a daily series stays under every supported cap.
pub const DEFAULT_STEP: StepSize = StepSize::Days(99);

/// Builder describing one backfill run for a single symbol.
pub struct JobBuilder<'a> {
    pub(crate) backfill: &'a Backfill,
    pub(crate) symbol: String,
    // Required; validated in run() so a missing period is an error, not a panic.
    pub(crate) period: Option<(NaiveDate, NaiveDate)>,
    pub(crate) interval: Interval,
    // None derives the step from the source's page cap in run().
    pub(crate) step: Option<StepSize>,
}

impl<'a> JobBuilder<'a> {
    /// Create a new job bound to a `Backfill` instance.
    ///
    /// Starts with a daily interval, no period and no explicit step.
    #[must_use]
    pub const fn new(backfill: &'a Backfill, symbol: String) -> Self {
        Self {
            backfill,
            symbol,
            period: None,
            interval: Interval::D1,
            step: None,
        }
    }

    /// Set the date range `[start, end)` to backfill.
    ///
    /// Both bounds are UTC midnights. `start >= end` is accepted and yields an
    /// empty run.
    #[must_use]
    pub const fn period(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.period = Some((start, end));
        self
    }

    /// Select the candle interval.
    #[must_use]
    pub const fn interval(mut self, interval: Interval) -> Self {
        self.interval = interval;
        self
    }

    /// Select the size of each request window.
    ///
    /// When unset, the job picks the largest step that keeps every window
    /// below the source's page cap at the chosen interval, falling back to
    /// [`DEFAULT_STEP`] for sources without a cap.
    #[must_use]
    pub const fn step(mut self, step: StepSize) -> Self {
        self.step = Some(step);
        self
    }

    /// Walk the planned windows, fetch and normalize each one, and assemble
    /// the series.
    ///
    /// Behavior:
    /// - Windows are requested in order; with `max_in_flight > 1` several are
    ///   in flight at once but results are still consumed in window order.
    /// - A failed window is either recorded as a warning and left as a gap
    ///   (`FetchFailurePolicy::Skip`) or ends the run (`Abort`).
    /// - Malformed rows follow `MalformedRowPolicy` the same way.
    /// - A window that returns a full page is kept and reported as truncated.
    ///
    /// # Errors
    /// Returns `InvalidArg` for an empty symbol, missing period or zero step,
    /// `Unsupported` when the connector cannot serve candles at the requested
    /// interval, and any window or row error the configured policies escalate.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "backfill::job::run",
            skip(self),
            fields(
                symbol = %self.symbol,
                interval = %self.interval,
                step = ?self.step,
                connector = self.backfill.connector_name(),
            ),
        )
    )]
    pub async fn run(self) -> Result<BackfillReport, BackfillError> {
        let symbol = self.symbol.trim();
        if symbol.is_empty() {
            return Err(BackfillError::InvalidArg("symbol must not be empty".into()));
        }
        let (start, end) = self
            .period
            .ok_or_else(|| BackfillError::InvalidArg("no period specified for backfill".into()))?;

        let backfill = self.backfill;
        let connector = backfill.connector.as_ref();
        let source = connector
            .as_candle_source()
            .ok_or_else(|| BackfillError::unsupported("candles"))?;
        if !source.supported_intervals().contains(&self.interval) {
            return Err(BackfillError::unsupported(format!(
                "candles/{}",
                self.interval
            )));
        }

        let step = self.step.unwrap_or_else(|| {
            source
                .page_limit()
                .and_then(|limit| StepSize::within_page_limit(limit, self.interval))
                .unwrap_or(DEFAULT_STEP)
        });
        #[cfg(feature = "tracing")]
        tracing::debug!(%step, "planning windows");

        let plan = plan_windows(start, end, step, self.interval)?;
        let schema = source.schema();
        let cfg = &backfill.cfg;

        let mut assembler = SeriesAssembler::new(schema, cfg.assemble);
        let mut windows: Vec<WindowOutcome> = Vec::new();
        let mut warnings: Vec<BackfillError> = Vec::new();

        let results = futures::stream::iter(plan)
            .map(move |window| async move {
                (window, backfill.fetch_window(source, symbol, window).await)
            })
            .buffered(cfg.max_in_flight);
        let mut results = std::pin::pin!(results);

        while let Some((window, result)) = results.next().await {
            let rows = match result {
                Ok(rows) => rows,
                Err(e) => {
                    if e.is_fatal() || cfg.fetch_failure == FetchFailurePolicy::Abort {
                        return Err(e);
                    }
                    #[cfg(feature = "tracing")]
                    tracing::warn!(window = %window, error = %e, "skipping failed window");
                    warnings.push(e);
                    windows.push(WindowOutcome::Skipped { window });
                    continue;
                }
            };

            if let Some(limit) = source.page_limit().filter(|l| rows.len() >= *l) {
                #[cfg(feature = "tracing")]
                tracing::warn!(window = %window, limit, "window returned a full page");
                warnings.push(BackfillError::truncated(
                    connector.name(),
                    window.to_string(),
                    limit,
                ));
            }

            let label = window.to_string();
            let batch = normalize_batch(&rows, schema, cfg.malformed_rows)
                .map_err(|e| e.in_window(&label))?;
            windows.push(WindowOutcome::Fetched {
                window,
                raw: rows.len(),
                rows: batch.candles.len(),
            });
            if !batch.rejected.is_empty() {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    window = %window,
                    rejected = batch.rejected.len(),
                    "window had malformed rows"
                );
                warnings.extend(batch.rejected.into_iter().map(|e| e.in_window(&label)));
            }
            assembler.push(window, batch.candles);
        }

        let series = assembler.finish();

        #[cfg(feature = "tracing")]
        {
            let gaps = backfill_core::detect_gaps(&series.candles, self.interval);
            if !gaps.is_empty() {
                let missing: i64 = gaps.iter().map(|g| g.missing).sum();
                tracing::info!(gaps = gaps.len(), missing, "series has gaps");
            }
        }

        Ok(BackfillReport {
            symbol: symbol.to_string(),
            connector: connector.name().to_string(),
            series,
            windows,
            warnings,
        })
    }
}
