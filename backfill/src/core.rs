use std::sync::Arc;
use std::time::Duration;

use backfill_core::{
    AssembleOptions, BackfillConfig, BackfillConnector, BackfillError, CandleSource,
    FetchFailurePolicy, MalformedRowPolicy, RawRow, Ticker, Window,
};

use crate::job::JobBuilder;

/// Orchestrator that drives a connector through a planned set of windows.
pub struct Backfill {
    pub(crate) connector: Arc<dyn BackfillConnector>,
    pub(crate) cfg: BackfillConfig,
}

/// Builder for constructing a `Backfill` orchestrator with custom configuration.
pub struct BackfillBuilder {
    connector: Option<Arc<dyn BackfillConnector>>,
    cfg: BackfillConfig,
}

impl Default for BackfillBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BackfillBuilder {
    /// Create a new builder with default policies.
    ///
    /// Defaults: skip failed windows, skip malformed rows, sort by open time,
    /// no deduplication, one request in flight, no per-request timeout.
    #[must_use]
    pub fn new() -> Self {
        Self {
            connector: None,
            cfg: BackfillConfig::default(),
        }
    }

    /// Register the connector every window is fetched from.
    ///
    /// Registering again replaces the previous connector.
    #[must_use]
    pub fn with_connector(mut self, c: Arc<dyn BackfillConnector>) -> Self {
        self.connector = Some(c);
        self
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, cfg: BackfillConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Select what happens when a window's request fails.
    ///
    /// `Skip` leaves the window as a gap in the series and records a warning;
    /// `Abort` stops the run with that window's error.
    #[must_use]
    pub const fn fetch_failure(mut self, policy: FetchFailurePolicy) -> Self {
        self.cfg.fetch_failure = policy;
        self
    }

    /// Select what happens when a row does not match the source schema.
    #[must_use]
    pub const fn malformed_rows(mut self, policy: MalformedRowPolicy) -> Self {
        self.cfg.malformed_rows = policy;
        self
    }

    /// Stable-sort the assembled series by open time (default on).
    #[must_use]
    pub const fn sort_by_open_time(mut self, yes: bool) -> Self {
        self.cfg.assemble.sort_by_open_time = yes;
        self
    }

    /// Keep only the first candle for each open time (default off).
    #[must_use]
    pub const fn dedup_by_open_time(mut self, yes: bool) -> Self {
        self.cfg.assemble.dedup_by_open_time = yes;
        self
    }

    /// Set both assembly options at once.
    #[must_use]
    pub const fn assemble(mut self, opts: AssembleOptions) -> Self {
        self.cfg.assemble = opts;
        self
    }

    /// Allow up to `n` window requests in flight.
    ///
    /// Results are still consumed in window order.
    #[must_use]
    pub const fn max_in_flight(mut self, n: usize) -> Self {
        self.cfg.max_in_flight = n;
        self
    }

    /// Bound each window request by `timeout`.
    #[must_use]
    pub const fn request_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.request_timeout = Some(timeout);
        self
    }

    /// Build the orchestrator.
    ///
    /// # Errors
    /// Returns `InvalidArg` when no connector is registered, when
    /// `max_in_flight` is zero, or when the request timeout is zero.
    pub fn build(self) -> Result<Backfill, BackfillError> {
        let connector = self
            .connector
            .ok_or_else(|| BackfillError::InvalidArg("no connector registered".into()))?;
        if self.cfg.max_in_flight == 0 {
            return Err(BackfillError::InvalidArg(
                "max_in_flight must be at least 1".into(),
            ));
        }
        if self.cfg.request_timeout.is_some_and(|t| t.is_zero()) {
            return Err(BackfillError::InvalidArg(
                "request_timeout must be greater than zero".into(),
            ));
        }
        Ok(Backfill {
            connector,
            cfg: self.cfg,
        })
    }
}

impl Backfill {
    /// Start building a new `Backfill` instance.
    ///
    /// ```rust,ignore
    /// use std::sync::Arc;
    /// use backfill::{Backfill, FetchFailurePolicy};
    /// use backfill_binance::BinanceConnector;
    ///
    /// let binance = Arc::new(BinanceConnector::new(credentials)?);
    /// let backfill = Backfill::builder()
    ///     .with_connector(binance)
    ///     .fetch_failure(FetchFailurePolicy::Abort)
    ///     .build()?;
    /// ```
    #[must_use]
    pub fn builder() -> BackfillBuilder {
        BackfillBuilder::new()
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &BackfillConfig {
        &self.cfg
    }

    /// Name of the registered connector.
    #[must_use]
    pub fn connector_name(&self) -> &'static str {
        self.connector.name()
    }

    /// Start describing a backfill run for `symbol`.
    #[must_use]
    pub fn job(&self, symbol: impl Into<String>) -> JobBuilder<'_> {
        JobBuilder::new(self, symbol.into())
    }

    /// Latest price for `symbol` from the registered connector.
    ///
    /// # Errors
    /// Returns `Unsupported` if the connector has no ticker capability, or the
    /// connector's error.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "backfill::ticker", skip(self), fields(connector = self.connector.name()))
    )]
    pub async fn ticker(&self, symbol: &str) -> Result<Ticker, BackfillError> {
        let provider = self
            .connector
            .as_ticker_provider()
            .ok_or_else(|| BackfillError::unsupported("ticker"))?;
        match self.cfg.request_timeout {
            Some(t) => tokio::time::timeout(t, provider.ticker(symbol))
                .await
                .unwrap_or_else(|_| {
                    Err(BackfillError::request_timeout(self.connector.name(), "ticker"))
                }),
            None => provider.ticker(symbol).await,
        }
    }

    /// Fetch one window, applying the configured per-request timeout.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "backfill::core::fetch_window",
            skip(self, source),
            fields(connector = self.connector.name(), window = %window),
        )
    )]
    pub(crate) async fn fetch_window(
        &self,
        source: &dyn CandleSource,
        symbol: &str,
        window: Window,
    ) -> Result<Vec<RawRow>, BackfillError> {
        let fut = source.fetch_candles(symbol, &window);
        match self.cfg.request_timeout {
            Some(t) => tokio::time::timeout(t, fut).await.unwrap_or_else(|_| {
                Err(BackfillError::request_timeout(
                    self.connector.name(),
                    window.to_string(),
                ))
            }),
            None => fut.await,
        }
    }
}
