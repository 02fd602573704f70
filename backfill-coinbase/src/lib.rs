//! backfill-coinbase
//!
//! Public connector that implements `BackfillConnector` on top of the Coinbase
//! Exchange public candles endpoint. Rows are `[time, low, high, open, close,
//! volume]` with time in epoch seconds, newest first.
#![warn(missing_docs)]

/// Adapter definitions and the production adapter backed by `reqwest`.
pub mod adapter;

use std::sync::Arc;
use std::time::Duration;

use adapter::{CandlesRequest, CoinbaseCandles, DEFAULT_BASE_URL, RealAdapter};
use async_trait::async_trait;
use backfill_core::{
    BackfillError, Credentials, Interval, RawRow, Schema, Window,
    connector::{BackfillConnector, CandleSource, ConnectorKey},
};
use chrono::TimeDelta;

/// Maximum candles the endpoint returns per request.
pub const PAGE_LIMIT: usize = 300;

/// Granularities the endpoint accepts.
pub const SUPPORTED_INTERVALS: &[Interval] = &[
    Interval::M1,
    Interval::M5,
    Interval::M15,
    Interval::H1,
    Interval::H6,
    Interval::D1,
];

/// Public connector type.
pub struct CoinbaseConnector {
    candles: Arc<dyn CoinbaseCandles>,
}

impl CoinbaseConnector {
    /// Static connector key used in logs and reports.
    pub const KEY: ConnectorKey = ConnectorKey::new("backfill-coinbase");

    /// Returns a builder pointed at the production endpoint.
    #[must_use]
    pub fn builder() -> CoinbaseConnectorBuilder {
        CoinbaseConnectorBuilder::default()
    }

    /// Connector for the production endpoint with default settings.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new() -> Result<Self, BackfillError> {
        Self::builder().build()
    }

    /// Build around any candles adapter (requires the `test-adapters` feature
    /// for closure-backed adapters).
    #[must_use]
    pub fn from_adapter(candles: Arc<dyn CoinbaseCandles>) -> Self {
        Self { candles }
    }

    /// Translate a half-open window into a candles request.
    ///
    /// The endpoint's `end` is inclusive of the bucket starting at `end`, so
    /// the request stops one bucket before the window's exclusive end.
    ///
    /// # Errors
    /// Returns `Unsupported` when the window's interval is not an accepted
    /// granularity.
    pub fn request_for(symbol: &str, window: &Window) -> Result<CandlesRequest, BackfillError> {
        let granularity = window
            .interval
            .seconds()
            .filter(|_| SUPPORTED_INTERVALS.contains(&window.interval))
            .ok_or_else(|| BackfillError::unsupported(format!("candles/{}", window.interval)))?;
        let end = (window.end - TimeDelta::seconds(granularity)).max(window.start);
        Ok(CandlesRequest {
            product: symbol.to_string(),
            start: window.start,
            end,
            granularity,
        })
    }
}

#[async_trait]
impl CandleSource for CoinbaseConnector {
    fn schema(&self) -> Schema {
        Schema::Simple
    }

    fn supported_intervals(&self) -> &'static [Interval] {
        SUPPORTED_INTERVALS
    }

    fn page_limit(&self) -> Option<usize> {
        Some(PAGE_LIMIT)
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "backfill_coinbase::fetch_candles",
            skip(self, window),
            fields(symbol = %symbol, window = %window),
        )
    )]
    async fn fetch_candles(
        &self,
        symbol: &str,
        window: &Window,
    ) -> Result<Vec<RawRow>, BackfillError> {
        let req = Self::request_for(symbol, window)?;
        if window.start >= window.end {
            return Ok(Vec::new());
        }
        self.candles.candles(&req).await
    }
}

impl BackfillConnector for CoinbaseConnector {
    fn name(&self) -> &'static str {
        Self::KEY.as_str()
    }

    fn vendor(&self) -> &'static str {
        "Coinbase"
    }

    fn as_candle_source(&self) -> Option<&dyn CandleSource> {
        Some(self as &dyn CandleSource)
    }
}

/// Builder for a [`CoinbaseConnector`] backed by the real REST adapter.
#[derive(Debug, Clone)]
pub struct CoinbaseConnectorBuilder {
    base_url: String,
    credentials: Option<Credentials>,
    timeout: Option<Duration>,
}

impl Default for CoinbaseConnectorBuilder {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            credentials: None,
            timeout: None,
        }
    }
}

impl CoinbaseConnectorBuilder {
    /// Override the REST base URL (tests point this at a local mock server).
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Send `credentials.key` as the `CB-ACCESS-KEY` header.
    #[must_use]
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// HTTP-level timeout for every request.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the connector.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn build(self) -> Result<CoinbaseConnector, BackfillError> {
        // The exchange rejects requests without a user agent.
        let mut http = reqwest::Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(t) = self.timeout {
            http = http.timeout(t);
        }
        let http = http
            .build()
            .map_err(|e| BackfillError::Other(format!("http client: {e}")))?;
        let adapter = RealAdapter::new(http, self.base_url, self.credentials);
        Ok(CoinbaseConnector::from_adapter(Arc::new(adapter)))
    }
}
