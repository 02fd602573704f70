//! backfill-binance
//!
//! Public connector that implements `BackfillConnector` on top of the Binance
//! spot REST API. Serves 12-field kline rows (`/api/v3/klines`) and symbol
//! prices (`/api/v3/ticker/price`).
#![warn(missing_docs)]

/// Adapter definitions and the production adapter backed by `reqwest`.
pub mod adapter;
mod builder;

use std::sync::Arc;

#[cfg(feature = "test-adapters")]
use adapter::CloneArcAdapters;
use adapter::{BinanceKlines, BinanceTicker, KlineRequest, RealAdapter};
use async_trait::async_trait;
use backfill_core::{
    BackfillError, Interval, RawRow, Schema, Ticker, Window,
    connector::{BackfillConnector, CandleSource, ConnectorKey, TickerProvider},
};

pub use builder::BinanceConnectorBuilder;

#[cfg(not(feature = "test-adapters"))]
type AdapterArc = Arc<RealAdapter>;

#[cfg(feature = "test-adapters")]
type KlinesAdapter = Arc<dyn BinanceKlines>;
#[cfg(not(feature = "test-adapters"))]
type KlinesAdapter = AdapterArc;

#[cfg(feature = "test-adapters")]
type TickerAdapter = Arc<dyn BinanceTicker>;
#[cfg(not(feature = "test-adapters"))]
type TickerAdapter = AdapterArc;

/// Rows per `/api/v3/klines` page.
pub const PAGE_LIMIT: u16 = 1000;

/// Public connector type. Production users construct it with
/// `BinanceConnector::builder()`.
pub struct BinanceConnector {
    klines: KlinesAdapter,
    ticker: TickerAdapter,
}

impl BinanceConnector {
    /// Static connector key used in logs and reports.
    pub const KEY: ConnectorKey = ConnectorKey::new("backfill-binance");

    /// Build from a concrete `RealAdapter` by cloning it into shared handles.
    #[cfg(not(feature = "test-adapters"))]
    #[must_use]
    pub fn from_adapter(adapter: &RealAdapter) -> Self {
        let shared = Arc::new(adapter.clone());
        Self {
            klines: Arc::clone(&shared),
            ticker: shared,
        }
    }

    /// For tests/injection (requires the `test-adapters` feature).
    #[cfg(feature = "test-adapters")]
    pub fn from_adapter<A: CloneArcAdapters + 'static>(adapter: &A) -> Self {
        Self {
            klines: adapter.clone_arc_klines(),
            ticker: adapter.clone_arc_ticker(),
        }
    }

    /// Translate a half-open window into a kline request.
    ///
    /// Binance treats `endTime` as inclusive, so the request ends one
    /// millisecond before the window's exclusive end.
    #[must_use]
    pub fn request_for(symbol: &str, window: &Window) -> KlineRequest {
        KlineRequest {
            symbol: symbol.to_string(),
            interval: window.interval,
            start_time: window.start_ms(),
            end_time: window.end_ms() - 1,
            limit: PAGE_LIMIT,
        }
    }
}

#[async_trait]
impl CandleSource for BinanceConnector {
    fn schema(&self) -> Schema {
        Schema::FullStats
    }

    fn supported_intervals(&self) -> &'static [Interval] {
        Interval::ALL
    }

    fn page_limit(&self) -> Option<usize> {
        Some(usize::from(PAGE_LIMIT))
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "backfill_binance::fetch_candles",
            skip(self, window),
            fields(symbol = %symbol, window = %window),
        )
    )]
    async fn fetch_candles(
        &self,
        symbol: &str,
        window: &Window,
    ) -> Result<Vec<RawRow>, BackfillError> {
        if window.start >= window.end {
            return Ok(Vec::new());
        }
        self.klines.klines(&Self::request_for(symbol, window)).await
    }
}

#[async_trait]
impl TickerProvider for BinanceConnector {
    async fn ticker(&self, symbol: &str) -> Result<Ticker, BackfillError> {
        self.ticker.price(symbol).await
    }
}

impl BackfillConnector for BinanceConnector {
    fn name(&self) -> &'static str {
        Self::KEY.as_str()
    }

    fn vendor(&self) -> &'static str {
        "Binance"
    }

    fn as_candle_source(&self) -> Option<&dyn CandleSource> {
        Some(self as &dyn CandleSource)
    }

    fn as_ticker_provider(&self) -> Option<&dyn TickerProvider> {
        Some(self as &dyn TickerProvider)
    }
}
