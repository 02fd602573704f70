//! Mock connectors for CI-safe tests and offline runs.
//!
//! [`MockConnector`] serves deterministic candles for any window, shaped like
//! either exchange's rows. Special symbols force failure paths:
//!
//! - `FAIL`: every window fails with a fetch error.
//! - `TIMEOUT`: every window sleeps briefly before answering.
//! - `MALFORMED`: every window carries one unparseable row first.
//! - `EMPTY`: every window returns no rows.
//!
//! [`DynamicMockConnector`] defers to a controller for per-window behavior.

use std::time::Duration;

use async_trait::async_trait;
use backfill_core::connector::{BackfillConnector, CandleSource, TickerProvider};
use backfill_core::{BackfillError, Interval, RawRow, Schema, Ticker, Window};

mod dynamic;
mod fixtures;

pub use dynamic::{DynamicMockConnector, DynamicMockController, MockBehavior};
pub use fixtures::klines::{bucket_starts, rows_for};

/// Mock connector providing deterministic data from generated fixtures.
#[derive(Debug, Clone, Copy)]
pub struct MockConnector {
    schema: Schema,
}

impl Default for MockConnector {
    fn default() -> Self {
        Self::binance()
    }
}

impl MockConnector {
    /// Latency injected for the `TIMEOUT` symbol.
    pub const TIMEOUT_DELAY: Duration = Duration::from_millis(200);

    /// Mock serving rows in `schema`'s layout.
    #[must_use]
    pub const fn new(schema: Schema) -> Self {
        Self { schema }
    }

    /// Mock shaped like Binance klines.
    #[must_use]
    pub const fn binance() -> Self {
        Self::new(Schema::FullStats)
    }

    /// Mock shaped like Coinbase candles.
    #[must_use]
    pub const fn coinbase() -> Self {
        Self::new(Schema::Simple)
    }

    async fn maybe_fail_or_timeout(symbol: &str, window: &Window) -> Result<(), BackfillError> {
        match symbol {
            "FAIL" => Err(BackfillError::fetch(
                "backfill-mock",
                Some(500),
                format!("forced failure for {window}"),
            )),
            "TIMEOUT" => {
                tokio::time::sleep(Self::TIMEOUT_DELAY).await;
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

impl BackfillConnector for MockConnector {
    fn name(&self) -> &'static str {
        "backfill-mock"
    }

    fn vendor(&self) -> &'static str {
        "Mock"
    }

    fn as_candle_source(&self) -> Option<&dyn CandleSource> {
        Some(self as &dyn CandleSource)
    }

    fn as_ticker_provider(&self) -> Option<&dyn TickerProvider> {
        Some(self as &dyn TickerProvider)
    }
}

#[async_trait]
impl CandleSource for MockConnector {
    fn schema(&self) -> Schema {
        self.schema
    }

    fn supported_intervals(&self) -> &'static [Interval] {
        Interval::ALL
    }

    async fn fetch_candles(
        &self,
        symbol: &str,
        window: &Window,
    ) -> Result<Vec<RawRow>, BackfillError> {
        Self::maybe_fail_or_timeout(symbol, window).await?;
        let mut rows = match symbol {
            "EMPTY" => Vec::new(),
            _ => fixtures::klines::rows_for(window, self.schema),
        };
        if symbol == "MALFORMED" {
            rows.insert(0, fixtures::klines::malformed_row());
        }
        Ok(rows)
    }
}

#[async_trait]
impl TickerProvider for MockConnector {
    async fn ticker(&self, symbol: &str) -> Result<Ticker, BackfillError> {
        fixtures::ticker::by_symbol(symbol).ok_or_else(|| {
            BackfillError::fetch(
                "backfill-mock",
                Some(400),
                format!("unknown symbol {symbol}"),
            )
        })
    }
}
