use async_trait::async_trait;

use crate::BackfillError;
pub use backfill_types::ConnectorKey;
use backfill_types::{Interval, RawRow, Schema, Ticker, Window};

/// Focused role trait for connectors that serve historical candles.
#[async_trait]
pub trait CandleSource: Send + Sync {
    /// Positional layout of the rows returned by [`CandleSource::fetch_candles`].
    fn schema(&self) -> Schema;

    /// REQUIRED: exact intervals this connector can natively serve.
    fn supported_intervals(&self) -> &'static [Interval];

    /// Maximum rows one request can return, if the source caps pages.
    ///
    /// A window that comes back with exactly this many rows is reported as
    /// possibly truncated.
    fn page_limit(&self) -> Option<usize> {
        None
    }

    /// Fetch the raw rows covering `window` for `symbol`.
    ///
    /// One call issues one request. Rows are returned as received, in the
    /// source's own order and encoding.
    async fn fetch_candles(
        &self,
        symbol: &str,
        window: &Window,
    ) -> Result<Vec<RawRow>, BackfillError>;
}

/// Focused role trait for connectors that report a symbol's last price.
#[async_trait]
pub trait TickerProvider: Send + Sync {
    /// Fetch the latest price for `symbol`.
    async fn ticker(&self, symbol: &str) -> Result<Ticker, BackfillError>;
}

/// Main connector trait implemented by exchange adapters.
///
/// Capabilities are advertised through the `as_*` accessors; a connector
/// returns `None` for anything it does not serve.
pub trait BackfillConnector: Send + Sync {
    /// A stable identifier used in logs and reports (e.g., "backfill-binance").
    fn name(&self) -> &'static str;

    /// Canonical connector key constructed from the static name.
    fn key(&self) -> ConnectorKey {
        ConnectorKey::new(self.name())
    }

    /// Human-friendly vendor string.
    fn vendor(&self) -> &'static str {
        "unknown"
    }

    /// Advertise candle capability by returning a usable trait object reference when supported.
    fn as_candle_source(&self) -> Option<&dyn CandleSource> {
        None
    }

    /// Advertise ticker capability by returning a usable trait object reference when supported.
    fn as_ticker_provider(&self) -> Option<&dyn TickerProvider> {
        None
    }
}
