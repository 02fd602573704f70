#[cfg(feature = "test-adapters")]
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use backfill_core::{BackfillError, Credentials, Interval, RawRow, Ticker};

const CONNECTOR: &str = "backfill-binance";

/// Production REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.binance.com";

/// One `/api/v3/klines` call with an inclusive `end_time`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KlineRequest {
    /// Exchange symbol, e.g. `BTCUSDT`.
    pub symbol: String,
    /// Kline width.
    pub interval: Interval,
    /// Inclusive start in epoch milliseconds.
    pub start_time: i64,
    /// Inclusive end in epoch milliseconds.
    pub end_time: i64,
    /// Maximum rows to return.
    pub limit: u16,
}

/// Klines abstraction (so we can inject mocks in tests).
#[async_trait]
pub trait BinanceKlines: Send + Sync {
    /// Fetch raw kline rows for one request.
    async fn klines(&self, req: &KlineRequest) -> Result<Vec<RawRow>, BackfillError>;
}

/// Symbol price abstraction.
#[async_trait]
pub trait BinanceTicker: Send + Sync {
    /// Fetch the latest price for `symbol`.
    async fn price(&self, symbol: &str) -> Result<Ticker, BackfillError>;
}

/// Real adapter backed by a shared `reqwest::Client`.
/// `reqwest::Client` is `Clone + Send + Sync`, so no external locking is needed.
#[derive(Clone)]
pub struct RealAdapter {
    http: reqwest::Client,
    base_url: String,
    credentials: Option<Credentials>,
}

impl RealAdapter {
    /// Wrap an existing client pointed at `base_url`.
    #[must_use]
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        credentials: Option<Credentials>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        }
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        let req = self.http.get(format!("{}{path}", self.base_url));
        match &self.credentials {
            Some(c) => req.header("X-MBX-APIKEY", &c.key),
            None => req,
        }
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<String, BackfillError> {
        let resp = req.send().await.map_err(|e| map_http_err(&e))?;
        let status = resp.status();
        let body = resp.text().await.map_err(|e| map_http_err(&e))?;
        if !status.is_success() {
            return Err(BackfillError::fetch(CONNECTOR, Some(status.as_u16()), body));
        }
        Ok(body)
    }
}

fn map_http_err(e: &reqwest::Error) -> BackfillError {
    BackfillError::fetch(CONNECTOR, e.status().map(|s| s.as_u16()), e.to_string())
}

#[async_trait]
impl BinanceKlines for RealAdapter {
    async fn klines(&self, req: &KlineRequest) -> Result<Vec<RawRow>, BackfillError> {
        let query = [
            ("symbol", req.symbol.clone()),
            ("interval", req.interval.code().to_string()),
            ("startTime", req.start_time.to_string()),
            ("endTime", req.end_time.to_string()),
            ("limit", req.limit.to_string()),
        ];
        let body = self.send(self.get("/api/v3/klines").query(&query)).await?;
        serde_json::from_str(&body).map_err(|e| {
            BackfillError::fetch(CONNECTOR, Some(200), format!("invalid klines payload: {e}"))
        })
    }
}

#[derive(Deserialize)]
struct PricePayload {
    symbol: String,
    price: String,
}

#[async_trait]
impl BinanceTicker for RealAdapter {
    async fn price(&self, symbol: &str) -> Result<Ticker, BackfillError> {
        let body = self
            .send(self.get("/api/v3/ticker/price").query(&[("symbol", symbol)]))
            .await?;
        let payload: PricePayload = serde_json::from_str(&body).map_err(|e| {
            BackfillError::fetch(CONNECTOR, Some(200), format!("invalid ticker payload: {e}"))
        })?;
        let price = payload
            .price
            .trim()
            .parse::<f64>()
            .map_err(|_| {
                BackfillError::Data(format!("ticker price '{}' is not numeric", payload.price))
            })?;
        Ok(Ticker {
            symbol: payload.symbol,
            price,
        })
    }
}

#[cfg(feature = "test-adapters")]
impl dyn BinanceKlines {
    /// Test helper that builds a `BinanceKlines` from a closure over the request.
    pub fn from_fn<F>(f: F) -> Arc<dyn BinanceKlines>
    where
        F: Send + Sync + 'static + Fn(KlineRequest) -> Result<Vec<RawRow>, BackfillError>,
    {
        struct FnKlines<F>(F);
        #[async_trait]
        impl<F> BinanceKlines for FnKlines<F>
        where
            F: Send + Sync + 'static + Fn(KlineRequest) -> Result<Vec<RawRow>, BackfillError>,
        {
            async fn klines(&self, req: &KlineRequest) -> Result<Vec<RawRow>, BackfillError> {
                (self.0)(req.clone())
            }
        }
        Arc::new(FnKlines(f))
    }
}

#[cfg(feature = "test-adapters")]
impl dyn BinanceTicker {
    /// Test helper that builds a `BinanceTicker` from a closure over the symbol.
    pub fn from_fn<F>(f: F) -> Arc<dyn BinanceTicker>
    where
        F: Send + Sync + 'static + Fn(String) -> Result<Ticker, BackfillError>,
    {
        struct FnTicker<F>(F);
        #[async_trait]
        impl<F> BinanceTicker for FnTicker<F>
        where
            F: Send + Sync + 'static + Fn(String) -> Result<Ticker, BackfillError>,
        {
            async fn price(&self, symbol: &str) -> Result<Ticker, BackfillError> {
                (self.0)(symbol.to_string())
            }
        }
        Arc::new(FnTicker(f))
    }
}

/// Hands out shared adapter handles; unimplemented endpoints default to
/// `unsupported`.
#[cfg(feature = "test-adapters")]
pub trait CloneArcAdapters {
    /// Clone as `Arc<dyn BinanceKlines>`.
    fn clone_arc_klines(&self) -> Arc<dyn BinanceKlines> {
        <dyn BinanceKlines>::from_fn(|_| Err(BackfillError::unsupported("candles")))
    }
    /// Clone as `Arc<dyn BinanceTicker>`.
    fn clone_arc_ticker(&self) -> Arc<dyn BinanceTicker> {
        <dyn BinanceTicker>::from_fn(|_| Err(BackfillError::unsupported("ticker")))
    }
}

#[cfg(feature = "test-adapters")]
impl CloneArcAdapters for RealAdapter {
    fn clone_arc_klines(&self) -> Arc<dyn BinanceKlines> {
        Arc::new(self.clone()) as Arc<dyn BinanceKlines>
    }
    fn clone_arc_ticker(&self) -> Arc<dyn BinanceTicker> {
        Arc::new(self.clone()) as Arc<dyn BinanceTicker>
    }
}
