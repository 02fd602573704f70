#[cfg(feature = "test-adapters")]
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};

use backfill_core::{BackfillError, Credentials, RawRow};

const CONNECTOR: &str = "backfill-coinbase";

/// Production REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.exchange.coinbase.com";

/// One `/products/{product}/candles` call with an inclusive `end`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandlesRequest {
    /// Product id, e.g. `BTC-USD`.
    pub product: String,
    /// Inclusive start.
    pub start: DateTime<Utc>,
    /// Inclusive end.
    pub end: DateTime<Utc>,
    /// Bucket width in seconds.
    pub granularity: i64,
}

/// Candles abstraction (so we can inject mocks in tests).
#[async_trait]
pub trait CoinbaseCandles: Send + Sync {
    /// Fetch raw candle rows for one request.
    async fn candles(&self, req: &CandlesRequest) -> Result<Vec<RawRow>, BackfillError>;
}

/// Real adapter backed by a shared `reqwest::Client`.
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
}

fn map_http_err(e: &reqwest::Error) -> BackfillError {
    BackfillError::fetch(CONNECTOR, e.status().map(|s| s.as_u16()), e.to_string())
}

fn iso(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[async_trait]
impl CoinbaseCandles for RealAdapter {
    async fn candles(&self, req: &CandlesRequest) -> Result<Vec<RawRow>, BackfillError> {
        let url = format!("{}/products/{}/candles", self.base_url, req.product);
        let query = [
            ("start", iso(req.start)),
            ("end", iso(req.end)),
            ("granularity", req.granularity.to_string()),
        ];
        let mut builder = self.http.get(url).query(&query);
        if let Some(c) = &self.credentials {
            builder = builder.header("CB-ACCESS-KEY", &c.key);
        }

        let resp = builder.send().await.map_err(|e| map_http_err(&e))?;
        let status = resp.status();
        let body = resp.text().await.map_err(|e| map_http_err(&e))?;
        if !status.is_success() {
            return Err(BackfillError::fetch(CONNECTOR, Some(status.as_u16()), body));
        }
        serde_json::from_str(&body).map_err(|e| {
            BackfillError::fetch(CONNECTOR, Some(status.as_u16()), format!("invalid candles payload: {e}"))
        })
    }
}

#[cfg(feature = "test-adapters")]
impl dyn CoinbaseCandles {
    /// Test helper that builds a `CoinbaseCandles` from a closure over the request.
    pub fn from_fn<F>(f: F) -> Arc<dyn CoinbaseCandles>
    where
        F: Send + Sync + 'static + Fn(CandlesRequest) -> Result<Vec<RawRow>, BackfillError>,
    {
        struct FnCandles<F>(F);
        #[async_trait]
        impl<F> CoinbaseCandles for FnCandles<F>
        where
            F: Send + Sync + 'static + Fn(CandlesRequest) -> Result<Vec<RawRow>, BackfillError>,
        {
            async fn candles(&self, req: &CandlesRequest) -> Result<Vec<RawRow>, BackfillError> {
                (self.0)(req.clone())
            }
        }
        Arc::new(FnCandles(f))
    }
}
