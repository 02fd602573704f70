use std::time::Duration;

use backfill_core::{BackfillError, Credentials};

use crate::BinanceConnector;
use crate::adapter::{DEFAULT_BASE_URL, RealAdapter};

/// Builder for a [`BinanceConnector`] backed by the real REST adapter.
#[derive(Debug, Clone)]
pub struct BinanceConnectorBuilder {
    base_url: String,
    credentials: Option<Credentials>,
    timeout: Option<Duration>,
}

impl Default for BinanceConnectorBuilder {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            credentials: None,
            timeout: None,
        }
    }
}

impl BinanceConnector {
    /// Returns a builder pointed at the production endpoint without credentials.
    #[must_use]
    pub fn builder() -> BinanceConnectorBuilder {
        BinanceConnectorBuilder::default()
    }

    /// Connector for the production endpoint authenticated with `credentials`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(credentials: Credentials) -> Result<Self, BackfillError> {
        Self::builder().credentials(credentials).build()
    }
}

impl BinanceConnectorBuilder {
    /// Override the REST base URL (tests point this at a local mock server).
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Send `credentials.key` as the `X-MBX-APIKEY` header.
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
    pub fn build(self) -> Result<BinanceConnector, BackfillError> {
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
        Ok(BinanceConnector::from_adapter(&adapter))
    }
}
