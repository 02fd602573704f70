use std::path::Path;
use std::sync::Arc;

use backfill::{BackfillConnector, BackfillError};
use backfill_binance::BinanceConnector;
use backfill_coinbase::CoinbaseConnector;
use backfill_mock::MockConnector;
use backfill_types::{Credentials, CredentialsFile};

/// Setting this variable to any value swaps every exchange for the offline mock.
pub const USE_MOCK_ENV: &str = "BACKFILL_USE_MOCK";

pub const BINANCE_KEY_ENV: &str = "BINANCE_API_KEY";
pub const BINANCE_SECRET_ENV: &str = "BINANCE_API_SECRET";
pub const COINBASE_KEY_ENV: &str = "COINBASE_KEY";
pub const COINBASE_SECRET_ENV: &str = "COINBASE_SECRET";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exchange {
    Binance,
    Coinbase,
}

fn use_mock() -> bool {
    std::env::var_os(USE_MOCK_ENV).is_some()
}

/// Credentials file named on the command line, else the default file if present.
fn credentials_file(explicit: Option<&Path>) -> Result<Option<CredentialsFile>, BackfillError> {
    match explicit {
        Some(path) => CredentialsFile::load(path).map(Some),
        None => {
            let default = Path::new(CredentialsFile::DEFAULT_PATH);
            if default.exists() {
                CredentialsFile::load(default).map(Some)
            } else {
                Ok(None)
            }
        }
    }
}

fn binance_credentials(config: Option<&Path>) -> Result<Credentials, BackfillError> {
    match credentials_file(config)? {
        Some(file) => file.binance(),
        None => Credentials::from_env(BINANCE_KEY_ENV, BINANCE_SECRET_ENV),
    }
}

// The public candles endpoint needs no key; one is sent only when configured.
fn coinbase_credentials(config: Option<&Path>) -> Result<Option<Credentials>, BackfillError> {
    match credentials_file(config)? {
        Some(file) => Ok(file.coinbase().ok()),
        None => Ok(Credentials::from_env(COINBASE_KEY_ENV, COINBASE_SECRET_ENV).ok()),
    }
}

/// Resolve credentials and build the connector for `exchange`.
pub fn connector_for(
    exchange: Exchange,
    config: Option<&Path>,
) -> Result<Arc<dyn BackfillConnector>, BackfillError> {
    if use_mock() {
        tracing::info!(exchange = ?exchange, "using mock connector");
        return Ok(match exchange {
            Exchange::Binance => Arc::new(MockConnector::binance()),
            Exchange::Coinbase => Arc::new(MockConnector::coinbase()),
        });
    }
    match exchange {
        Exchange::Binance => {
            let creds = binance_credentials(config)?;
            Ok(Arc::new(BinanceConnector::new(creds)?))
        }
        Exchange::Coinbase => {
            let mut builder = CoinbaseConnector::builder();
            if let Some(creds) = coinbase_credentials(config)? {
                builder = builder.credentials(creds);
            }
            Ok(Arc::new(builder.build()?))
        }
    }
}
