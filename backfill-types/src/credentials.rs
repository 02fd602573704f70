//! API credentials, loaded once at startup and handed to connector constructors.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::BackfillError;

/// Key/secret pair for one exchange.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Public API key.
    pub key: String,
    /// API secret.
    pub secret: String,
}

impl Credentials {
    /// Build from a key and secret.
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
        }
    }

    /// Read the pair from two environment variables.
    ///
    /// # Errors
    /// Returns `ConfigMissing` naming the first variable that is unset or empty.
    pub fn from_env(key_var: &str, secret_var: &str) -> Result<Self, BackfillError> {
        let read = |var: &str| {
            std::env::var(var)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| BackfillError::config_missing(var))
        };
        Ok(Self::new(read(key_var)?, read(secret_var)?))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("key", &self.key)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Local, git-ignored credentials file (`backfill.local.json`).
///
/// ```json
/// {
///   "binance_api_key": "...",
///   "binance_api_secret": "...",
///   "coinbase_key": "...",
///   "coinbase_secret": "..."
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialsFile {
    /// Binance API key.
    #[serde(default)]
    pub binance_api_key: Option<String>,
    /// Binance API secret.
    #[serde(default)]
    pub binance_api_secret: Option<String>,
    /// Coinbase API key.
    #[serde(default)]
    pub coinbase_key: Option<String>,
    /// Coinbase API secret.
    #[serde(default)]
    pub coinbase_secret: Option<String>,
}

impl CredentialsFile {
    /// Default file name looked up in the working directory.
    pub const DEFAULT_PATH: &'static str = "backfill.local.json";

    /// Load and parse the file at `path`.
    ///
    /// # Errors
    /// Returns `ConfigMissing` if the file cannot be read and `InvalidArg` if
    /// it is not valid JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, BackfillError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            BackfillError::config_missing(format!("{} ({e})", path.display()))
        })?;
        serde_json::from_str(&raw)
            .map_err(|e| BackfillError::InvalidArg(format!("{}: {e}", path.display())))
    }

    /// Binance credentials.
    ///
    /// # Errors
    /// Returns `ConfigMissing` if either value is absent.
    pub fn binance(&self) -> Result<Credentials, BackfillError> {
        pair(
            self.binance_api_key.as_deref(),
            self.binance_api_secret.as_deref(),
            "binance_api_key",
            "binance_api_secret",
        )
    }

    /// Coinbase credentials.
    ///
    /// # Errors
    /// Returns `ConfigMissing` if either value is absent.
    pub fn coinbase(&self) -> Result<Credentials, BackfillError> {
        pair(
            self.coinbase_key.as_deref(),
            self.coinbase_secret.as_deref(),
            "coinbase_key",
            "coinbase_secret",
        )
    }
}

fn pair(
    key: Option<&str>,
    secret: Option<&str>,
    key_name: &str,
    secret_name: &str,
) -> Result<Credentials, BackfillError> {
    let key = key
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| BackfillError::config_missing(key_name))?;
    let secret = secret
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| BackfillError::config_missing(secret_name))?;
    Ok(Credentials::new(key, secret))
}
