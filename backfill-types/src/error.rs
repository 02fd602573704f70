use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the backfill workspace.
///
/// Configuration and artifact failures are fatal to a run. Fetch and row
/// failures are scoped to a single window or row and are either skipped or
/// escalated according to [`crate::BackfillConfig`].
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BackfillError {
    /// Required credential configuration is absent.
    #[error("missing configuration: {what}")]
    ConfigMissing {
        /// Name of the missing setting, e.g. "BINANCE_API_KEY".
        what: String,
    },

    /// A historical-data endpoint returned a non-success response or the
    /// request never completed.
    #[error("{connector} fetch failed{}: {body}", status_suffix(.status))]
    Fetch {
        /// Connector name that failed.
        connector: String,
        /// HTTP status code when a response was received.
        status: Option<u16>,
        /// Response body or transport error message.
        body: String,
    },

    /// A returned row does not match the source schema.
    #[error("malformed row {row}{}: {reason}", window_suffix(.window))]
    MalformedRow {
        /// Zero-based position of the row within its batch.
        row: usize,
        /// Label of the window the batch came from, once known.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        window: Option<String>,
        /// What failed to parse.
        reason: String,
    },

    /// The artifact could not be written.
    #[error("failed to write {path}: {msg}")]
    FileWrite {
        /// Destination path.
        path: String,
        /// Underlying IO or serialization message.
        msg: String,
    },

    /// The requested capability is not implemented by the target connector.
    #[error("unsupported capability: {capability}")]
    Unsupported {
        /// A capability string describing what was requested (e.g. "candles/4h").
        capability: String,
    },

    /// Issues with returned or derived data (out-of-range timestamps, etc.).
    #[error("data issue: {0}")]
    Data(String),

    /// Invalid input argument.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// A single window request exceeded the configured timeout.
    #[error("request timed out: {connector} {window}")]
    RequestTimeout {
        /// Connector name that timed out.
        connector: String,
        /// Human-readable window label.
        window: String,
    },

    /// A window returned a full page; candles past the page cap were not fetched.
    #[error("{connector} returned a full page of {limit} rows for {window}; later candles in the window are missing")]
    Truncated {
        /// Connector name.
        connector: String,
        /// Human-readable window label.
        window: String,
        /// Page cap that was hit.
        limit: usize,
    },

    /// Unknown/opaque error.
    #[error("unknown error: {0}")]
    Other(String),
}

impl BackfillError {
    /// Helper: build a `ConfigMissing` error for a setting name.
    pub fn config_missing(what: impl Into<String>) -> Self {
        Self::ConfigMissing { what: what.into() }
    }

    /// Helper: build a `Fetch` error carrying the HTTP status and body.
    pub fn fetch(connector: impl Into<String>, status: Option<u16>, body: impl Into<String>) -> Self {
        Self::Fetch {
            connector: connector.into(),
            status,
            body: body.into(),
        }
    }

    /// Helper: build a `MalformedRow` error.
    pub fn malformed(row: usize, reason: impl Into<String>) -> Self {
        Self::MalformedRow {
            row,
            window: None,
            reason: reason.into(),
        }
    }

    /// Attach a window label to a `MalformedRow` error; other variants pass
    /// through unchanged.
    #[must_use]
    pub fn in_window(self, label: impl Into<String>) -> Self {
        match self {
            Self::MalformedRow { row, reason, .. } => Self::MalformedRow {
                row,
                window: Some(label.into()),
                reason,
            },
            other => other,
        }
    }

    /// Helper: build a `FileWrite` error.
    pub fn file_write(path: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::FileWrite {
            path: path.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build an `Unsupported` error for a capability string.
    #[must_use]
    pub fn unsupported(cap: impl Into<String>) -> Self {
        Self::Unsupported {
            capability: cap.into(),
        }
    }

    /// Helper: build a `RequestTimeout` error.
    pub fn request_timeout(connector: impl Into<String>, window: impl Into<String>) -> Self {
        Self::RequestTimeout {
            connector: connector.into(),
            window: window.into(),
        }
    }

    /// Helper: build a `Truncated` warning.
    pub fn truncated(connector: impl Into<String>, window: impl Into<String>, limit: usize) -> Self {
        Self::Truncated {
            connector: connector.into(),
            window: window.into(),
            limit,
        }
    }

    /// Returns true if the error aborts a run regardless of policy.
    ///
    /// Fetch, timeout, truncation and row errors are window-scoped and subject to the
    /// configured policies; everything else stops the run.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::Fetch { .. }
                | Self::RequestTimeout { .. }
                | Self::MalformedRow { .. }
                | Self::Truncated { .. }
        )
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

fn window_suffix(window: &Option<String>) -> String {
    window.as_ref().map(|w| format!(" in {w}")).unwrap_or_default()
}

impl From<chrono::ParseError> for BackfillError {
    fn from(e: chrono::ParseError) -> Self {
        Self::InvalidArg(e.to_string())
    }
}
