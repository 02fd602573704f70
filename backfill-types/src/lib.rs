//! Backfill data transfer objects and configuration primitives.
#![warn(missing_docs)]

mod candle;
mod config;
mod connector;
mod credentials;
mod error;
mod interval;
mod reports;
mod schema;
mod window;

pub use candle::{Candle, Series, Ticker};
pub use config::{AssembleOptions, BackfillConfig, FetchFailurePolicy, MalformedRowPolicy};
pub use connector::ConnectorKey;
pub use credentials::{Credentials, CredentialsFile};
pub use error::BackfillError;
pub use interval::Interval;
pub use reports::{BackfillReport, WindowOutcome};
pub use schema::{Column, Field, FieldKind, Schema};
pub use window::{StepSize, Window};

/// One raw row as returned by a source: a fixed-position array of JSON
/// strings and numbers.
pub type RawRow = Vec<serde_json::Value>;
