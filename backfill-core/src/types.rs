//! Re-export of foundational types from `backfill-types`.
// Consolidated re-exports so downstream crates can depend on `backfill-core` only

pub use backfill_types::{
    AssembleOptions, BackfillConfig, BackfillError, BackfillReport, FetchFailurePolicy,
    MalformedRowPolicy, WindowOutcome,
};
pub use backfill_types::{Candle, Interval, RawRow, Series, StepSize, Ticker, Window};
pub use backfill_types::{Column, Field, FieldKind, Schema};
pub use backfill_types::{ConnectorKey, Credentials, CredentialsFile};
