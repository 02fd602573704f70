// Shared fixtures for the job and artifact tests.
#![allow(dead_code)]

use std::sync::Arc;

use backfill::{Backfill, BackfillBuilder, BackfillConnector, Schema};
use backfill_mock::{DynamicMockConnector, DynamicMockController, MockConnector};
use chrono::{DateTime, NaiveDate, Utc};

pub mod slow_connector;

pub use slow_connector::SlowConnector;

pub const BTCUSDT: &str = "BTCUSDT";
pub const BTC_USD: &str = "BTC-USD";

/// Calendar date from components for readability in tests.
pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).expect("invalid date")
}

/// UTC midnight of the given date.
pub fn dt(y: i32, m: u32, day: u32) -> DateTime<Utc> {
    d(y, m, day).and_hms_opt(0, 0, 0).expect("midnight").and_utc()
}

/// Builder pre-loaded with the static Binance-shaped mock.
pub fn binance_mock() -> BackfillBuilder {
    Backfill::builder().with_connector(Arc::new(MockConnector::binance()))
}

/// Builder pre-loaded with the static Coinbase-shaped mock.
pub fn coinbase_mock() -> BackfillBuilder {
    Backfill::builder().with_connector(Arc::new(MockConnector::coinbase()))
}

/// Dynamic mock plus its controller.
pub fn dynamic(schema: Schema) -> (Arc<dyn BackfillConnector>, DynamicMockController) {
    DynamicMockConnector::new_with_controller("dynamic-mock", schema)
}

/// True when every `open_time` is strictly greater than the previous one.
pub fn strictly_increasing(series: &backfill::Series) -> bool {
    series
        .candles
        .windows(2)
        .all(|w| w[0].open_time < w[1].open_time)
}
