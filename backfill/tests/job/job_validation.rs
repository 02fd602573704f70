use std::sync::Arc;
use std::time::Duration;

use backfill::{Backfill, BackfillError, Interval, StepSize};

use crate::helpers::{BTCUSDT, SlowConnector, binance_mock, d, dt};

#[test]
fn build_requires_a_connector() {
    let err = Backfill::builder().build().err().unwrap();
    assert!(matches!(err, BackfillError::InvalidArg(_)));
}

#[test]
fn build_rejects_zero_in_flight_and_zero_timeout() {
    let err = binance_mock().max_in_flight(0).build().err().unwrap();
    assert!(matches!(err, BackfillError::InvalidArg(_)));

    let err = binance_mock()
        .request_timeout(Duration::ZERO)
        .build()
        .err()
        .unwrap();
    assert!(matches!(err, BackfillError::InvalidArg(_)));
}

#[test]
fn builder_defaults_match_config_defaults() {
    let bf = binance_mock().build().unwrap();
    assert_eq!(bf.config(), &backfill::BackfillConfig::default());
    assert_eq!(bf.connector_name(), "backfill-mock");
}

#[tokio::test]
async fn empty_symbol_is_rejected() {
    let bf = binance_mock().build().unwrap();
    let err = bf
        .job("  ")
        .period(d(2024, 1, 1), d(2024, 1, 2))
        .run()
        .await
        .unwrap_err();
    assert!(matches!(err, BackfillError::InvalidArg(_)));
}

#[tokio::test]
async fn missing_period_is_rejected() {
    let bf = binance_mock().build().unwrap();
    let err = bf.job(BTCUSDT).run().await.unwrap_err();
    assert!(matches!(err, BackfillError::InvalidArg(_)));
}

#[tokio::test]
async fn zero_step_is_rejected() {
    let bf = binance_mock().build().unwrap();
    let err = bf
        .job(BTCUSDT)
        .period(d(2024, 1, 1), d(2024, 1, 2))
        .step(StepSize::Days(0))
        .run()
        .await
        .unwrap_err();
    assert!(matches!(err, BackfillError::InvalidArg(_)));
}

#[tokio::test]
async fn unsupported_interval_is_rejected_before_any_request() {
    let bf = Backfill::builder()
        .with_connector(Arc::new(SlowConnector {
            origin: dt(2024, 1, 1),
        }))
        .build()
        .unwrap();
    let err = bf
        .job(BTCUSDT)
        .interval(Interval::H4)
        .period(d(2024, 1, 1), d(2024, 1, 2))
        .run()
        .await
        .unwrap_err();
    assert_eq!(err, BackfillError::unsupported("candles/4h"));
}

#[tokio::test]
async fn empty_range_yields_no_windows_and_an_empty_series() {
    let bf = binance_mock().build().unwrap();
    for (start, end) in [
        (d(2024, 1, 1), d(2024, 1, 1)),
        (d(2024, 2, 1), d(2024, 1, 1)),
    ] {
        let report = bf.job(BTCUSDT).period(start, end).run().await.unwrap();
        assert!(report.windows.is_empty());
        assert!(report.series.is_empty());
        assert!(report.warnings.is_empty());
        assert_eq!(report.series.schema, backfill::Schema::FullStats);
    }
}

#[tokio::test]
async fn ticker_is_served_when_the_connector_supports_it() {
    let bf = binance_mock().build().unwrap();
    let t = bf.ticker(BTCUSDT).await.unwrap();
    assert_eq!(t.symbol, BTCUSDT);
    assert!(t.price > 0.0);
}

#[tokio::test]
async fn ticker_is_unsupported_without_a_provider() {
    let bf = Backfill::builder()
        .with_connector(Arc::new(SlowConnector {
            origin: dt(2024, 1, 1),
        }))
        .build()
        .unwrap();
    let err = bf.ticker(BTCUSDT).await.unwrap_err();
    assert_eq!(err, BackfillError::unsupported("ticker"));
}
