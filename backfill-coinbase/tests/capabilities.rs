use backfill_coinbase::{CoinbaseConnector, PAGE_LIMIT};
use backfill_core::{Interval, Schema, Window, connector::BackfillConnector};
use chrono::{TimeDelta, TimeZone, Utc};

#[test]
fn advertises_candles_only() {
    let c = CoinbaseConnector::new().unwrap();
    assert_eq!(c.name(), "backfill-coinbase");
    assert_eq!(c.vendor(), "Coinbase");
    assert!(c.as_ticker_provider().is_none());

    let source = c.as_candle_source().unwrap();
    assert_eq!(source.schema(), Schema::Simple);
    assert_eq!(source.page_limit(), Some(PAGE_LIMIT));
    assert!(source.supported_intervals().contains(&Interval::H6));
    assert!(!source.supported_intervals().contains(&Interval::H4));
}

#[test]
fn request_end_is_last_bucket_in_window() {
    let start = Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap();
    let end = start + TimeDelta::days(99);
    let req = CoinbaseConnector::request_for("BTC-USD", &Window::new(start, end, Interval::D1)).unwrap();
    assert_eq!(req.start, start);
    assert_eq!(req.end, start + TimeDelta::days(98));
    assert_eq!(req.granularity, 86_400);
    assert_eq!(req.product, "BTC-USD");
}

#[test]
fn consecutive_requests_do_not_overlap() {
    let s0 = Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap();
    let s1 = s0 + TimeDelta::hours(6);
    let s2 = s1 + TimeDelta::hours(6);
    let a = CoinbaseConnector::request_for("BTC-USD", &Window::new(s0, s1, Interval::H1)).unwrap();
    let b = CoinbaseConnector::request_for("BTC-USD", &Window::new(s1, s2, Interval::H1)).unwrap();
    assert!(a.end < b.start);
    assert_eq!(b.start - a.end, TimeDelta::hours(1));
}

#[test]
fn monthly_interval_is_unsupported() {
    let s0 = Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap();
    assert!(CoinbaseConnector::request_for("BTC-USD", &Window::new(s0, s0 + TimeDelta::days(90), Interval::Mo1)).is_err());
}
