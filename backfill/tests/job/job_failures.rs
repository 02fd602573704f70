use std::time::Duration;

use backfill::{
    Backfill, BackfillError, FetchFailurePolicy, Interval, MalformedRowPolicy, Schema, StepSize,
    WindowOutcome,
};
use backfill_mock::MockBehavior;
use serde_json::json;

use crate::helpers::{BTCUSDT, binance_mock, d, dt, dynamic, strictly_increasing};

fn http_500() -> BackfillError {
    BackfillError::fetch("dynamic-mock", Some(500), "internal error")
}

#[tokio::test]
async fn failed_middle_window_is_skipped_and_others_kept_in_order() {
    let (conn, ctl) = dynamic(Schema::FullStats);
    ctl.set_window_behavior(dt(2024, 1, 5), MockBehavior::Fail(http_500()))
        .await;
    let bf = Backfill::builder().with_connector(conn).build().unwrap();

    let report = bf
        .job(BTCUSDT)
        .period(d(2024, 1, 1), d(2024, 1, 13))
        .step(StepSize::Days(4))
        .run()
        .await
        .unwrap();

    assert_eq!(report.warnings, vec![http_500()]);
    let skipped: Vec<_> = report.skipped_windows().map(|w| w.start).collect();
    assert_eq!(skipped, vec![dt(2024, 1, 5)]);
    assert!(matches!(report.windows[0], WindowOutcome::Fetched { rows: 4, .. }));
    assert!(matches!(report.windows[2], WindowOutcome::Fetched { rows: 4, .. }));

    assert_eq!(report.series.len(), 8);
    assert!(strictly_increasing(&report.series));
    let times: Vec<_> = report.series.candles.iter().map(|c| c.open_time).collect();
    assert_eq!(times[3], dt(2024, 1, 4));
    assert_eq!(times[4], dt(2024, 1, 9));
}

#[tokio::test]
async fn abort_policy_returns_the_window_error() {
    let (conn, ctl) = dynamic(Schema::FullStats);
    ctl.set_window_behavior(dt(2024, 1, 5), MockBehavior::Fail(http_500()))
        .await;
    let bf = Backfill::builder()
        .with_connector(conn)
        .fetch_failure(FetchFailurePolicy::Abort)
        .build()
        .unwrap();

    let err = bf
        .job(BTCUSDT)
        .period(d(2024, 1, 1), d(2024, 1, 13))
        .step(StepSize::Days(4))
        .run()
        .await
        .unwrap_err();
    assert_eq!(err, http_500());
    // Nothing after the failed window is requested.
    assert_eq!(ctl.requests().await.len(), 2);
}

#[tokio::test]
async fn fatal_errors_abort_regardless_of_policy() {
    let (conn, ctl) = dynamic(Schema::FullStats);
    ctl.set_window_behavior(
        dt(2024, 1, 1),
        MockBehavior::Fail(BackfillError::config_missing("BINANCE_API_KEY")),
    )
    .await;
    let bf = Backfill::builder().with_connector(conn).build().unwrap();

    let err = bf
        .job(BTCUSDT)
        .period(d(2024, 1, 1), d(2024, 1, 3))
        .run()
        .await
        .unwrap_err();
    assert!(matches!(err, BackfillError::ConfigMissing { .. }));
}

#[tokio::test]
async fn every_window_failing_still_yields_an_empty_report() {
    let bf = binance_mock().build().unwrap();
    let report = bf
        .job("FAIL")
        .period(d(2024, 1, 1), d(2024, 1, 10))
        .step(StepSize::Days(3))
        .run()
        .await
        .unwrap();

    assert!(report.series.is_empty());
    assert_eq!(report.skipped_windows().count(), 3);
    assert_eq!(report.warnings.len(), 3);
    assert!(report.warnings.iter().all(|w| matches!(
        w,
        BackfillError::Fetch { status: Some(500), .. }
    )));
}

#[tokio::test]
async fn malformed_rows_are_skipped_with_a_warning() {
    let bf = binance_mock().build().unwrap();
    let report = bf
        .job("MALFORMED")
        .period(d(2024, 1, 1), d(2024, 1, 5))
        .step(StepSize::Days(2))
        .run()
        .await
        .unwrap();

    assert_eq!(report.series.len(), 4);
    assert_eq!(report.warnings.len(), 2);
    let labels: Vec<_> = report
        .warnings
        .iter()
        .map(|w| match w {
            BackfillError::MalformedRow { row: 0, window, .. } => window.clone(),
            other => panic!("expected malformed row warning, got {other:?}"),
        })
        .collect();
    assert_eq!(
        labels,
        vec![
            Some("[2024-01-01, 2024-01-03) 1d".to_string()),
            Some("[2024-01-03, 2024-01-05) 1d".to_string()),
        ]
    );
    assert!(report.windows.iter().all(|o| matches!(
        o,
        WindowOutcome::Fetched { raw: 3, rows: 2, .. }
    )));
}

#[tokio::test]
async fn malformed_rows_abort_when_configured() {
    let bf = binance_mock()
        .malformed_rows(MalformedRowPolicy::Abort)
        .build()
        .unwrap();
    let err = bf
        .job("MALFORMED")
        .period(d(2024, 1, 1), d(2024, 1, 5))
        .run()
        .await
        .unwrap_err();
    assert!(matches!(err, BackfillError::MalformedRow { row: 0, .. }));
    assert!(err.to_string().contains("in [2024-01-01, 2024-01-05) 1d"));
}

#[tokio::test]
async fn mixed_string_and_number_rows_normalize_alike() {
    let (conn, ctl) = dynamic(Schema::FullStats);
    let t = dt(2017, 7, 3).timestamp_millis();
    let rows = vec![vec![
        json!(t),
        json!(0.0163479),
        json!("0.80000000"),
        json!(0.015758),
        json!("0.01577100"),
        json!("148976.11427815"),
        json!(t + 86_400_000 - 1),
        json!("2434.19055334"),
        json!("308"),
        json!("1756.87402397"),
        json!(28.46694368),
        json!("0"),
    ]];
    ctl.set_window_behavior(dt(2017, 7, 3), MockBehavior::Return(rows))
        .await;
    let bf = Backfill::builder().with_connector(conn).build().unwrap();

    let report = bf
        .job(BTCUSDT)
        .period(d(2017, 7, 3), d(2017, 7, 4))
        .run()
        .await
        .unwrap();
    let c = &report.series.candles[0];
    assert_eq!(c.open_time, dt(2017, 7, 3));
    assert_eq!(c.number_of_trades, Some(308));
    assert!((c.high - 0.8).abs() < 1e-12);
    assert!((c.close - 0.015771).abs() < 1e-12);
}

#[tokio::test(start_paused = true)]
async fn stalled_window_times_out_and_is_skipped() {
    let (conn, ctl) = dynamic(Schema::FullStats);
    ctl.set_window_behavior(dt(2024, 1, 3), MockBehavior::Hang)
        .await;
    let bf = Backfill::builder()
        .with_connector(conn)
        .request_timeout(Duration::from_millis(50))
        .build()
        .unwrap();

    let report = bf
        .job(BTCUSDT)
        .period(d(2024, 1, 1), d(2024, 1, 5))
        .step(StepSize::Days(2))
        .run()
        .await
        .unwrap();

    assert_eq!(report.series.len(), 2);
    assert_eq!(report.warnings.len(), 1);
    assert!(matches!(
        &report.warnings[0],
        BackfillError::RequestTimeout { connector, .. } if connector == "dynamic-mock"
    ));
}

#[tokio::test(start_paused = true)]
async fn slow_symbol_times_out_under_abort() {
    let bf = binance_mock()
        .request_timeout(Duration::from_millis(10))
        .fetch_failure(FetchFailurePolicy::Abort)
        .build()
        .unwrap();
    let err = bf
        .job("TIMEOUT")
        .period(d(2024, 1, 1), d(2024, 1, 2))
        .run()
        .await
        .unwrap_err();
    assert!(matches!(err, BackfillError::RequestTimeout { .. }));
}

#[tokio::test]
async fn full_page_is_kept_and_reported_as_truncated() {
    let (conn, ctl) = dynamic(Schema::FullStats);
    ctl.set_page_limit(4);
    let bf = Backfill::builder().with_connector(conn).build().unwrap();

    let report = bf
        .job(BTCUSDT)
        .period(d(2024, 1, 1), d(2024, 1, 7))
        .step(StepSize::Days(4))
        .run()
        .await
        .unwrap();

    assert_eq!(report.series.len(), 6);
    assert_eq!(report.warnings.len(), 1);
    match &report.warnings[0] {
        BackfillError::Truncated { limit, window, .. } => {
            assert_eq!(*limit, 4);
            assert!(window.starts_with("[2024-01-01, 2024-01-05)"));
        }
        other => panic!("expected truncation warning, got {other:?}"),
    }
}

#[tokio::test]
async fn default_step_keeps_hourly_windows_under_the_page_cap() {
    let (conn, ctl) = dynamic(Schema::FullStats);
    ctl.set_page_limit(100);
    let bf = Backfill::builder().with_connector(conn).build().unwrap();

    let report = bf
        .job(BTCUSDT)
        .period(d(2024, 1, 1), d(2024, 1, 11))
        .interval(Interval::H1)
        .run()
        .await
        .unwrap();

    // 99 hourly buckets fit, so the job steps by 4 days.
    let requested: Vec<_> = ctl.requests().await.into_iter().map(|(_, w)| w).collect();
    assert_eq!(requested.len(), 3);
    assert_eq!((requested[0].start, requested[0].end), (dt(2024, 1, 1), dt(2024, 1, 5)));
    assert!(
        !report
            .warnings
            .iter()
            .any(|w| matches!(w, BackfillError::Truncated { .. })),
        "unexpected warnings: {:?}",
        report.warnings
    );
    assert_eq!(report.series.len(), 240);
}

#[tokio::test]
async fn default_step_drops_below_a_day_for_minute_candles() {
    let (conn, ctl) = dynamic(Schema::FullStats);
    ctl.set_page_limit(300);
    let bf = Backfill::builder().with_connector(conn).build().unwrap();

    let report = bf
        .job(BTCUSDT)
        .period(d(2024, 1, 1), d(2024, 1, 2))
        .interval(Interval::M1)
        .run()
        .await
        .unwrap();

    // 299 minutes fit, so windows are 4 hours wide.
    assert_eq!(ctl.requests().await.len(), 6);
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    assert_eq!(report.series.len(), 1440);
    assert!(strictly_increasing(&report.series));
}

#[tokio::test]
async fn explicit_step_overrides_the_page_cap() {
    let (conn, ctl) = dynamic(Schema::FullStats);
    ctl.set_page_limit(100);
    let bf = Backfill::builder().with_connector(conn).build().unwrap();

    let report = bf
        .job(BTCUSDT)
        .period(d(2024, 1, 1), d(2024, 1, 11))
        .interval(Interval::H1)
        .step(StepSize::Days(5))
        .run()
        .await
        .unwrap();

    assert_eq!(report.warnings.len(), 2);
    assert!(report
        .warnings
        .iter()
        .all(|w| matches!(w, BackfillError::Truncated { limit: 100, .. })));
}
