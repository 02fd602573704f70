use backfill::{Interval, StepSize, WindowOutcome};

use crate::helpers::{BTC_USD, BTCUSDT, binance_mock, coinbase_mock, d, dt, dynamic, strictly_increasing};

#[tokio::test]
async fn windows_are_requested_in_order_and_tile_the_range() {
    let (conn, ctl) = dynamic(backfill::Schema::FullStats);
    let bf = backfill::Backfill::builder().with_connector(conn).build().unwrap();

    let report = bf
        .job(BTCUSDT)
        .period(d(2024, 1, 1), d(2024, 1, 11))
        .step(StepSize::Days(4))
        .run()
        .await
        .unwrap();

    let requested: Vec<_> = ctl.requests().await.into_iter().map(|(_, w)| w).collect();
    let bounds: Vec<_> = requested.iter().map(|w| (w.start, w.end)).collect();
    assert_eq!(
        bounds,
        vec![
            (dt(2024, 1, 1), dt(2024, 1, 5)),
            (dt(2024, 1, 5), dt(2024, 1, 9)),
            (dt(2024, 1, 9), dt(2024, 1, 11)),
        ]
    );
    let reported: Vec<_> = report.windows.iter().map(|o| *o.window()).collect();
    assert_eq!(reported, requested);
    assert!(report.warnings.is_empty());
}

#[tokio::test]
async fn window_boundaries_are_not_duplicated() {
    let bf = binance_mock().build().unwrap();
    let report = bf
        .job(BTCUSDT)
        .period(d(2023, 12, 20), d(2024, 2, 10))
        .step(StepSize::Days(7))
        .run()
        .await
        .unwrap();

    // 12 days of December, 31 of January, 9 of February.
    assert_eq!(report.series.len(), 52);
    assert!(strictly_increasing(&report.series));
    let (first, last) = report.series.span().unwrap();
    assert_eq!(first, dt(2023, 12, 20));
    assert_eq!(last, dt(2024, 2, 9));
}

#[tokio::test]
async fn yearly_steps_cover_the_default_binance_range() {
    let bf = binance_mock().build().unwrap();
    let report = bf
        .job(BTCUSDT)
        .period(d(2017, 8, 17), d(2025, 8, 17))
        .step(StepSize::Years(1))
        .run()
        .await
        .unwrap();

    assert_eq!(report.windows.len(), 8);
    let days = (d(2025, 8, 17) - d(2017, 8, 17)).num_days();
    assert_eq!(report.series.len(), usize::try_from(days).unwrap());
    assert!(strictly_increasing(&report.series));
}

#[tokio::test]
async fn newest_first_rows_are_sorted_by_default() {
    let bf = coinbase_mock().build().unwrap();
    let report = bf
        .job(BTC_USD)
        .period(d(2015, 1, 1), d(2015, 3, 1))
        .step(StepSize::Days(20))
        .run()
        .await
        .unwrap();

    assert_eq!(report.series.schema, backfill::Schema::Simple);
    assert_eq!(report.series.len(), 59);
    assert!(strictly_increasing(&report.series));
    assert!(report.series.candles.iter().all(|c| c.close_time.is_none()));
}

#[tokio::test]
async fn unsorted_output_keeps_window_order_and_row_order() {
    let bf = coinbase_mock().sort_by_open_time(false).build().unwrap();
    let report = bf
        .job(BTC_USD)
        .period(d(2015, 1, 1), d(2015, 1, 7))
        .step(StepSize::Days(3))
        .run()
        .await
        .unwrap();

    let times: Vec<_> = report.series.candles.iter().map(|c| c.open_time).collect();
    assert_eq!(
        times,
        vec![
            dt(2015, 1, 3),
            dt(2015, 1, 2),
            dt(2015, 1, 1),
            dt(2015, 1, 6),
            dt(2015, 1, 5),
            dt(2015, 1, 4),
        ]
    );
}

#[tokio::test]
async fn hourly_interval_is_forwarded_to_every_window() {
    let (conn, ctl) = dynamic(backfill::Schema::FullStats);
    let bf = backfill::Backfill::builder().with_connector(conn).build().unwrap();
    let report = bf
        .job(BTCUSDT)
        .interval(Interval::H1)
        .period(d(2024, 3, 1), d(2024, 3, 3))
        .step(StepSize::Days(1))
        .run()
        .await
        .unwrap();

    assert_eq!(report.series.len(), 48);
    assert!(
        ctl.requests()
            .await
            .iter()
            .all(|(s, w)| s == BTCUSDT && w.interval == Interval::H1)
    );
    assert!(report.windows.iter().all(|o| matches!(
        o,
        WindowOutcome::Fetched { raw: 24, rows: 24, .. }
    )));
}

#[tokio::test]
async fn overlapping_batches_can_be_deduplicated() {
    use backfill_mock::{MockBehavior, rows_for};

    let (conn, ctl) = dynamic(backfill::Schema::FullStats);
    // Second window also returns the last day of the first window.
    let overlap = backfill::Window::new(dt(2024, 1, 3), dt(2024, 1, 6), Interval::D1);
    ctl.set_window_behavior(
        dt(2024, 1, 4),
        MockBehavior::Return(rows_for(&overlap, backfill::Schema::FullStats)),
    )
    .await;

    let job = |dedup: bool| {
        let bf = backfill::Backfill::builder()
            .with_connector(conn.clone())
            .dedup_by_open_time(dedup)
            .build()
            .unwrap();
        async move {
            bf.job(BTCUSDT)
                .period(d(2024, 1, 1), d(2024, 1, 6))
                .step(StepSize::Days(3))
                .run()
                .await
                .unwrap()
        }
    };

    let kept = job(false).await;
    assert_eq!(kept.series.len(), 6);

    let deduped = job(true).await;
    assert_eq!(deduped.series.len(), 5);
    assert!(strictly_increasing(&deduped.series));
}
