use std::sync::Arc;

use backfill::{Backfill, StepSize};
use proptest::prelude::*;

use crate::helpers::{BTCUSDT, SlowConnector, binance_mock, d, dt, strictly_increasing};

fn slow(max_in_flight: usize) -> Backfill {
    Backfill::builder()
        .with_connector(Arc::new(SlowConnector {
            origin: dt(2024, 1, 1),
        }))
        .max_in_flight(max_in_flight)
        .build()
        .unwrap()
}

#[tokio::test(start_paused = true)]
async fn concurrent_fetches_preserve_window_order() {
    let run = |n| async move {
        let bf = slow(n);
        bf.job(BTCUSDT)
            .period(d(2024, 1, 1), d(2024, 3, 1))
            .step(StepSize::Days(5))
            .run()
            .await
            .unwrap()
    };

    let sequential = run(1).await;
    let concurrent = run(4).await;

    assert_eq!(concurrent.series, sequential.series);
    assert_eq!(concurrent.windows, sequential.windows);
    assert!(strictly_increasing(&concurrent.series));
    let starts: Vec<_> = concurrent.windows.iter().map(|o| o.window().start).collect();
    let mut sorted = starts.clone();
    sorted.sort();
    assert_eq!(starts, sorted);
}

#[tokio::test(start_paused = true)]
async fn concurrent_unsorted_output_is_still_in_window_order() {
    let bf = Backfill::builder()
        .with_connector(Arc::new(SlowConnector {
            origin: dt(2024, 1, 1),
        }))
        .max_in_flight(8)
        .sort_by_open_time(false)
        .build()
        .unwrap();
    let report = bf
        .job(BTCUSDT)
        .period(d(2024, 1, 1), d(2024, 2, 1))
        .step(StepSize::Days(3))
        .run()
        .await
        .unwrap();
    assert_eq!(report.series.len(), 31);
    assert!(strictly_increasing(&report.series));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn any_step_yields_one_candle_per_day(
        offset in 0i64..400,
        len in 0i64..200,
        step in 1u32..60,
        in_flight in 1usize..6,
    ) {
        let start = d(2020, 1, 1) + chrono::Days::new(u64::try_from(offset).unwrap());
        let end = start + chrono::Days::new(u64::try_from(len).unwrap());
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let bf = binance_mock().max_in_flight(in_flight).build().unwrap();
        let report = rt.block_on(
            bf.job(BTCUSDT)
                .period(start, end)
                .step(StepSize::Days(step))
                .run(),
        ).unwrap();
        prop_assert_eq!(report.series.len(), usize::try_from(len).unwrap());
        prop_assert!(strictly_increasing(&report.series));
        if let Some((first, last)) = report.series.span() {
            prop_assert_eq!(first.date_naive(), start);
            prop_assert_eq!(last.date_naive() + chrono::Days::new(1), end);
        }
    }
}
