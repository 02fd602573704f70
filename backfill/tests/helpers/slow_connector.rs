use std::time::Duration;

use async_trait::async_trait;
use backfill::{
    BackfillConnector, BackfillError, CandleSource, Interval, RawRow, Schema, Window,
};

/// Answers each window after a delay that shrinks as the window start grows,
/// so later windows finish first when several are in flight.
///
/// Serves only daily candles.
pub struct SlowConnector {
    pub origin: chrono::DateTime<chrono::Utc>,
}

impl BackfillConnector for SlowConnector {
    fn name(&self) -> &'static str {
        "slow-mock"
    }

    fn as_candle_source(&self) -> Option<&dyn CandleSource> {
        Some(self as &dyn CandleSource)
    }
}

#[async_trait]
impl CandleSource for SlowConnector {
    fn schema(&self) -> Schema {
        Schema::FullStats
    }

    fn supported_intervals(&self) -> &'static [Interval] {
        &[Interval::D1]
    }

    async fn fetch_candles(
        &self,
        _symbol: &str,
        window: &Window,
    ) -> Result<Vec<RawRow>, BackfillError> {
        let offset = (window.start - self.origin).num_days().clamp(0, 100);
        let delay = u64::try_from(100 - offset).unwrap_or(0);
        tokio::time::sleep(Duration::from_millis(delay)).await;
        Ok(backfill_mock::rows_for(window, Schema::FullStats))
    }
}
