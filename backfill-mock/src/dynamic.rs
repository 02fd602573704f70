use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use backfill_core::connector::{BackfillConnector, CandleSource};
use backfill_core::{BackfillError, Interval, RawRow, Schema, Window};

use crate::fixtures;

/// Instruction for how a method should behave for a given input.
#[derive(Clone, Debug)]
pub enum MockBehavior<T> {
    /// Return the provided value immediately.
    Return(T),
    /// Fail immediately with the provided error.
    Fail(BackfillError),
    /// Hang indefinitely (simulate a stalled request).
    Hang,
}

#[derive(Default)]
struct InternalState {
    window_rules: HashMap<DateTime<Utc>, MockBehavior<Vec<RawRow>>>,
    requests: Vec<(String, Window)>,
}

/// Controller handle used by tests to drive the dynamic mock from the outside.
pub struct DynamicMockController {
    state: Arc<Mutex<InternalState>>,
    page_limit: Arc<AtomicUsize>,
}

impl DynamicMockController {
    /// Set the behavior for the window starting at `start`.
    ///
    /// Windows without a rule are served from the deterministic fixtures.
    pub async fn set_window_behavior(
        &self,
        start: DateTime<Utc>,
        behavior: MockBehavior<Vec<RawRow>>,
    ) {
        let mut guard = self.state.lock().await;
        guard.window_rules.insert(start, behavior);
    }

    /// Advertise a page cap (`0` clears it).
    pub fn set_page_limit(&self, limit: usize) {
        self.page_limit.store(limit, Ordering::Relaxed);
    }

    /// Return a copy of the `(symbol, window)` request log in arrival order.
    pub async fn requests(&self) -> Vec<(String, Window)> {
        let guard = self.state.lock().await;
        guard.requests.clone()
    }

    /// Clear all configured behaviors and request logs.
    pub async fn clear_all_behaviors(&self) {
        let mut guard = self.state.lock().await;
        guard.window_rules.clear();
        guard.requests.clear();
        self.page_limit.store(0, Ordering::Relaxed);
    }
}

/// A connector that defers candle behavior to an external controller.
pub struct DynamicMockConnector {
    name: &'static str,
    schema: Schema,
    state: Arc<Mutex<InternalState>>,
    page_limit: Arc<AtomicUsize>,
}

impl DynamicMockConnector {
    /// Create a new dynamic mock connector and its controller.
    #[must_use]
    pub fn new_with_controller(
        name: &'static str,
        schema: Schema,
    ) -> (Arc<dyn BackfillConnector>, DynamicMockController) {
        let state = Arc::new(Mutex::new(InternalState::default()));
        let page_limit = Arc::new(AtomicUsize::new(0));
        let controller = DynamicMockController {
            state: Arc::clone(&state),
            page_limit: Arc::clone(&page_limit),
        };
        let me = Arc::new(Self {
            name,
            schema,
            state,
            page_limit,
        });
        (me as Arc<dyn BackfillConnector>, controller)
    }
}

impl BackfillConnector for DynamicMockConnector {
    fn name(&self) -> &'static str {
        self.name
    }

    fn vendor(&self) -> &'static str {
        "DynamicMock"
    }

    fn as_candle_source(&self) -> Option<&dyn CandleSource> {
        Some(self as &dyn CandleSource)
    }
}

#[async_trait]
impl CandleSource for DynamicMockConnector {
    fn schema(&self) -> Schema {
        self.schema
    }

    fn supported_intervals(&self) -> &'static [Interval] {
        Interval::ALL
    }

    fn page_limit(&self) -> Option<usize> {
        match self.page_limit.load(Ordering::Relaxed) {
            0 => None,
            n => Some(n),
        }
    }

    async fn fetch_candles(
        &self,
        symbol: &str,
        window: &Window,
    ) -> Result<Vec<RawRow>, BackfillError> {
        // Snapshot the behavior without holding the lock across await points
        let behavior = {
            let mut guard = self.state.lock().await;
            guard.requests.push((symbol.to_string(), *window));
            guard.window_rules.get(&window.start).cloned()
        };
        match behavior {
            Some(MockBehavior::Return(rows)) => Ok(rows),
            Some(MockBehavior::Fail(e)) => Err(e),
            Some(MockBehavior::Hang) => std::future::pending().await,
            None => Ok(fixtures::klines::rows_for(window, self.schema)),
        }
    }
}
