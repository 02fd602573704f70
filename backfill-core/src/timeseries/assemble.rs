use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::{AssembleOptions, Candle, Schema, Series, Window};

/// Accumulates normalized per-window batches into one [`Series`].
///
/// Batches may be pushed in any order; [`SeriesAssembler::finish`] orders
/// them by window start before concatenating, then applies the configured
/// sort and deduplication.
#[derive(Debug, Clone)]
pub struct SeriesAssembler {
    schema: Schema,
    options: AssembleOptions,
    batches: Vec<(Window, Vec<Candle>)>,
}

impl SeriesAssembler {
    /// New empty assembler for `schema`.
    #[must_use]
    pub const fn new(schema: Schema, options: AssembleOptions) -> Self {
        Self {
            schema,
            options,
            batches: Vec::new(),
        }
    }

    /// Add the candles normalized for `window`.
    pub fn push(&mut self, window: Window, batch: Vec<Candle>) {
        self.batches.push((window, batch));
    }

    /// Number of batches pushed so far.
    #[must_use]
    pub fn batches(&self) -> usize {
        self.batches.len()
    }

    /// Build the series.
    ///
    /// - Batches are concatenated in window-start order (stable for equal starts).
    /// - With `sort_by_open_time`, candles are stably sorted by `open_time`.
    /// - With `dedup_by_open_time`, only the first candle seen for each
    ///   `open_time` is kept; order is otherwise untouched.
    #[must_use]
    pub fn finish(mut self) -> Series {
        self.batches.sort_by_key(|(w, _)| w.start);
        let mut candles: Vec<Candle> = self.batches.into_iter().flat_map(|(_, b)| b).collect();

        if self.options.sort_by_open_time {
            candles.sort_by_key(|c| c.open_time);
        }
        if self.options.dedup_by_open_time {
            let mut seen: HashSet<DateTime<Utc>> = HashSet::with_capacity(candles.len());
            candles.retain(|c| seen.insert(c.open_time));
        }

        Series {
            schema: self.schema,
            candles,
        }
    }
}

/// Assemble `(window, batch)` pairs into a series in one call.
#[must_use]
pub fn assemble<I>(batches: I, schema: Schema, options: AssembleOptions) -> Series
where
    I: IntoIterator<Item = (Window, Vec<Candle>)>,
{
    let mut asm = SeriesAssembler::new(schema, options);
    for (w, b) in batches {
        asm.push(w, b);
    }
    asm.finish()
}
