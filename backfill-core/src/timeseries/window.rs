use chrono::{DateTime, Days, Months, NaiveDate, NaiveTime, TimeDelta, Utc};

use crate::{BackfillError, Interval, StepSize, Window};

/// Split `[start, end)` into contiguous half-open windows of `step`.
///
/// Window `k` is `[s_k, min(s_k + step, end))` with `s_0 = start` and
/// `s_{k+1}` equal to the end of window `k`. The union of all windows is
/// exactly `[start, end)`; the last window is clipped to `end`. A range with
/// `start >= end` yields no windows.
///
/// Year steps advance by calendar years from `start`; a Feb 29 anchor lands
/// on Feb 28 in non-leap years. Hour steps count from `start`'s midnight, so
/// the last window of the day may be shorter than the step.
///
/// ```
/// use backfill_core::{plan_windows, Interval, StepSize};
/// use chrono::NaiveDate;
///
/// let d = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
/// let plan = plan_windows(d(2020, 1, 1), d(2020, 1, 10), StepSize::Days(4), Interval::D1).unwrap();
/// let ends: Vec<_> = plan.map(|w| w.end.date_naive()).collect();
/// assert_eq!(ends, vec![d(2020, 1, 5), d(2020, 1, 9), d(2020, 1, 10)]);
/// ```
///
/// # Errors
/// Returns `BackfillError::InvalidArg` for a zero step.
pub fn plan_windows(
    start: NaiveDate,
    end: NaiveDate,
    step: StepSize,
    interval: Interval,
) -> Result<WindowPlan, BackfillError> {
    if step.is_zero() {
        return Err(BackfillError::InvalidArg(
            "window step must be greater than zero".into(),
        ));
    }
    Ok(WindowPlan {
        start,
        end,
        step,
        interval,
        index: 0,
    })
}

/// Lazy, finite sequence of request windows produced by [`plan_windows`].
///
/// The plan is a plain value: cloning it and iterating again replays the same
/// windows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowPlan {
    start: NaiveDate,
    end: NaiveDate,
    step: StepSize,
    interval: Interval,
    index: u32,
}

impl WindowPlan {
    /// Inclusive range start.
    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Exclusive range end.
    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Step between window starts.
    #[must_use]
    pub const fn step(&self) -> StepSize {
        self.step
    }

    // Boundary k measured from the anchor; `None` past chrono's date range.
    fn boundary(&self, k: u32) -> Option<DateTime<Utc>> {
        match self.step {
            StepSize::Days(n) => self
                .start
                .checked_add_days(Days::new(u64::from(n) * u64::from(k)))
                .map(midnight),
            StepSize::Years(n) => n
                .checked_mul(12)
                .and_then(|m| m.checked_mul(k))
                .and_then(|m| self.start.checked_add_months(Months::new(m)))
                .map(midnight),
            StepSize::Hours(n) => TimeDelta::try_hours(i64::from(n) * i64::from(k))
                .and_then(|d| midnight(self.start).checked_add_signed(d)),
        }
    }
}

impl Iterator for WindowPlan {
    type Item = Window;

    fn next(&mut self) -> Option<Window> {
        let end = midnight(self.end);
        let lo = self.boundary(self.index)?;
        if lo >= end {
            return None;
        }
        let hi = self
            .index
            .checked_add(1)
            .and_then(|k| self.boundary(k))
            .map_or(end, |b| b.min(end));
        self.index = self.index.saturating_add(1);
        Some(Window::new(lo, hi, self.interval))
    }
}

fn midnight(d: NaiveDate) -> DateTime<Utc> {
    d.and_time(NaiveTime::MIN).and_utc()
}
