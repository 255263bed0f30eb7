//! The interval arithmetic behind a backoff ticker.

use crate::error::{BackoffError, Result};
use std::time::Duration;

/// The sequence of waits a ticker goes through.
///
/// Starts at `min` and multiplies by `factor` after every round, clamped at
/// `max` unless `max` is zero, which means unbounded. The multiply is done in
/// single precision and truncated back to whole nanoseconds, so long runs
/// accumulate rounding error. That is fine for backoff but the sequence is not
/// an exact geometric series.
///
/// The current interval never decreases and always stays within
/// `[min, max]` (or `>= min` when unbounded).
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffSchedule {
    min: Duration,
    max: Duration,
    factor: f32,
    current: Duration,
}

impl BackoffSchedule {
    /// Validates the parameters and creates a schedule positioned at `min`.
    pub fn new(min: Duration, max: Duration, factor: f32) -> Result<Self> {
        if min.is_zero() {
            return Err(BackoffError::NonPositiveMin(min));
        }
        if !max.is_zero() && max < min {
            return Err(BackoffError::MaxBelowMin { min, max });
        }
        // Written as a negation so NaN is rejected too.
        if !(factor > 1.0) || !factor.is_finite() {
            return Err(BackoffError::InvalidFactor(factor));
        }

        Ok(Self {
            min,
            max,
            factor,
            current: min,
        })
    }

    pub fn min_interval(&self) -> Duration {
        self.min
    }

    /// The ceiling, or `None` when the schedule is unbounded.
    pub fn max_interval(&self) -> Option<Duration> {
        (!self.max.is_zero()).then_some(self.max)
    }

    pub fn factor(&self) -> f32 {
        self.factor
    }

    /// The interval that will be waited before the next pulse.
    pub fn current(&self) -> Duration {
        self.current
    }

    /// Returns `true` once the ceiling has been reached. Always `false` when unbounded.
    pub fn is_saturated(&self) -> bool {
        self.max_interval().is_some_and(|max| self.current == max)
    }

    /// Moves to the next interval and returns it.
    pub fn advance(&mut self) -> Duration {
        let mut next = grow(self.current, self.factor);
        if let Some(max) = self.max_interval() {
            next = next.min(max);
        }
        self.current = next;
        next
    }
}

/// Yields the current interval, then advances. Never ends.
impl Iterator for BackoffSchedule {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        let interval = self.current;
        self.advance();
        Some(interval)
    }
}

fn grow(current: Duration, factor: f32) -> Duration {
    // `as u64` saturates, so an unbounded schedule tops out at u64::MAX nanoseconds.
    let nanos = (current.as_nanos() as f32 * factor) as u64;
    // f32 cannot represent every nanosecond count; never let rounding shrink the interval.
    Duration::from_nanos(nanos).max(current)
}
