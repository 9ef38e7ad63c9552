//! Time source used to stamp turn starts and stops.

use chrono::{DateTime, Duration, Utc};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, instrument};

/// Supplies the current instant to the engine.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Creates a clock frozen at `start`.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Moves the clock forward by `ms` milliseconds.
    #[instrument(skip(self))]
    pub fn advance_ms(&self, ms: i64) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += Duration::milliseconds(ms);
        debug!(now = %*now, "Manual clock advanced");
    }

    /// Jumps the clock to `instant`.
    pub fn set(&self, instant: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = instant;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(DateTime::<Utc>::UNIX_EPOCH)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Whole milliseconds from `start` to `end`; zero if `end` precedes `start`.
pub fn elapsed_ms(start: DateTime<Utc>, end: DateTime<Utc>) -> u64 {
    u64::try_from((end - start).num_milliseconds()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advances() {
        let clock = ManualClock::default();
        let t0 = clock.now();
        clock.advance_ms(1_500);
        assert_eq!(elapsed_ms(t0, clock.now()), 1_500);
    }

    #[test]
    fn test_backwards_time_counts_as_zero() {
        let clock = ManualClock::default();
        let t0 = clock.now();
        clock.advance_ms(-200);
        assert_eq!(elapsed_ms(t0, clock.now()), 0);
    }

    #[test]
    fn test_set_jumps() {
        let clock = ManualClock::default();
        let target = DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(90);
        clock.set(target);
        assert_eq!(clock.now(), target);
    }
}
