//! Discrete fixed-rate tick clock.
//!
//! The clock is pure arithmetic: it counts ticks and converts real-world
//! durations into tick counts. Pacing against the wall clock is the
//! driver's job.

use crate::error::{BlocktimeError, Result};
use std::time::Duration;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Monotonic tick counter running at `ticks_per_second`.
#[derive(Debug, Clone)]
pub struct Clock {
    ticks_per_second: u32,
    current: u64,
}

impl Clock {
    /// Creates a clock at tick 0.
    pub fn new(ticks_per_second: u32) -> Result<Self> {
        if ticks_per_second == 0 {
            return Err(BlocktimeError::config("tick rate must be at least 1 tick per second"));
        }
        Ok(Self {
            ticks_per_second,
            current: 0,
        })
    }

    /// Advances by exactly one tick and returns the new tick number.
    pub fn advance(&mut self) -> u64 {
        self.current += 1;
        self.current
    }

    /// Current tick (0 before the first advance).
    pub fn current(&self) -> u64 {
        self.current
    }

    pub fn ticks_per_second(&self) -> u32 {
        self.ticks_per_second
    }

    /// Real-time length of one tick.
    pub fn tick_period(&self) -> Duration {
        Duration::from_secs(1) / self.ticks_per_second
    }

    /// Converts a duration to ticks: `round(duration / tick_period)`.
    ///
    /// Half a tick rounds up. Saturates at `u64::MAX`.
    pub fn ticks_for(&self, duration: Duration) -> u64 {
        let scaled = duration.as_nanos() * u128::from(self.ticks_per_second);
        let ticks = (scaled + NANOS_PER_SEC / 2) / NANOS_PER_SEC;
        u64::try_from(ticks).unwrap_or(u64::MAX)
    }

    /// Longest duration that [`ticks_for`](Self::ticks_for) maps to at most `ticks`.
    pub fn longest_duration_within(&self, ticks: u64) -> Duration {
        // ticks_for(d) <= ticks  <=>  d * tps < (ticks + 1/2) * 1s
        let tps = u128::from(self.ticks_per_second);
        let bound = (2 * u128::from(ticks) + 1) * (NANOS_PER_SEC / 2);
        let nanos = (bound + tps - 1) / tps - 1;
        Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
    }

    /// Elapsed simulated time at the current tick.
    pub fn elapsed(&self) -> Duration {
        self.tick_period() * u32::try_from(self.current).unwrap_or(u32::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_clock_rejects_zero_rate() {
        assert!(Clock::new(0).is_err());
    }

    #[test]
    fn test_advance_increments_by_one() {
        let mut clock = Clock::new(100).unwrap();
        assert_eq!(clock.current(), 0);
        assert_eq!(clock.advance(), 1);
        assert_eq!(clock.advance(), 2);
        assert_eq!(clock.current(), 2);
    }

    #[test]
    fn test_tick_period() {
        let clock = Clock::new(100).unwrap();
        assert_eq!(clock.tick_period(), Duration::from_millis(10));

        let clock = Clock::new(30).unwrap();
        assert_relative_eq!(clock.tick_period().as_secs_f64(), 1.0 / 30.0, epsilon = 1e-9);
    }

    #[test]
    fn test_ticks_for_rounds_to_nearest() {
        let clock = Clock::new(100).unwrap();
        assert_eq!(clock.ticks_for(Duration::from_millis(100)), 10);
        assert_eq!(clock.ticks_for(Duration::from_millis(10)), 1);
        assert_eq!(clock.ticks_for(Duration::from_millis(14)), 1);
        assert_eq!(clock.ticks_for(Duration::from_millis(15)), 2);
        assert_eq!(clock.ticks_for(Duration::from_millis(4)), 0);
        assert_eq!(clock.ticks_for(Duration::ZERO), 0);
    }

    #[test]
    fn test_ticks_for_non_integral_rate() {
        // 30 Hz: 100ms = 3 ticks, 50ms = 1.5 ticks -> 2
        let clock = Clock::new(30).unwrap();
        assert_eq!(clock.ticks_for(Duration::from_millis(100)), 3);
        assert_eq!(clock.ticks_for(Duration::from_millis(50)), 2);
    }

    #[test]
    fn test_longest_duration_within_inverts_rounding() {
        for tps in [1, 3, 30, 100, 1000] {
            let clock = Clock::new(tps).unwrap();
            for ticks in [0, 1, 9, 2999] {
                let longest = clock.longest_duration_within(ticks);
                assert_eq!(clock.ticks_for(longest), ticks, "tps {tps}, ticks {ticks}");
                assert_eq!(clock.ticks_for(longest + Duration::from_nanos(1)), ticks + 1);
            }
        }
    }

    #[test]
    fn test_elapsed() {
        let mut clock = Clock::new(100).unwrap();
        for _ in 0..250 {
            clock.advance();
        }
        assert_eq!(clock.elapsed(), Duration::from_millis(2500));
    }
}
