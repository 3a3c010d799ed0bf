//! Delay policy: block time and network delay expressed in ticks.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::clock::Clock;
use crate::error::{BlocktimeError, Result};

/// Validated tick counts derived from the two configured durations.
///
/// Immutable once built; `lag_ticks < capacity` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayPolicy {
    /// Minimum ticks between follower refreshes (block time), at least 1
    pub interval_ticks: u64,

    /// How many ticks back the follower reads (network delay)
    pub lag_ticks: u64,
}

impl DelayPolicy {
    /// Converts `block_time` and `network_delay` at the clock's rate and
    /// checks the lag against a history of `capacity` slots.
    ///
    /// # Errors
    /// * `LagExceedsCapacity` - the delay would read older data than the
    ///   history retains
    pub fn new(
        clock: &Clock,
        block_time: Duration,
        network_delay: Duration,
        capacity: usize,
    ) -> Result<Self> {
        let interval_ticks = clock.ticks_for(block_time).max(1);
        let lag_ticks = clock.ticks_for(network_delay);

        if lag_ticks >= capacity as u64 {
            return Err(BlocktimeError::LagExceedsCapacity { lag_ticks, capacity });
        }

        info!(
            "Delay policy: block time {:?} -> {} ticks, network delay {:?} -> {} ticks",
            block_time, interval_ticks, network_delay, lag_ticks
        );

        Ok(Self {
            interval_ticks,
            lag_ticks,
        })
    }

    /// Lag as a history offset (fits, since it is below capacity).
    pub fn lag_offset(&self) -> usize {
        self.lag_ticks as usize
    }

    /// Whether the follower may refresh at `current_tick`.
    pub fn is_due(&self, current_tick: u64, last_consumed_tick: u64) -> bool {
        current_tick.saturating_sub(last_consumed_tick) >= self.interval_ticks
    }
}
