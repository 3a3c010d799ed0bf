//! Startup configuration and duration parsing.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::error::{BlocktimeError, Result};
use crate::policy::DelayPolicy;

/// Engine tick rate.
pub const DEFAULT_TICKS_PER_SECOND: u32 = 100;

/// 30 seconds of history at the default tick rate.
pub const DEFAULT_HISTORY_CAPACITY: usize = 3000;

/// Hard ceiling on history slots (10 minutes at the default tick rate).
pub const MAX_HISTORY_CAPACITY: usize = 60_000;

pub const DEFAULT_NETWORK_DELAY: Duration = Duration::from_millis(100);
pub const DEFAULT_BLOCK_TIME: Duration = Duration::from_millis(10);

/// Configuration for a simulation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Tick rate in Hz
    pub ticks_per_second: u32,

    /// History slots (bounds the largest supported network delay)
    pub history_capacity: usize,

    /// How far into the past the follower reads
    pub network_delay: Duration,

    /// Minimum interval between follower refreshes
    pub block_time: Duration,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            ticks_per_second: DEFAULT_TICKS_PER_SECOND,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            network_delay: DEFAULT_NETWORK_DELAY,
            block_time: DEFAULT_BLOCK_TIME,
        }
    }
}

impl SimConfig {
    /// Builds the clock for this configuration.
    pub fn clock(&self) -> Result<Clock> {
        Clock::new(self.ticks_per_second)
    }

    /// Derives and validates the delay policy.
    pub fn delay_policy(&self) -> Result<DelayPolicy> {
        check_capacity(self.history_capacity)?;
        let clock = self.clock()?;
        DelayPolicy::new(&clock, self.block_time, self.network_delay, self.history_capacity)
    }

    /// Largest network delay this configuration can represent.
    ///
    /// Zero when the tick rate is invalid.
    pub fn max_network_delay(&self) -> Duration {
        let max_lag = self.history_capacity.saturating_sub(1) as u64;
        self.clock()
            .map(|clock| clock.longest_duration_within(max_lag))
            .unwrap_or_default()
    }
}

/// Rejects history sizes outside `1..=MAX_HISTORY_CAPACITY`.
pub fn check_capacity(capacity: usize) -> Result<()> {
    if capacity == 0 {
        return Err(BlocktimeError::config("history capacity must be at least 1"));
    }
    if capacity > MAX_HISTORY_CAPACITY {
        return Err(BlocktimeError::config(format!(
            "history capacity {capacity} exceeds the maximum of {MAX_HISTORY_CAPACITY} slots"
        )));
    }
    Ok(())
}

/// Parses a duration such as `100ms`, `1.5s` or `1m30s`.
///
/// Units: `ns`, `us` (or `µs`), `ms`, `s`, `m`, `h`. A bare `0` is accepted;
/// any other number needs a unit. Negative durations are rejected.
pub fn parse_duration(input: &str) -> Result<Duration> {
    let text = input.trim();
    if text.is_empty() {
        return Err(BlocktimeError::config("empty duration"));
    }
    if text.starts_with('-') {
        return Err(BlocktimeError::config(format!("negative duration: {input}")));
    }
    let text = text.strip_prefix('+').unwrap_or(text);
    if text.is_empty() {
        return Err(BlocktimeError::config(format!("missing number in duration: {input}")));
    }
    if text == "0" {
        return Ok(Duration::ZERO);
    }

    let mut rest = text;
    let mut total_nanos: u128 = 0;

    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if number_len == 0 {
            return Err(BlocktimeError::config(format!("expected a number in duration: {input}")));
        }
        let (number, tail) = rest.split_at(number_len);

        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);

        let scale: u128 = match unit {
            "ns" => 1,
            "us" | "µs" | "μs" => 1_000,
            "ms" => 1_000_000,
            "s" => 1_000_000_000,
            "m" => 60 * 1_000_000_000,
            "h" => 3600 * 1_000_000_000,
            "" => {
                return Err(BlocktimeError::config(format!("missing unit in duration: {input}")))
            }
            other => {
                return Err(BlocktimeError::config(format!(
                    "unknown unit '{other}' in duration: {input}"
                )))
            }
        };

        total_nanos = total_nanos
            .checked_add(scaled_nanos(number, scale, input)?)
            .ok_or_else(|| BlocktimeError::config(format!("duration overflows: {input}")))?;
        rest = tail;
    }

    u64::try_from(total_nanos)
        .map(Duration::from_nanos)
        .map_err(|_| BlocktimeError::config(format!("duration overflows: {input}")))
}

/// `number * scale` for a decimal `number`, fraction truncated to whole nanoseconds.
fn scaled_nanos(number: &str, scale: u128, input: &str) -> Result<u128> {
    let invalid = || BlocktimeError::config(format!("invalid number in duration: {input}"));

    let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
    if (whole.is_empty() && fraction.is_empty()) || fraction.contains('.') {
        return Err(invalid());
    }

    let whole: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid())?
    };
    let mut nanos = whole.checked_mul(scale).ok_or_else(invalid)?;

    let mut numerator: u128 = 0;
    let mut denominator: u128 = 1;
    for digit in fraction.chars().filter_map(|c| c.to_digit(10)) {
        // Digits past 1e-18 cannot affect a nanosecond result
        if denominator >= 1_000_000_000_000_000_000 {
            break;
        }
        numerator = numerator * 10 + u128::from(digit);
        denominator *= 10;
    }
    nanos += numerator * scale / denominator;

    Ok(nanos)
}
