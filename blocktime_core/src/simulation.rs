//! The per-tick simulation step.
//!
//! Every tick the leader position is sampled and appended to history.
//! Every `interval_ticks` ticks the follower is refreshed from history,
//! `lag_ticks` behind the latest write. This is a replica applying log
//! entries at a fixed cadence after a fixed replication delay.

use blocktime_env::{PointerSource, Position, RenderFrame};
use tracing::debug;

use crate::clock::Clock;
use crate::config::SimConfig;
use crate::error::Result;
use crate::history::HistoryBuffer;
use crate::policy::DelayPolicy;

/// Result of one simulation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOutput {
    /// Tick this step ran on (first step is tick 1)
    pub tick: u64,

    /// Live input sample
    pub leader: Position,

    /// Lagged follower position
    pub follower: Position,

    /// Whether the follower was refreshed on this tick
    pub refreshed: bool,

    /// Whether the follower's last refresh read real history
    pub follower_synced: bool,
}

impl From<StepOutput> for RenderFrame {
    fn from(step: StepOutput) -> Self {
        RenderFrame {
            tick: step.tick,
            leader: step.leader,
            follower: step.follower,
            refreshed: step.refreshed,
            follower_synced: step.follower_synced,
        }
    }
}

/// Leader/follower state machine driven one tick at a time.
#[derive(Debug, Clone)]
pub struct Simulation {
    clock: Clock,
    history: HistoryBuffer,
    policy: DelayPolicy,

    /// Tick of the last follower refresh
    last_consumed_tick: u64,

    leader: Position,
    follower: Position,
    follower_synced: bool,

    /// Number of follower refreshes so far
    refreshes: u64,
}

impl Simulation {
    /// Builds a simulation from configuration.
    ///
    /// Fails before any tick runs if the configured delay exceeds history.
    pub fn new(config: &SimConfig) -> Result<Self> {
        let clock = config.clock()?;
        let history = HistoryBuffer::new(config.history_capacity)?;
        let policy = DelayPolicy::new(
            &clock,
            config.block_time,
            config.network_delay,
            history.capacity(),
        )?;
        Ok(Self::from_parts(clock, history, policy))
    }

    /// Assembles a simulation from already validated parts.
    ///
    /// The policy must have been validated against this history's capacity.
    pub fn from_parts(clock: Clock, history: HistoryBuffer, policy: DelayPolicy) -> Self {
        Self {
            clock,
            history,
            policy,
            last_consumed_tick: 0,
            leader: Position::default(),
            follower: Position::default(),
            follower_synced: false,
            refreshes: 0,
        }
    }

    /// Advances one tick with the given leader sample.
    ///
    /// # Errors
    /// * `OffsetOutOfRange` - the policy's lag does not fit the history,
    ///   which `new` rules out
    pub fn step(&mut self, leader: Position) -> Result<StepOutput> {
        let tick = self.clock.advance();

        self.leader = leader;
        self.history.write(leader);

        let refreshed = self.policy.is_due(tick, self.last_consumed_tick);
        if refreshed {
            self.last_consumed_tick = tick;
            let lag = self.policy.lag_offset();
            self.follower = self.history.read(lag)?;
            self.follower_synced = self.history.get(lag).is_some();
            self.refreshes += 1;
            debug!(tick, follower = %self.follower, synced = self.follower_synced, "follower refreshed");
        }

        Ok(StepOutput {
            tick,
            leader: self.leader,
            follower: self.follower,
            refreshed,
            follower_synced: self.follower_synced,
        })
    }

    /// Samples `source` and advances one tick.
    pub fn step_from<S: PointerSource + ?Sized>(&mut self, source: &mut S) -> Result<StepOutput> {
        let leader = source.sample()?;
        self.step(leader)
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn policy(&self) -> &DelayPolicy {
        &self.policy
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    pub fn current_tick(&self) -> u64 {
        self.clock.current()
    }

    pub fn last_consumed_tick(&self) -> u64 {
        self.last_consumed_tick
    }

    pub fn leader(&self) -> Position {
        self.leader
    }

    pub fn follower(&self) -> Position {
        self.follower
    }

    pub fn refreshes(&self) -> u64 {
        self.refreshes
    }
}
