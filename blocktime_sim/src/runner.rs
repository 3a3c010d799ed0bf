//! Tick driver: pulls input, steps the simulation, pushes frames.

use blocktime_core::{Result, Simulation};
use blocktime_env::{FrameSink, PointerSource, Position};
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::debug;

/// How the driver paces ticks against the wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    /// One tick per tick period (interactive)
    RealTime,

    /// As fast as possible (headless)
    Unpaced,
}

/// Results from a driver run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    /// Total ticks executed
    pub total_ticks: u64,

    /// Follower refreshes
    pub refreshes: u64,

    /// First tick whose follower read hit real history
    pub synced_at_tick: Option<u64>,

    /// Mean leader/follower distance over all ticks (cells)
    pub mean_separation: f64,

    /// Largest leader/follower distance seen (cells)
    pub max_separation: f64,

    /// Simulated time covered by the run
    pub simulated_time: Duration,

    pub final_leader: Position,
    pub final_follower: Position,

    /// Whether the input source asked to stop
    pub quit_requested: bool,
}

/// Drives a [`Simulation`] with one input source and one sink.
pub struct Driver<'a, P: ?Sized, R: ?Sized> {
    sim: &'a mut Simulation,
    source: &'a mut P,
    sink: &'a mut R,
    pacing: Pacing,
    max_ticks: Option<u64>,
}

impl<'a, P, R> Driver<'a, P, R>
where
    P: PointerSource + ?Sized,
    R: FrameSink + ?Sized,
{
    /// Creates an unpaced, unbounded driver.
    pub fn new(sim: &'a mut Simulation, source: &'a mut P, sink: &'a mut R) -> Self {
        Self {
            sim,
            source,
            sink,
            pacing: Pacing::Unpaced,
            max_ticks: None,
        }
    }

    /// Sets the pacing mode.
    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Stops after this many ticks.
    pub fn with_max_ticks(mut self, ticks: u64) -> Self {
        self.max_ticks = Some(ticks);
        self
    }

    /// Runs until the tick limit or until the source requests quit.
    ///
    /// Any error from a step is returned immediately; the caller treats it
    /// as fatal.
    pub fn run(self) -> Result<RunSummary> {
        let period = self.sim.clock().tick_period();
        let policy = *self.sim.policy();
        debug!(
            "Driving simulation: {} Hz, refresh every {} ticks, lag {} ticks",
            self.sim.clock().ticks_per_second(),
            policy.interval_ticks,
            policy.lag_ticks
        );

        let mut summary = RunSummary::default();
        let mut separation_sum = 0.0;
        let refreshes_before = self.sim.refreshes();

        loop {
            if self.max_ticks.is_some_and(|max| summary.total_ticks >= max) {
                break;
            }
            if self.source.quit_requested() {
                summary.quit_requested = true;
                break;
            }

            let started = Instant::now();
            let out = self.sim.step_from(&mut *self.source)?;
            self.sink.render(&out.into())?;

            summary.total_ticks += 1;
            if out.follower_synced && summary.synced_at_tick.is_none() {
                summary.synced_at_tick = Some(out.tick);
                debug!("Follower synced with history at tick {}", out.tick);
            }

            let separation = out.leader.distance(&out.follower);
            separation_sum += separation;
            summary.max_separation = summary.max_separation.max(separation);

            if self.pacing == Pacing::RealTime {
                pace(started, period);
            }
        }

        summary.refreshes = self.sim.refreshes() - refreshes_before;
        summary.final_leader = self.sim.leader();
        summary.final_follower = self.sim.follower();
        summary.simulated_time = self.sim.clock().elapsed();
        if summary.total_ticks > 0 {
            summary.mean_separation = separation_sum / summary.total_ticks as f64;
        }

        debug!(
            "Run finished: {} ticks, {} refreshes, mean separation {:.2}",
            summary.total_ticks, summary.refreshes, summary.mean_separation
        );
        Ok(summary)
    }
}

/// Sleeps out the remainder of the tick period.
fn pace(started: Instant, period: Duration) {
    if let Some(remaining) = period.checked_sub(started.elapsed()) {
        std::thread::sleep(remaining);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exporter::{ExportHeader, FrameExport, FrameWriter};
    use crate::pointer::{PathKind, ScriptedPointer};
    use blocktime_core::SimConfig;
    use blocktime_env::{EnvError, RenderFrame};

    struct CountingPointer {
        next: i32,
        quit_after: Option<i32>,
    }

    impl PointerSource for CountingPointer {
        fn sample(&mut self) -> std::result::Result<Position, EnvError> {
            self.next += 1;
            Ok(Position::new(self.next, self.next))
        }

        fn quit_requested(&self) -> bool {
            self.quit_after.is_some_and(|n| self.next >= n)
        }
    }

    struct BrokenSink;

    impl FrameSink for BrokenSink {
        fn render(&mut self, _frame: &RenderFrame) -> std::result::Result<(), EnvError> {
            Err(EnvError::render("terminal went away"))
        }
    }

    fn config(block_time_ms: u64, network_delay_ms: u64) -> SimConfig {
        SimConfig {
            network_delay: Duration::from_millis(network_delay_ms),
            block_time: Duration::from_millis(block_time_ms),
            ..Default::default()
        }
    }

    #[test]
    fn test_runs_to_tick_limit() {
        let config = config(30, 50);
        let mut sim = Simulation::new(&config).unwrap();
        let mut source = CountingPointer { next: 0, quit_after: None };
        let header = ExportHeader::new("count", config, *sim.policy());
        let mut sink = FrameWriter::new(Vec::new(), &header).unwrap();

        let summary = Driver::new(&mut sim, &mut source, &mut sink)
            .with_max_ticks(30)
            .run()
            .unwrap();

        assert_eq!(summary.total_ticks, 30);
        assert_eq!(summary.refreshes, 10);
        assert_eq!(summary.simulated_time, Duration::from_millis(300));
        let export = FrameExport::read_from(&sink.finish().unwrap()[..]).unwrap();
        assert_eq!(export.frames.len(), 30);
        assert_eq!(export.refresh_count(), 10);
        assert_eq!(summary.final_leader, Position::new(30, 30));
        // Last refresh at tick 30 reads 5 ticks back
        assert_eq!(summary.final_follower, Position::new(25, 25));
        assert_eq!(summary.synced_at_tick, Some(6));
    }

    #[test]
    fn test_stops_when_source_quits() {
        let config = config(10, 0);
        let mut sim = Simulation::new(&config).unwrap();
        let mut source = CountingPointer { next: 0, quit_after: Some(7) };
        let mut sink: Option<FrameWriter<Vec<u8>>> = None;

        let summary = Driver::new(&mut sim, &mut source, &mut sink).run().unwrap();

        assert!(summary.quit_requested);
        assert_eq!(summary.total_ticks, 7);
    }

    #[test]
    fn test_sink_failure_is_fatal() {
        let config = config(10, 0);
        let mut sim = Simulation::new(&config).unwrap();
        let mut source = ScriptedPointer::new(PathKind::Circle, Position::new(10, 10), 5, 0);

        let result = Driver::new(&mut sim, &mut source, &mut BrokenSink)
            .with_max_ticks(10)
            .run();

        assert!(result.is_err());
        assert_eq!(sim.current_tick(), 1);
    }

    #[test]
    fn test_zero_lag_has_no_separation() {
        let config = config(10, 0);
        let mut sim = Simulation::new(&config).unwrap();
        let mut source = ScriptedPointer::new(PathKind::Walk, Position::new(10, 10), 5, 9);
        let mut sink: Option<FrameWriter<Vec<u8>>> = None;

        let summary = Driver::new(&mut sim, &mut source, &mut sink)
            .with_max_ticks(100)
            .run()
            .unwrap();

        assert_eq!(summary.mean_separation, 0.0);
        assert_eq!(summary.max_separation, 0.0);
        assert_eq!(summary.synced_at_tick, Some(1));
    }
}
