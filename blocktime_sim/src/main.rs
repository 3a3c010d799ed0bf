//! Blocktime demo CLI
//!
//! Visualize how a follower trails a leader under a given block time and
//! network delay, interactively in the terminal or headless.

use blocktime_core::config::{
    DEFAULT_BLOCK_TIME, DEFAULT_HISTORY_CAPACITY, DEFAULT_NETWORK_DELAY, DEFAULT_TICKS_PER_SECOND,
};
use blocktime_core::{parse_duration, BlocktimeError, SimConfig, Simulation};
use blocktime_env::{EnvError, Position};
use blocktime_sim::{
    Dashboard, DashboardInfo, Driver, ExportHeader, FrameWriter, Pacing, PathKind, RunSummary,
    ScriptedPointer, TerminalPointer,
};
use clap::Parser;
use std::fmt;
use std::fs::File;
use std::io::BufWriter;
use std::str::FromStr;
use std::time::Duration;
use tracing::level_filters::LevelFilter;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

type Export = Option<FrameWriter<BufWriter<File>>>;

/// Blocktime propagation-delay demo
#[derive(Parser, Debug)]
#[command(name = "blocktime-sim")]
#[command(about = "Watch a follower trail your cursor through block time and network delay", long_about = None)]
struct Args {
    /// Network propagation delay (e.g. 100ms, 1.5s)
    #[arg(short = 'n', long, default_value_t = DurationArg(DEFAULT_NETWORK_DELAY))]
    network_delay: DurationArg,

    /// Block time: minimum interval between follower refreshes
    #[arg(short = 'b', long, default_value_t = DurationArg(DEFAULT_BLOCK_TIME))]
    block_time: DurationArg,

    /// Engine ticks per second
    #[arg(long, default_value_t = DEFAULT_TICKS_PER_SECOND)]
    tps: u32,

    /// History slots (largest delay = capacity - 1 ticks)
    #[arg(long, default_value_t = DEFAULT_HISTORY_CAPACITY)]
    capacity: usize,

    /// Run without a terminal, driven by a scripted pointer path
    #[arg(long)]
    headless: bool,

    /// Scripted path for headless runs (circle, zigzag, walk)
    #[arg(long, default_value = "circle")]
    path: PathKind,

    /// Seed for the random walk path
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Headless run length in seconds of simulated time
    #[arg(short, long, default_value = "10")]
    duration: f64,

    /// Stream every frame to a JSON Lines file
    #[arg(long)]
    export: Option<String>,

    /// JSON run summary on stdout
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn config(&self) -> SimConfig {
        SimConfig {
            ticks_per_second: self.tps,
            history_capacity: self.capacity,
            network_delay: self.network_delay.0,
            block_time: self.block_time.0,
        }
    }
}

/// Duration flag value; prints the way it parses ("100ms", "1.5s").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DurationArg(Duration);

impl fmt::Display for DurationArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl FromStr for DurationArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_duration(s).map(DurationArg).map_err(|e| e.to_string())
    }
}

/// Most verbose level that may be emitted.
///
/// The dashboard owns stderr's terminal while it runs, so interactive
/// sessions only let warnings and errors through.
fn max_log_level(verbose: bool, headless: bool) -> LevelFilter {
    match (headless, verbose) {
        (false, _) => LevelFilter::WARN,
        (true, true) => LevelFilter::DEBUG,
        (true, false) => LevelFilter::INFO,
    }
}

fn log_filter(verbose: bool, headless: bool) -> EnvFilter {
    let level = max_log_level(verbose, headless);
    if headless {
        EnvFilter::from_default_env().add_directive(level.into())
    } else {
        // RUST_LOG is ignored here
        EnvFilter::new(level.to_string())
    }
}

fn main() {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(log_filter(args.verbose, args.headless))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    let config = args.config();

    let mut sim = match Simulation::new(&config) {
        Ok(sim) => sim,
        Err(e) => {
            error!("Refusing to start: {}", e);
            if let BlocktimeError::LagExceedsCapacity { .. } = e {
                error!(
                    "Largest supported network delay at {} Hz with {} slots is {:?}",
                    config.ticks_per_second,
                    config.history_capacity,
                    config.max_network_delay()
                );
            }
            std::process::exit(1);
        }
    };

    let result = if args.headless {
        run_headless(&args, &config, &mut sim)
    } else {
        run_interactive(&args, &config, &mut sim)
    };

    match result {
        Ok(summary) => report(&args, &summary),
        Err(e) => {
            if e.is_invariant_violation() {
                error!("Internal invariant violated: {}", e);
            } else {
                error!("Simulation aborted: {}", e);
            }
            std::process::exit(1);
        }
    }
}

fn run_headless(
    args: &Args,
    config: &SimConfig,
    sim: &mut Simulation,
) -> Result<RunSummary, BlocktimeError> {
    let target_ticks = (args.duration.max(0.0) * f64::from(config.ticks_per_second)).round() as u64;
    info!(
        "Headless run: path={} seed={} ticks={}",
        args.path, args.seed, target_ticks
    );

    let mut input = ScriptedPointer::new(args.path, Position::new(40, 12), 10, args.seed);
    let mut export = open_export(args, args.path.name(), config, sim)?;

    let result = Driver::new(sim, &mut input, &mut export)
        .with_max_ticks(target_ticks)
        .run();

    finish_export(args, export);
    result
}

fn run_interactive(
    args: &Args,
    config: &SimConfig,
    sim: &mut Simulation,
) -> Result<RunSummary, BlocktimeError> {
    // Open the export before the terminal is taken over
    let export = open_export(args, "mouse", config, sim)?;
    let info = DashboardInfo::new(config, sim.policy());
    let dashboard = Dashboard::new(info)?;

    let mut input = TerminalPointer::new();
    let mut sinks = (dashboard, export);
    let result = Driver::new(sim, &mut input, &mut sinks)
        .with_pacing(Pacing::RealTime)
        .run();

    let (mut dashboard, export) = sinks;
    let restored = dashboard.restore();
    finish_export(args, export);
    settle(result, restored)
}

/// Combines a run's outcome with the terminal restore that follows it.
///
/// A run error wins; a restore failure is only reported as the error when
/// the run itself succeeded.
fn settle<T>(
    result: Result<T, BlocktimeError>,
    restored: Result<(), EnvError>,
) -> Result<T, BlocktimeError> {
    match (result, restored) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(e)) => Err(e.into()),
        (Err(e), restored) => {
            if let Err(restore_err) = restored {
                warn!("Failed to restore terminal: {}", restore_err);
            }
            Err(e)
        }
    }
}

fn open_export(
    args: &Args,
    source: &str,
    config: &SimConfig,
    sim: &Simulation,
) -> Result<Export, BlocktimeError> {
    let Some(path) = &args.export else {
        return Ok(None);
    };
    let header = ExportHeader::new(source, config.clone(), *sim.policy());
    let writer = FrameWriter::create(path, &header).map_err(EnvError::from)?;
    Ok(Some(writer))
}

fn finish_export(args: &Args, export: Export) {
    if let (Some(path), Some(writer)) = (&args.export, export) {
        let frames = writer.frames();
        match writer.finish() {
            Ok(_) => info!("Exported {} frames to {}", frames, path),
            Err(e) => error!("Failed to write export: {:?}", e),
        }
    }
}

fn report(args: &Args, summary: &RunSummary) {
    if args.json {
        match serde_json::to_string_pretty(summary) {
            Ok(json) => println!("{}", json),
            Err(e) => error!("Failed to serialize summary: {}", e),
        }
        return;
    }

    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!(
        "{} ticks ({:?} simulated), {} follower refreshes",
        summary.total_ticks, summary.simulated_time, summary.refreshes
    );
    match summary.synced_at_tick {
        Some(tick) => info!("Follower caught up with history at tick {}", tick),
        None => info!("Follower never read past the unfilled history"),
    }
    info!(
        "Separation: mean {:.2} cells, max {:.2} cells",
        summary.mean_separation, summary.max_separation
    );
    info!(
        "Final: leader {} follower {}",
        summary.final_leader, summary.final_follower
    );
}
