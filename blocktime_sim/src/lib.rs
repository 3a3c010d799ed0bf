//! Blocktime Simulator
//!
//! Drivers for the propagation-delay engine in `blocktime_core`:
//!
//! - **Interactive**: a terminal dashboard where the mouse is the leader
//!   (carrot) and the follower (bunny) trails it by the configured network
//!   delay, refreshing once per block time.
//! - **Headless**: scripted pointer paths driven as fast as possible, with
//!   an optional JSON Lines export streamed frame by frame.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐    sample()    ┌──────────────┐   render()   ┌──────────────┐
//! │  PointerSource   │ ─────────────► │  Simulation  │ ───────────► │  FrameSink   │
//! │ mouse / scripted │                │ (core step)  │              │ TUI / export │
//! └──────────────────┘                └──────────────┘              └──────────────┘
//!                        ▲ Driver paces ticks (real time or unpaced) ▲
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use blocktime_sim::{Driver, ExportHeader, FrameWriter, PathKind, ScriptedPointer};
//! use blocktime_core::{SimConfig, Simulation};
//!
//! let config = SimConfig::default();
//! let mut sim = Simulation::new(&config)?;
//! let mut input = ScriptedPointer::new(PathKind::Circle, Position::new(40, 12), 10, 42);
//! let header = ExportHeader::new("circle", config, *sim.policy());
//! let mut sink = FrameWriter::create("run.jsonl", &header)?;
//! let summary = Driver::new(&mut sim, &mut input, &mut sink).with_max_ticks(1000).run()?;
//! sink.finish()?;
//! ```

mod dashboard;
mod exporter;
mod pointer;
mod runner;

pub use dashboard::{Dashboard, DashboardInfo, TerminalPointer};
pub use exporter::{ExportHeader, FrameExport, FrameRecord, FrameWriter};
pub use pointer::{PathKind, ScriptedPointer};
pub use runner::{Driver, Pacing, RunSummary};
