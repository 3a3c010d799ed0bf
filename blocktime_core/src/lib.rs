//! Blocktime Core - Propagation Delay Engine
//!
//! Models how a replica trails its source of truth. A leader position is
//! sampled on every tick of a fixed-rate clock and appended to a circular
//! history; a follower position is refreshed from that history only once
//! per block time, reading as far back as the configured network delay.
//!
//! ```text
//! input ──► Simulation::step ──► HistoryBuffer::write
//!                 │
//!          [every interval_ticks]
//!                 │
//!                 └──► HistoryBuffer::read(lag_ticks) ──► follower ──► renderer
//! ```
//!
//! # Example
//!
//! ```
//! use blocktime_core::{SimConfig, Simulation};
//! use blocktime_env::Position;
//!
//! let mut sim = Simulation::new(&SimConfig::default()).unwrap();
//! let out = sim.step(Position::new(10, 20)).unwrap();
//! assert_eq!(out.leader, Position::new(10, 20));
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod history;
pub mod policy;
pub mod simulation;

// Re-export key types for convenience
pub use clock::Clock;
pub use config::{parse_duration, SimConfig};
pub use error::{BlocktimeError, Result};
pub use history::HistoryBuffer;
pub use policy::DelayPolicy;
pub use simulation::{Simulation, StepOutput};
