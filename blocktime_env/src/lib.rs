//! Blocktime Environment Abstraction Layer
//!
//! This crate is the seam between the delay engine and the outside world.
//! The engine never touches a terminal, a mouse or a window directly; it
//! pulls leader samples from a [`PointerSource`] and pushes finished frames
//! into a [`FrameSink`].
//!
//! # Implementations
//!
//! - **Interactive**: terminal mouse input + ratatui dashboard (`blocktime_sim`)
//! - **Headless**: scripted pointer paths + frame exporter (`blocktime_sim`)
//!
//! # Example
//!
//! ```ignore
//! use blocktime_env::{FrameSink, PointerSource};
//!
//! fn drive<P: PointerSource, R: FrameSink>(input: &mut P, out: &mut R) {
//!     loop {
//!         let leader = input.sample()?;
//!         let frame = sim.step(leader)?;
//!         out.render(&frame.into())?;
//!     }
//! }
//! ```

mod error;
mod source;
mod types;

pub use error::EnvError;
pub use source::{FrameSink, PointerSource};
pub use types::{Position, RenderFrame};
