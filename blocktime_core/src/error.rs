//! Error taxonomy for the delay engine.

use blocktime_env::EnvError;
use thiserror::Error;

/// Errors produced while configuring or stepping the simulation.
#[derive(Debug, Error)]
pub enum BlocktimeError {
    /// Requested network delay reaches further back than history retains
    #[error("network delay of {lag_ticks} ticks exceeds retained history ({capacity} slots)")]
    LagExceedsCapacity { lag_ticks: u64, capacity: usize },

    /// History was read past its depth; the delay policy let a bad offset through
    #[error("history offset {offset} out of range for capacity {capacity}")]
    OffsetOutOfRange { offset: usize, capacity: usize },

    /// Malformed startup configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Input source or renderer failure
    #[error(transparent)]
    Env(#[from] EnvError),
}

impl BlocktimeError {
    /// Creates a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// True for errors that can only come from a bug, never from user input.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, Self::OffsetOutOfRange { .. })
    }
}

pub type Result<T> = std::result::Result<T, BlocktimeError>;
