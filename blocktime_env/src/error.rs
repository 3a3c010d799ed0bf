//! Error types for the blocktime collaborators.

use thiserror::Error;

/// Errors raised by input sources and renderers.
#[derive(Debug, Error)]
pub enum EnvError {
    /// Input device could not be initialized or polled
    #[error("Input error: {0}")]
    InputError(String),

    /// Renderer could not be initialized or failed to draw
    #[error("Render error: {0}")]
    RenderError(String),

    /// Underlying terminal / file I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EnvError {
    /// Creates an input error.
    pub fn input(msg: impl Into<String>) -> Self {
        Self::InputError(msg.into())
    }

    /// Creates a render error.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::RenderError(msg.into())
    }
}
