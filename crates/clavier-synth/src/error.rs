//! Error types for clavier-synth.

use clavier_core::LoadError;
use thiserror::Error;

/// Result type alias for clavier-synth operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in clavier-synth.
#[derive(Debug, Error)]
pub enum Error {
    /// SoundFont parsing failed.
    #[error("SoundFont error: {0}")]
    SoundFont(String),

    /// The synthesizer rejected the bank or the output settings.
    #[error("Synthesizer error: {0}")]
    Synthesizer(String),
}

impl From<Error> for LoadError {
    fn from(err: Error) -> Self {
        LoadError::InvalidFormat(err.to_string())
    }
}
