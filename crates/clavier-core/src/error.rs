//! Error types for clavier-core.

use thiserror::Error;

/// Error type for clavier-core operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid sample rate: {0}. Must be between 8000 and 384000 Hz")]
    InvalidSampleRate(f64),

    #[error("Invalid tuning: {0} Hz. Must be between {min} and {max} Hz", min = crate::TUNING_MIN_HZ, max = crate::TUNING_MAX_HZ)]
    InvalidTuning(f32),

    #[error(transparent)]
    Load(#[from] LoadError),
}

/// Result type alias.
pub type Result<T> = core::result::Result<T, Error>;

/// Bank parse failures. Recoverable: the previously loaded bank stays active.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("Bank data is empty")]
    Empty,

    #[error("Invalid bank format: {0}")]
    InvalidFormat(String),
}
