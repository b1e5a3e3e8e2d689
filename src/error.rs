//! Centralized error type for the clavier umbrella crate.
//!
//! Wraps all subsystem errors so `?` propagates naturally across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] clavier_core::Error),

    #[error("Bank load failed: {0}")]
    Load(#[from] clavier_core::LoadError),

    #[cfg(feature = "output")]
    #[error("Audio device not available: {0}")]
    InvalidDevice(String),

    #[cfg(feature = "output")]
    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),

    #[cfg(feature = "output")]
    #[error("Failed to get default stream config")]
    DeviceNotAvailable(#[from] cpal::DefaultStreamConfigError),

    #[cfg(feature = "output")]
    #[error("Failed to build audio stream")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[cfg(feature = "output")]
    #[error("Failed to play audio stream")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[cfg(feature = "output")]
    #[error("Failed to enumerate devices")]
    DevicesError(#[from] cpal::DevicesError),

    #[cfg(feature = "output")]
    #[error("Failed to get device name")]
    DeviceNameError(#[from] cpal::DeviceNameError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
