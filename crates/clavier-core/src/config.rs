//! Render engine configuration.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Lowest accepted host sample rate.
pub const MIN_SAMPLE_RATE: f64 = 8000.0;

/// Highest accepted host sample rate.
pub const MAX_SAMPLE_RATE: f64 = 384000.0;

/// Default reference pitch for A4.
pub const DEFAULT_TUNING_HZ: f32 = 440.0;

/// Lowest accepted reference pitch (one semitone below A440, rounded up).
pub const TUNING_MIN_HZ: f32 = 415.0;

/// Highest accepted reference pitch (one semitone above A440, rounded down).
pub const TUNING_MAX_HZ: f32 = 466.0;

/// Configuration for the render engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Sample rate assumed until the host calls `prepare`.
    pub sample_rate: f64,
    /// Reference pitch in Hz.
    pub tuning_hz: f32,
    /// Fixed number of events the inbox holds between two render cycles.
    pub inbox_capacity: usize,
    /// Frames rendered per internal chunk. Larger host blocks are split.
    pub max_block_frames: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100.0,
            tuning_hz: DEFAULT_TUNING_HZ,
            inbox_capacity: 256,
            max_block_frames: 1024,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        validate_sample_rate(self.sample_rate)?;
        validate_tuning(self.tuning_hz)?;
        if self.inbox_capacity == 0 {
            return Err(Error::InvalidConfig(
                "inbox_capacity must be at least 1".into(),
            ));
        }
        if self.max_block_frames == 0 {
            return Err(Error::InvalidConfig(
                "max_block_frames must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

pub fn validate_sample_rate(sample_rate: f64) -> Result<()> {
    if !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&sample_rate) {
        return Err(Error::InvalidSampleRate(sample_rate));
    }
    Ok(())
}

pub fn validate_tuning(tuning_hz: f32) -> Result<()> {
    if !(TUNING_MIN_HZ..=TUNING_MAX_HZ).contains(&tuning_hz) {
        return Err(Error::InvalidTuning(tuning_hz));
    }
    Ok(())
}
