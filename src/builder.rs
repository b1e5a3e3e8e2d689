//! Builder for configuring and constructing a `RenderEngine`.

use crate::{RenderEngine, Result};
use clavier_core::{EngineConfig, SynthesisCapability};
use clavier_synth::SoundFontSynth;

/// Settings are validated when the engine is built. The sample rate given here
/// is only a starting point: the host's rate arrives through
/// [`RenderEngine::prepare`].
///
/// # Example
///
/// ```ignore
/// use clavier::prelude::*;
///
/// let engine = RenderEngine::builder()
///     .sample_rate(48000.0)
///     .tuning(442.0)
///     .inbox_capacity(512)
///     .build()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct RenderEngineBuilder {
    config: EngineConfig,
}

impl RenderEngineBuilder {
    /// Replace every setting at once, e.g. with a deserialized config.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Default: 44100
    pub fn sample_rate(mut self, sample_rate: f64) -> Self {
        self.config.sample_rate = sample_rate;
        self
    }

    /// Reference pitch for A4. Default: 440
    pub fn tuning(mut self, tuning_hz: f32) -> Self {
        self.config.tuning_hz = tuning_hz;
        self
    }

    /// Default: 256
    pub fn inbox_capacity(mut self, capacity: usize) -> Self {
        self.config.inbox_capacity = capacity;
        self
    }

    /// Default: 1024
    pub fn max_block_frames(mut self, frames: usize) -> Self {
        self.config.max_block_frames = frames;
        self
    }

    /// Build an engine that plays SoundFont banks.
    pub fn build(self) -> Result<RenderEngine<SoundFontSynth>> {
        self.build_with(SoundFontSynth::default)
    }

    /// Build an engine around a custom synthesis capability.
    pub fn build_with<S, F>(self, factory: F) -> Result<RenderEngine<S>>
    where
        S: SynthesisCapability,
        F: Fn() -> S + Send + Sync + 'static,
    {
        RenderEngine::new(self.config, Box::new(factory))
    }
}
