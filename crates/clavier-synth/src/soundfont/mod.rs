//! SoundFont (.sf2) synthesis via RustySynth.
//!
//! Provides [`SoundFontSynth`], the [`SynthesisCapability`](clavier_core::SynthesisCapability)
//! used by the render engine, and [`SoundFontBank`] for parsed banks.

mod bank;
mod synthesizer;

pub use bank::SoundFontBank;
pub use synthesizer::SoundFontSynth;
