//! # Clavier - Real-time SoundFont Instrument Engine
//!
//! Turns note events into audio by driving a SoundFont synthesizer from an
//! audio callback that never blocks.
//!
//! ## Architecture
//!
//! Clavier is an umbrella crate that coordinates:
//! - **clavier-core** - Events, event inbox, synthesis capability trait, channel format conversion
//! - **clavier-synth** - RustySynth-backed SoundFont synthesis and tuning
//!
//! and adds the [`RenderEngine`] that ties them together.
//!
//! ## Quick Start
//!
//! ```ignore
//! use clavier::prelude::*;
//!
//! let engine = RenderEngine::builder().build()?;
//! engine.load_bank_file("piano.sf2")?;
//! engine.prepare(48000.0)?;
//!
//! // Control thread
//! engine.post_event(Event::note_on(60, 0.8));
//! engine.set_tuning(442.0)?;
//!
//! // Audio thread, once per period
//! let block = engine.render_block(2, 512);
//! ```
//!
//! ## Feature Flags
//!
//! - `default` - Render engine and SoundFont synthesis
//! - `output` - CPAL audio output (`AudioOutput`)

/// Re-export of clavier-core for direct access
pub use clavier_core as core;

/// Re-export of clavier-synth for direct access
pub use clavier_synth as synth;

pub use clavier_core::{
    format, AudioBuffer, BankHandle, BankId, EngineConfig, Event, EventInbox, LoadError,
    NoteKind, Program, SynthesisCapability, DEFAULT_TUNING_HZ, MAX_SAMPLE_RATE, MIDI_CHANNELS,
    MIN_SAMPLE_RATE, TUNING_MAX_HZ, TUNING_MIN_HZ,
};

pub use clavier_synth::{SoundFontBank, SoundFontSynth};

mod error;
pub use error::{Error, Result};

mod builder;
mod engine;

pub use builder::RenderEngineBuilder;
pub use engine::{BankInfo, CapabilityFactory, EngineStatus, RenderEngine};

#[cfg(feature = "output")]
mod output;

#[cfg(feature = "output")]
pub use output::AudioOutput;

/// Convenience prelude for common imports
pub mod prelude {
    // Main engine
    pub use crate::{RenderEngine, RenderEngineBuilder};

    // Essential types
    pub use crate::{AudioBuffer, BankInfo, EngineConfig, EngineStatus, Event, LoadError};

    // Synthesis
    pub use crate::{SoundFontSynth, SynthesisCapability};

    // Audio output
    #[cfg(feature = "output")]
    pub use crate::AudioOutput;
}
