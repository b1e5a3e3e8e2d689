//! Real-time building blocks for the Clavier instrument engine.
//!
//! # Primary API
//!
//! - [`Event`]: Immutable note-on/note-off value
//! - [`EventInbox`]: Bounded multi-producer queue drained by the render thread
//! - [`SynthesisCapability`]: Seam over a sample-based synthesizer
//! - [`AudioBuffer`] / [`format`]: Host channel layout conversion
//! - [`EngineConfig`]: Engine configuration
//!
//! # Example
//!
//! ```
//! use clavier_core::{format, Event, EventInbox};
//!
//! let inbox = EventInbox::new(64);
//! inbox.push(Event::note_on(60, 0.8));
//! assert_eq!(inbox.drain_all().len(), 1);
//!
//! let mono = format::convert(&[1.0, 0.0], 1, 1);
//! assert_eq!(mono.channel(0), &[0.5]);
//! ```

pub mod error;
pub use error::{Error, LoadError, Result};

pub mod config;
pub use config::{
    EngineConfig, DEFAULT_TUNING_HZ, MAX_SAMPLE_RATE, MIN_SAMPLE_RATE, TUNING_MAX_HZ,
    TUNING_MIN_HZ,
};

pub mod event;
pub use event::{Event, NoteKind, MAX_NOTE, MIDI_CHANNELS};

mod inbox;
pub use inbox::EventInbox;

pub mod capability;
pub use capability::{BankHandle, BankId, Program, SynthesisCapability};

mod buffer;
pub use buffer::AudioBuffer;

pub mod format;

pub use parking_lot::{Mutex, MutexGuard};
