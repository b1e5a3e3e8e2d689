//! SoundFont synthesis for Clavier.
//!
//! - **[`SoundFontSynth`]** - RustySynth wrapped as a [`SynthesisCapability`]
//! - **[`SoundFontBank`]** - Parsed `.sf2` image with its sorted program list
//! - **[`tuning`]** - Reference pitch to fine tuning RPN conversion
//!
//! # Quick Start
//!
//! ```ignore
//! use clavier_synth::{SoundFontSynth, SynthesisCapability};
//!
//! let mut synth = SoundFontSynth::new(48000);
//! synth.load_bank(&std::fs::read("piano.sf2")?)?;
//! synth.note_on(0, 60, 0.8);
//!
//! let mut block = vec![0.0; 512 * 2];
//! synth.render(&mut block, 512);
//! ```
//!
//! # Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `testing` | In-memory SoundFont writer (`testing` module) |

pub mod error;
pub use error::{Error, Result};

pub mod tuning;
pub use tuning::A4_FREQ;

mod soundfont;
pub use soundfont::{SoundFontBank, SoundFontSynth};

pub use clavier_core::SynthesisCapability;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
