//! The seam between the render engine and a sample-based synthesizer.

use crate::error::LoadError;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of one successful bank load. Never reused within a process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BankId(u64);

impl BankId {
    /// Allocate a fresh id.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the internal ID (for debugging/logging only)
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// A selectable instrument definition within a loaded bank.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub index: usize,
    pub name: String,
    pub bank_number: i32,
    pub patch_number: i32,
}

/// Result of a successful [`SynthesisCapability::load_bank`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BankHandle {
    pub id: BankId,
    pub program_count: usize,
}

/// Narrow interface over an external sample-based synthesizer.
///
/// Everything here is called either from the control side while the instance
/// is still private (`load_bank`, `configure_output`) or from the render
/// thread once it has been installed. Implementations must therefore keep
/// `note_on`, `note_off`, `select_program`, `set_tuning` and `render` free of
/// blocking and allocation.
///
/// Missing state is never an error: without a bank, notes are ignored and
/// `render` writes silence; out-of-range program indices are ignored.
pub trait SynthesisCapability: Send + 'static {
    /// Parse `bytes` into a playable bank, replacing the current one only on
    /// success.
    fn load_bank(&mut self, bytes: &[u8]) -> Result<BankHandle, LoadError>;

    /// Set the output sample rate. Valid with or without a bank.
    fn configure_output(&mut self, sample_rate_hz: f64);

    /// Set the reference pitch of A4 for every channel.
    fn set_tuning(&mut self, tuning_hz: f32);

    fn note_on(&mut self, channel: u8, note: u8, velocity: f32);

    fn note_off(&mut self, channel: u8, note: u8);

    /// Release every sounding voice on every channel.
    fn all_notes_off(&mut self);

    /// Write `frames` interleaved stereo frames into `output[..frames * 2]`.
    fn render(&mut self, output: &mut [f32], frames: usize);

    fn program_count(&self) -> usize;

    fn program_name(&self, index: usize) -> Option<&str>;

    /// Full program list of the current bank, in index order.
    fn programs(&self) -> Vec<Program>;

    fn select_program(&mut self, channel: u8, index: usize);
}

impl<S: SynthesisCapability + ?Sized> SynthesisCapability for Box<S> {
    fn load_bank(&mut self, bytes: &[u8]) -> Result<BankHandle, LoadError> {
        (**self).load_bank(bytes)
    }

    fn configure_output(&mut self, sample_rate_hz: f64) {
        (**self).configure_output(sample_rate_hz)
    }

    fn set_tuning(&mut self, tuning_hz: f32) {
        (**self).set_tuning(tuning_hz)
    }

    fn note_on(&mut self, channel: u8, note: u8, velocity: f32) {
        (**self).note_on(channel, note, velocity)
    }

    fn note_off(&mut self, channel: u8, note: u8) {
        (**self).note_off(channel, note)
    }

    fn all_notes_off(&mut self) {
        (**self).all_notes_off()
    }

    fn render(&mut self, output: &mut [f32], frames: usize) {
        (**self).render(output, frames)
    }

    fn program_count(&self) -> usize {
        (**self).program_count()
    }

    fn program_name(&self, index: usize) -> Option<&str> {
        (**self).program_name(index)
    }

    fn programs(&self) -> Vec<Program> {
        (**self).programs()
    }

    fn select_program(&mut self, channel: u8, index: usize) {
        (**self).select_program(channel, index)
    }
}
