//! Test helpers and fixtures for Clavier integration tests
//!
//! Engines are driven by hand (no audio device): tests call `prepare` and
//! `render_block` the way a host would, one period at a time.
//!
//! ## Tolerance Levels
//!
//! Use the appropriate tolerance from [`tolerances`] module:
//! - `FLOAT_EPSILON` (1e-6): Exact operations (copies, downmix)
//! - `SILENCE_THRESHOLD` (0.0001): Silence detection (-80dB)
//! - `AUDIBLE_RMS` (0.001): A held test-bank note

#![allow(dead_code)]


use clavier::core::{BankHandle, BankId};
use clavier::prelude::*;
use clavier::Program;
use std::sync::Arc;

pub use clavier::synth::testing::{
    estimate_frequency, tone_bank, SoundFontWriter, TestPreset, TONE_ROOT_HZ,
};
pub use tolerances::*;

/// Default test sample rate (matches common hardware)
pub const TEST_SAMPLE_RATE: f64 = 48000.0;

/// Standard buffer size for deterministic testing
pub const TEST_BUFFER_SIZE: usize = 512;

/// SoundFont engine prepared at [`TEST_SAMPLE_RATE`], no bank loaded.
pub fn test_engine() -> RenderEngine {
    let engine = RenderEngine::builder()
        .build()
        .expect("Failed to create test engine");
    engine
        .prepare(TEST_SAMPLE_RATE)
        .expect("Failed to prepare test engine");
    engine
}

/// Prepared SoundFont engine with [`tone_bank`] loaded and installed.
pub fn loaded_engine() -> RenderEngine {
    let engine = test_engine();
    engine.load_bank(&tone_bank()).expect("Failed to load tone bank");
    // First block swaps the bank in
    engine.render_block(2, TEST_BUFFER_SIZE);
    engine
}

/// Render `blocks` stereo blocks and return them concatenated per channel.
pub fn render_blocks(engine: &RenderEngine, blocks: usize) -> (Vec<f32>, Vec<f32>) {
    let mut left = Vec::new();
    let mut right = Vec::new();
    for _ in 0..blocks {
        let block = engine.render_block(2, TEST_BUFFER_SIZE);
        left.extend_from_slice(block.channel(0));
        right.extend_from_slice(block.channel(1));
    }
    (left, right)
}

/// Calculate RMS of a signal.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f32 = samples.iter().map(|s| s * s).sum();
    (sum_sq / samples.len() as f32).sqrt()
}

/// Calculate peak amplitude of a signal.
pub fn peak(samples: &[f32]) -> f32 {
    samples
        .iter()
        .map(|s| s.abs())
        .fold(0.0_f32, |a, b| a.max(b))
}

/// Check if two signals are approximately equal within tolerance.
pub fn signals_approx_equal(a: &[f32], b: &[f32], tolerance: f32) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() <= tolerance)
}

/// Assert that a signal is approximately silent (all values near zero).
pub fn assert_silence(samples: &[f32], tolerance: f32) {
    let max = peak(samples);
    assert!(
        max <= tolerance,
        "Expected silence, but peak amplitude was {}",
        max
    );
}

/// Assert that a signal has content (not silent).
pub fn assert_has_audio(samples: &[f32], min_rms: f32) {
    let r = rms(samples);
    assert!(
        r >= min_rms,
        "Expected audio content with RMS >= {}, but RMS was {}",
        min_rms,
        r
    );
}

// =============================================================================
// Recording capability
// =============================================================================

/// What a [`RecordingSynth`] was asked to do.
#[derive(Clone, Debug, PartialEq)]
pub enum Applied {
    NoteOn { channel: u8, note: u8 },
    NoteOff { channel: u8, note: u8 },
}

/// Shared log of every note a [`RecordingSynth`] instance received.
pub type NoteLog = Arc<clavier::core::Mutex<Vec<Applied>>>;

/// Capability that records notes instead of synthesizing them and renders a
/// constant 0.5 on the left channel and -0.5 on the right.
///
/// Accepts any non-empty bank; each byte becomes one program.
pub struct RecordingSynth {
    log: NoteLog,
    programs: Vec<Program>,
}

impl RecordingSynth {
    pub fn new(log: NoteLog) -> Self {
        Self {
            log,
            programs: Vec::new(),
        }
    }
}

impl SynthesisCapability for RecordingSynth {
    fn load_bank(&mut self, bytes: &[u8]) -> Result<BankHandle, LoadError> {
        if bytes.is_empty() {
            return Err(LoadError::Empty);
        }
        self.programs = (0..bytes.len())
            .map(|index| Program {
                index,
                name: format!("Program {index}"),
                bank_number: 0,
                patch_number: index as i32,
            })
            .collect();
        Ok(BankHandle {
            id: BankId::next(),
            program_count: self.programs.len(),
        })
    }

    fn configure_output(&mut self, _sample_rate_hz: f64) {}

    fn set_tuning(&mut self, _tuning_hz: f32) {}

    fn note_on(&mut self, channel: u8, note: u8, _velocity: f32) {
        self.log.lock().push(Applied::NoteOn { channel, note });
    }

    fn note_off(&mut self, channel: u8, note: u8) {
        self.log.lock().push(Applied::NoteOff { channel, note });
    }

    fn all_notes_off(&mut self) {}

    fn render(&mut self, output: &mut [f32], frames: usize) {
        for frame in output[..frames * 2].chunks_exact_mut(2) {
            frame[0] = 0.5;
            frame[1] = -0.5;
        }
    }

    fn program_count(&self) -> usize {
        self.programs.len()
    }

    fn program_name(&self, index: usize) -> Option<&str> {
        self.programs.get(index).map(|p| p.name.as_str())
    }

    fn programs(&self) -> Vec<Program> {
        self.programs.clone()
    }

    fn select_program(&mut self, _channel: u8, _index: usize) {}
}

/// Engine over [`RecordingSynth`] instances that all share one log.
pub fn recording_engine(inbox_capacity: usize) -> (RenderEngine<RecordingSynth>, NoteLog) {
    let log = NoteLog::default();
    let factory_log = Arc::clone(&log);
    let engine = RenderEngine::builder()
        .inbox_capacity(inbox_capacity)
        .build_with(move || RecordingSynth::new(Arc::clone(&factory_log)))
        .expect("Failed to create recording engine");
    (engine, log)
}
