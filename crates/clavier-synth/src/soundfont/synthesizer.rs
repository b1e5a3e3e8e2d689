//! SoundFont synthesis capability backed by RustySynth.

use super::bank::SoundFontBank;
use crate::error::{Error, Result};
use crate::tuning::{fine_tune_data, A4_FREQ};
use clavier_core::{BankHandle, LoadError, Program, SynthesisCapability, MIDI_CHANNELS};
use rustysynth::{Synthesizer, SynthesizerSettings};

/// Frames rendered per RustySynth call. Longer requests are chunked.
const RENDER_CHUNK: usize = 256;

/// General MIDI percussion channel (0-based).
const PERCUSSION_CHANNEL: u8 = 9;

// MIDI status bytes and controllers used to drive RustySynth
const CONTROL_CHANGE: i32 = 0xB0;
const PROGRAM_CHANGE: i32 = 0xC0;
const CC_BANK_SELECT: i32 = 0x00;
const CC_DATA_ENTRY_MSB: i32 = 0x06;
const CC_DATA_ENTRY_LSB: i32 = 0x26;
const CC_RPN_LSB: i32 = 0x64;
const CC_RPN_MSB: i32 = 0x65;
const RPN_FINE_TUNING: i32 = 0x01;
const RPN_NULL: i32 = 0x7F;

/// SoundFont synthesizer implementing [`SynthesisCapability`].
///
/// RustySynth fixes the sample rate when a `Synthesizer` is created, so
/// [`SoundFontSynth::configure_output`] rebuilds it and re-applies the tuning
/// and per-channel program selections. Rebuilding allocates; the engine only
/// does it from `prepare` or before the instance is installed.
pub struct SoundFontSynth {
    bank: Option<SoundFontBank>,
    synthesizer: Option<Synthesizer>,
    sample_rate: u32,
    tuning_hz: f32,
    selected: [Option<usize>; MIDI_CHANNELS],
    left: Vec<f32>,
    right: Vec<f32>,
}

impl SoundFontSynth {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            bank: None,
            synthesizer: None,
            sample_rate,
            tuning_hz: A4_FREQ,
            selected: [None; MIDI_CHANNELS],
            left: vec![0.0; RENDER_CHUNK],
            right: vec![0.0; RENDER_CHUNK],
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn tuning(&self) -> f32 {
        self.tuning_hz
    }

    pub fn bank(&self) -> Option<&SoundFontBank> {
        self.bank.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.synthesizer.is_some()
    }

    /// Program index currently selected on `channel`.
    pub fn selected_program(&self, channel: u8) -> Option<usize> {
        self.selected.get(channel as usize).copied().flatten()
    }

    fn build_synthesizer(bank: &SoundFontBank, sample_rate: u32) -> Result<Synthesizer> {
        let settings = SynthesizerSettings::new(sample_rate as i32);
        Synthesizer::new(bank.soundfont(), &settings)
            .map_err(|e| Error::Synthesizer(format!("{e} (sample rate {sample_rate} Hz)")))
    }

    /// Push tuning and program selections into a fresh synthesizer.
    fn restore_channel_state(&mut self) {
        self.apply_tuning();
        let selected = self.selected;
        for (channel, index) in selected.iter().enumerate() {
            if let Some(index) = *index {
                self.apply_program(channel as u8, index);
            }
        }
    }

    fn apply_tuning(&mut self) {
        let Some(synth) = self.synthesizer.as_mut() else {
            return;
        };
        let (msb, lsb) = fine_tune_data(self.tuning_hz);
        for channel in 0..MIDI_CHANNELS as i32 {
            synth.process_midi_message(channel, CONTROL_CHANGE, CC_RPN_MSB, 0);
            synth.process_midi_message(channel, CONTROL_CHANGE, CC_RPN_LSB, RPN_FINE_TUNING);
            synth.process_midi_message(channel, CONTROL_CHANGE, CC_DATA_ENTRY_MSB, msb as i32);
            synth.process_midi_message(channel, CONTROL_CHANGE, CC_DATA_ENTRY_LSB, lsb as i32);
            // Deselect the RPN so stray data entry messages cannot retune
            synth.process_midi_message(channel, CONTROL_CHANGE, CC_RPN_MSB, RPN_NULL);
            synth.process_midi_message(channel, CONTROL_CHANGE, CC_RPN_LSB, RPN_NULL);
        }
    }

    fn apply_program(&mut self, channel: u8, index: usize) {
        let (Some(synth), Some(bank)) = (self.synthesizer.as_mut(), self.bank.as_ref()) else {
            return;
        };
        let Some(program) = bank.program(index) else {
            return;
        };
        // RustySynth adds 128 to every bank select on the percussion channel.
        // It keeps the raw value, so subtracting first lands on the exact preset.
        let bank_number = if channel == PERCUSSION_CHANNEL {
            program.bank_number - 128
        } else {
            program.bank_number
        };
        let channel = channel as i32;
        synth.process_midi_message(channel, CONTROL_CHANGE, CC_BANK_SELECT, bank_number);
        synth.process_midi_message(channel, PROGRAM_CHANGE, program.patch_number, 0);
    }
}

impl Default for SoundFontSynth {
    fn default() -> Self {
        Self::new(44100)
    }
}

impl SynthesisCapability for SoundFontSynth {
    fn load_bank(&mut self, bytes: &[u8]) -> std::result::Result<BankHandle, LoadError> {
        let bank = SoundFontBank::parse(bytes)?;
        // A rate the synthesizer rejects keeps the bank silent until a
        // supported rate arrives through configure_output
        let synthesizer = match Self::build_synthesizer(&bank, self.sample_rate) {
            Ok(synthesizer) => Some(synthesizer),
            Err(e) => {
                tracing::warn!("{e}; bank kept, rendering silence");
                None
            }
        };

        let handle = BankHandle {
            id: bank.id(),
            program_count: bank.len(),
        };
        let first = if bank.is_empty() { None } else { Some(0) };

        self.bank = Some(bank);
        self.synthesizer = synthesizer;
        self.selected = [first; MIDI_CHANNELS];
        self.restore_channel_state();

        tracing::info!(
            bank = handle.id.id(),
            programs = handle.program_count,
            sample_rate = self.sample_rate,
            "SoundFont bank loaded"
        );
        Ok(handle)
    }

    fn configure_output(&mut self, sample_rate_hz: f64) {
        let sample_rate = sample_rate_hz.round() as u32;
        if sample_rate == self.sample_rate && self.synthesizer.is_some() {
            return;
        }
        self.sample_rate = sample_rate;

        let Some(bank) = self.bank.as_ref() else {
            return;
        };
        match Self::build_synthesizer(bank, sample_rate) {
            Ok(synthesizer) => {
                self.synthesizer = Some(synthesizer);
                self.restore_channel_state();
                tracing::debug!(sample_rate, "synthesizer rebuilt for new sample rate");
            }
            Err(e) => {
                // Keep the bank so a later supported rate can bring it back
                self.synthesizer = None;
                tracing::warn!("{e}; rendering silence");
            }
        }
    }

    fn set_tuning(&mut self, tuning_hz: f32) {
        self.tuning_hz = tuning_hz;
        self.apply_tuning();
    }

    fn note_on(&mut self, channel: u8, note: u8, velocity: f32) {
        let Some(synth) = self.synthesizer.as_mut() else {
            return;
        };
        if velocity <= 0.0 {
            synth.note_off(channel as i32, note as i32);
            return;
        }
        let velocity = ((velocity * 127.0).round() as i32).clamp(1, 127);
        synth.note_on(channel as i32, note as i32, velocity);
    }

    fn note_off(&mut self, channel: u8, note: u8) {
        if let Some(synth) = self.synthesizer.as_mut() {
            synth.note_off(channel as i32, note as i32);
        }
    }

    fn all_notes_off(&mut self) {
        if let Some(synth) = self.synthesizer.as_mut() {
            synth.note_off_all(false);
        }
    }

    fn render(&mut self, output: &mut [f32], frames: usize) {
        let frames = frames.min(output.len() / 2);
        let output = &mut output[..frames * 2];

        let Some(synth) = self.synthesizer.as_mut() else {
            output.fill(0.0);
            return;
        };

        for block in output.chunks_mut(RENDER_CHUNK * 2) {
            let n = block.len() / 2;
            let (left, right) = (&mut self.left[..n], &mut self.right[..n]);
            synth.render(left, right);
            for (i, frame) in block.chunks_exact_mut(2).enumerate() {
                frame[0] = left[i];
                frame[1] = right[i];
            }
        }
    }

    fn program_count(&self) -> usize {
        self.bank.as_ref().map_or(0, SoundFontBank::len)
    }

    fn program_name(&self, index: usize) -> Option<&str> {
        self.bank
            .as_ref()
            .and_then(|bank| bank.program(index))
            .map(|p| p.name.as_str())
    }

    fn programs(&self) -> Vec<Program> {
        self.bank
            .as_ref()
            .map(|bank| bank.programs().to_vec())
            .unwrap_or_default()
    }

    fn select_program(&mut self, channel: u8, index: usize) {
        if channel as usize >= MIDI_CHANNELS || index >= self.program_count() {
            return;
        }
        self.selected[channel as usize] = Some(index);
        self.apply_program(channel, index);
    }
}
