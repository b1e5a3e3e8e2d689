//! In-memory SoundFont images for tests and demos.
//!
//! [`SoundFontWriter`] emits a minimal but complete SoundFont 2 file: one
//! looping sine sample, one instrument per preset, every instrument playing
//! that sample across the full key and velocity range, shifted by the preset's
//! [`TestPreset::transpose`]. Notes sustain until released, which makes "is
//! this bank still playing" checks deterministic.

/// Samples per sine period. 44100 / 100 = 441 Hz at the root key.
const TONE_PERIOD: usize = 100;

/// Sample length in frames (a whole number of periods so the loop is clean).
const TONE_FRAMES: usize = TONE_PERIOD * 44;

/// Zero samples required after each sample by the SoundFont format.
const SAMPLE_PADDING: usize = 46;

const TONE_SAMPLE_RATE: u32 = 44100;
const TONE_ROOT_KEY: u8 = 69;

// Generator operators
const GEN_INSTRUMENT: u16 = 41;
const GEN_COARSE_TUNE: u16 = 51;
const GEN_SAMPLE_ID: u16 = 53;
const GEN_SAMPLE_MODES: u16 = 54;

/// A preset to write.
#[derive(Clone, Debug)]
pub struct TestPreset {
    name: String,
    bank: u16,
    patch: u16,
    transpose: i16,
}

impl TestPreset {
    pub fn new(name: impl Into<String>, bank: u16, patch: u16) -> Self {
        Self {
            name: name.into(),
            bank,
            patch,
            transpose: 0,
        }
    }

    /// Shift the preset's pitch by whole semitones so programs are audibly
    /// distinct.
    pub fn transpose(mut self, semitones: i16) -> Self {
        self.transpose = semitones;
        self
    }
}

/// Builder for SoundFont images.
#[derive(Clone, Debug, Default)]
pub struct SoundFontWriter {
    presets: Vec<TestPreset>,
}

impl SoundFontWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn preset(mut self, preset: TestPreset) -> Self {
        self.presets.push(preset);
        self
    }

    /// Serialize to `.sf2` bytes.
    pub fn build(&self) -> Vec<u8> {
        let info = list(
            b"INFO",
            &[
                chunk(b"ifil", &[2, 0, 1, 0]),
                chunk(b"isng", b"EMU8000\0"),
                chunk(b"INAM", b"Clavier Test\0\0"),
            ],
        );

        let sdta = list(b"sdta", &[chunk(b"smpl", &sine_sample())]);

        let pdta = list(
            b"pdta",
            &[
                chunk(b"phdr", &self.preset_headers()),
                chunk(b"pbag", &bags(self.presets.len(), 1)),
                chunk(b"pmod", &[0u8; 10]),
                chunk(b"pgen", &self.preset_generators()),
                chunk(b"inst", &self.instrument_headers()),
                chunk(b"ibag", &bags(self.presets.len(), 3)),
                chunk(b"imod", &[0u8; 10]),
                chunk(b"igen", &self.instrument_generators()),
                chunk(b"shdr", &sample_headers()),
            ],
        );

        let mut body = b"sfbk".to_vec();
        body.extend_from_slice(&info);
        body.extend_from_slice(&sdta);
        body.extend_from_slice(&pdta);
        chunk(b"RIFF", &body)
    }

    fn preset_headers(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for (i, preset) in self.presets.iter().enumerate() {
            out.extend_from_slice(&fixed_name(&preset.name));
            out.extend_from_slice(&preset.patch.to_le_bytes());
            out.extend_from_slice(&preset.bank.to_le_bytes());
            out.extend_from_slice(&(i as u16).to_le_bytes());
            out.extend_from_slice(&[0u8; 12]); // library, genre, morphology
        }
        out.extend_from_slice(&fixed_name("EOP"));
        out.extend_from_slice(&[0u8; 4]);
        out.extend_from_slice(&(self.presets.len() as u16).to_le_bytes());
        out.extend_from_slice(&[0u8; 12]);
        out
    }

    fn preset_generators(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for i in 0..self.presets.len() {
            push_generator(&mut out, GEN_INSTRUMENT, i as u16);
        }
        push_generator(&mut out, 0, 0);
        out
    }

    fn instrument_headers(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for i in 0..self.presets.len() {
            out.extend_from_slice(&fixed_name(&format!("Tone {i}")));
            out.extend_from_slice(&(i as u16).to_le_bytes());
        }
        out.extend_from_slice(&fixed_name("EOI"));
        out.extend_from_slice(&(self.presets.len() as u16).to_le_bytes());
        out
    }

    fn instrument_generators(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for preset in &self.presets {
            // sampleID must close the zone
            push_generator(&mut out, GEN_COARSE_TUNE, preset.transpose as u16);
            push_generator(&mut out, GEN_SAMPLE_MODES, 1);
            push_generator(&mut out, GEN_SAMPLE_ID, 0);
        }
        push_generator(&mut out, 0, 0);
        out
    }
}

/// Frequency of the root key (69) at transpose 0.
pub const TONE_ROOT_HZ: f32 = TONE_SAMPLE_RATE as f32 / TONE_PERIOD as f32;

/// Two-preset bank: "Sine Lead" (0:0) and "Sine Pad" (0:1), the pad an
/// octave above the lead.
pub fn tone_bank() -> Vec<u8> {
    SoundFontWriter::new()
        .preset(TestPreset::new("Sine Lead", 0, 0))
        .preset(TestPreset::new("Sine Pad", 0, 1).transpose(12))
        .build()
}

/// Rough fundamental of a sine-like signal, from its rising zero crossings.
pub fn estimate_frequency(samples: &[f32], sample_rate: f64) -> f32 {
    let crossings: Vec<usize> = samples
        .windows(2)
        .enumerate()
        .filter(|(_, w)| w[0] < 0.0 && w[1] >= 0.0)
        .map(|(i, _)| i)
        .collect();
    match (crossings.first(), crossings.last()) {
        (Some(&first), Some(&last)) if last > first => {
            let periods = (crossings.len() - 1) as f64;
            (periods * sample_rate / (last - first) as f64) as f32
        }
        _ => 0.0,
    }
}

fn chunk(id: &[u8; 4], data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(8 + data.len() + 1);
    out.extend_from_slice(id);
    out.extend_from_slice(&(data.len() as u32).to_le_bytes());
    out.extend_from_slice(data);
    if data.len() % 2 == 1 {
        out.push(0);
    }
    out
}

fn list(kind: &[u8; 4], chunks: &[Vec<u8>]) -> Vec<u8> {
    let mut body = kind.to_vec();
    for c in chunks {
        body.extend_from_slice(c);
    }
    chunk(b"LIST", &body)
}

/// One bag per zone, `generators_per_zone` generators each, plus terminator.
fn bags(zones: usize, generators_per_zone: usize) -> Vec<u8> {
    let mut out = Vec::new();
    for i in 0..=zones {
        out.extend_from_slice(&((i * generators_per_zone) as u16).to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
    }
    out
}

fn push_generator(out: &mut Vec<u8>, operator: u16, amount: u16) {
    out.extend_from_slice(&operator.to_le_bytes());
    out.extend_from_slice(&amount.to_le_bytes());
}

fn fixed_name(name: &str) -> [u8; 20] {
    let mut out = [0u8; 20];
    let bytes = name.as_bytes();
    let len = bytes.len().min(19);
    out[..len].copy_from_slice(&bytes[..len]);
    out
}

fn sine_sample() -> Vec<u8> {
    let mut out = Vec::with_capacity((TONE_FRAMES + SAMPLE_PADDING) * 2);
    for i in 0..TONE_FRAMES {
        let phase = i as f32 / TONE_PERIOD as f32 * std::f32::consts::TAU;
        let value = (phase.sin() * 16000.0) as i16;
        out.extend_from_slice(&value.to_le_bytes());
    }
    out.extend(std::iter::repeat(0u8).take(SAMPLE_PADDING * 2));
    out
}

fn sample_headers() -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&fixed_name("Sine"));
    out.extend_from_slice(&0u32.to_le_bytes()); // start
    out.extend_from_slice(&(TONE_FRAMES as u32).to_le_bytes()); // end
    out.extend_from_slice(&0u32.to_le_bytes()); // loop start
    out.extend_from_slice(&(TONE_FRAMES as u32).to_le_bytes()); // loop end
    out.extend_from_slice(&TONE_SAMPLE_RATE.to_le_bytes());
    out.push(TONE_ROOT_KEY);
    out.push(0); // pitch correction
    out.extend_from_slice(&0u16.to_le_bytes()); // sample link
    out.extend_from_slice(&1u16.to_le_bytes()); // mono sample

    out.extend_from_slice(&fixed_name("EOS"));
    out.extend_from_slice(&[0u8; 26]);
    out
}
