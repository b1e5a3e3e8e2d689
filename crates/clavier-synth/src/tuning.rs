//! Reference pitch tuning.
//!
//! The synthesizer is detuned through the MIDI "channel fine tuning" RPN,
//! which spans one semitone either way in 14-bit resolution. Reference pitches
//! accepted by the engine (415-466 Hz) stay inside that window.

/// Reference pitch for A4.
pub const A4_FREQ: f32 = 440.0;

/// Centre value of the 14-bit fine tuning RPN (no detune).
pub const FINE_TUNE_CENTER: u16 = 8192;

/// Largest 14-bit value.
const FINE_TUNE_MAX: u16 = 16383;

/// Offset in cents from A440 for a given reference pitch.
pub fn cents_from_a440(reference_hz: f32) -> f32 {
    1200.0 * (reference_hz / A4_FREQ).log2()
}

/// 14-bit fine tuning RPN value for a reference pitch, clamped to ±100 cents.
pub fn fine_tune_value(reference_hz: f32) -> u16 {
    let cents = cents_from_a440(reference_hz);
    if !cents.is_finite() {
        return FINE_TUNE_CENTER;
    }
    let offset = (cents / 100.0 * FINE_TUNE_CENTER as f32).round();
    (FINE_TUNE_CENTER as f32 + offset).clamp(0.0, FINE_TUNE_MAX as f32) as u16
}

/// Data entry (MSB, LSB) pair for [`fine_tune_value`].
pub fn fine_tune_data(reference_hz: f32) -> (u8, u8) {
    let value = fine_tune_value(reference_hz);
    ((value >> 7) as u8, (value & 0x7F) as u8)
}
