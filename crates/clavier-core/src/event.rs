//! Note events passed from the input side to the render path.

use serde::{Deserialize, Serialize};

/// Number of MIDI channels addressable by an [`Event`].
pub const MIDI_CHANNELS: usize = 16;

/// Highest MIDI note number.
pub const MAX_NOTE: u8 = 127;

/// Whether an event starts or releases a note.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteKind {
    NoteOn,
    NoteOff,
}

/// Immutable note-on/note-off occurrence.
///
/// Values are clamped into range on construction, so every `Event` can be
/// applied to a synthesizer without further checks.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    kind: NoteKind,
    channel: u8,
    note: u8,
    velocity: f32,
}

impl Event {
    /// Note on for channel 0. Use [`Event::on_channel`] to retarget.
    #[inline]
    pub fn note_on(note: u8, velocity: f32) -> Self {
        Self::new(NoteKind::NoteOn, 0, note, velocity)
    }

    /// Note off for channel 0.
    #[inline]
    pub fn note_off(note: u8) -> Self {
        Self::new(NoteKind::NoteOff, 0, note, 0.0)
    }

    #[inline]
    pub fn new(kind: NoteKind, channel: u8, note: u8, velocity: f32) -> Self {
        let velocity = if velocity.is_nan() {
            0.0
        } else {
            velocity.clamp(0.0, 1.0)
        };
        Self {
            kind,
            channel: channel.min(MIDI_CHANNELS as u8 - 1),
            note: note.min(MAX_NOTE),
            velocity,
        }
    }

    /// Same event on another channel (clamped to 0..=15).
    #[inline]
    pub fn on_channel(self, channel: u8) -> Self {
        Self::new(self.kind, channel, self.note, self.velocity)
    }

    /// Parse a raw MIDI note message (`0x8n` / `0x9n`).
    ///
    /// Returns `None` for anything that is not a complete note message.
    /// Velocity is scaled from 0..=127 to 0.0..=1.0; a note on with velocity 0
    /// stays a `NoteOn`.
    pub fn from_midi(bytes: &[u8]) -> Option<Self> {
        let &[status, note, velocity, ..] = bytes else {
            return None;
        };
        if note > MAX_NOTE || velocity > 127 {
            return None;
        }
        let channel = status & 0x0F;
        let velocity = velocity as f32 / 127.0;
        match status & 0xF0 {
            0x90 => Some(Self::new(NoteKind::NoteOn, channel, note, velocity)),
            0x80 => Some(Self::new(NoteKind::NoteOff, channel, note, velocity)),
            _ => None,
        }
    }

    #[inline]
    pub fn kind(&self) -> NoteKind {
        self.kind
    }

    #[inline]
    pub fn channel(&self) -> u8 {
        self.channel
    }

    #[inline]
    pub fn note(&self) -> u8 {
        self.note
    }

    #[inline]
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    #[inline]
    pub fn is_note_on(&self) -> bool {
        self.kind == NoteKind::NoteOn
    }

    /// True for note offs and for note ons with zero velocity.
    #[inline]
    pub fn is_release(&self) -> bool {
        self.kind == NoteKind::NoteOff || self.velocity <= 0.0
    }
}
