//! Interleaved stereo to host channel layout conversion.
//!
//! - 2 channels: split into left and right.
//! - 1 channel: arithmetic mean of left and right.
//! - 3 or more: left and right in the first two channels, silence elsewhere.
//! - 0 channels: nothing to write.

use crate::buffer::AudioBuffer;

/// Convert `frames` interleaved stereo frames into a new planar buffer.
///
/// Frames missing from `interleaved` (shorter input) are left silent.
pub fn convert(interleaved: &[f32], frames: usize, channels: usize) -> AudioBuffer {
    let mut output = AudioBuffer::new(channels, frames);
    convert_into(interleaved, &mut output, 0);
    output
}

/// Write interleaved stereo into `output` starting at frame `offset`.
///
/// Writes `min(interleaved.len() / 2, output.frames() - offset)` frames and
/// returns that count. Channels past the second are zeroed over the same span.
pub fn convert_into(interleaved: &[f32], output: &mut AudioBuffer, offset: usize) -> usize {
    let available = output.frames().saturating_sub(offset);
    let frames = (interleaved.len() / 2).min(available);
    let source = &interleaved[..frames * 2];

    match output.channels() {
        0 => {}
        1 => {
            let mono = &mut output.channel_mut(0)[offset..offset + frames];
            for (out, pair) in mono.iter_mut().zip(source.chunks_exact(2)) {
                *out = (pair[0] + pair[1]) * 0.5;
            }
        }
        channels => {
            {
                let left = &mut output.channel_mut(0)[offset..offset + frames];
                for (out, pair) in left.iter_mut().zip(source.chunks_exact(2)) {
                    *out = pair[0];
                }
            }
            {
                let right = &mut output.channel_mut(1)[offset..offset + frames];
                for (out, pair) in right.iter_mut().zip(source.chunks_exact(2)) {
                    *out = pair[1];
                }
            }
            for ch in 2..channels {
                output.channel_mut(ch)[offset..offset + frames].fill(0.0);
            }
        }
    }

    frames
}
