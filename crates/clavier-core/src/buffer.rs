//! Planar output buffer handed to the audio host.

/// Planar float buffer: `channels` sequences of `frames` samples each.
///
/// Storage is one contiguous allocation laid out channel after channel.
/// [`AudioBuffer::resize`] keeps the allocation when the new shape fits, so a
/// buffer reused across render cycles stops allocating after the first one.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AudioBuffer {
    channels: usize,
    frames: usize,
    data: Vec<f32>,
}

impl AudioBuffer {
    /// Zeroed buffer of the given shape.
    pub fn new(channels: usize, frames: usize) -> Self {
        Self {
            channels,
            frames,
            data: vec![0.0; channels * frames],
        }
    }

    /// Empty buffer with room for `channels * frames` samples.
    pub fn with_capacity(channels: usize, frames: usize) -> Self {
        Self {
            channels: 0,
            frames: 0,
            data: Vec::with_capacity(channels * frames),
        }
    }

    /// Change the shape and zero every sample.
    pub fn resize(&mut self, channels: usize, frames: usize) {
        self.channels = channels;
        self.frames = frames;
        self.data.clear();
        self.data.resize(channels * frames, 0.0);
    }

    pub fn fill(&mut self, value: f32) {
        self.data.fill(value);
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    #[inline]
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Total sample count (`channels * frames`).
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn channel(&self, channel: usize) -> &[f32] {
        let start = channel * self.frames;
        &self.data[start..start + self.frames]
    }

    #[inline]
    pub fn channel_mut(&mut self, channel: usize) -> &mut [f32] {
        let start = channel * self.frames;
        &mut self.data[start..start + self.frames]
    }

    /// All samples, channel after channel.
    #[inline]
    pub fn samples(&self) -> &[f32] {
        &self.data
    }

    pub fn is_silent(&self) -> bool {
        self.data.iter().all(|&s| s == 0.0)
    }

    /// Write the buffer frame by frame into an interleaved device buffer with
    /// `device_channels` channels. Surplus device channels receive silence.
    pub fn write_interleaved<T, F>(&self, out: &mut [T], device_channels: usize, convert: F)
    where
        F: Fn(f32) -> T,
    {
        if device_channels == 0 {
            return;
        }
        for (frame, chunk) in out.chunks_mut(device_channels).enumerate() {
            for (ch, sample) in chunk.iter_mut().enumerate() {
                let value = if ch < self.channels && frame < self.frames {
                    self.data[ch * self.frames + frame]
                } else {
                    0.0
                };
                *sample = convert(value);
            }
        }
    }
}
