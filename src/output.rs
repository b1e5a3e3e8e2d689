//! CPAL audio output driving a `RenderEngine` (feature `output`).

use crate::{Error, RenderEngine, Result};
use clavier_core::{AudioBuffer, SynthesisCapability};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::Arc;

/// Wrapper to hold `cpal::Stream` in a `Send` context.
///
/// # Safety
/// `cpal::Stream` is `!Send` due to platform internals. The stream is only
/// created, kept alive and dropped; it is never used from another thread.
struct StreamHandle(#[allow(dead_code)] cpal::Stream);

unsafe impl Send for StreamHandle {}

/// A running output stream. Audio stops when this is dropped.
///
/// # Example
///
/// ```ignore
/// use clavier::prelude::*;
/// use std::sync::Arc;
///
/// let engine = Arc::new(RenderEngine::builder().build()?);
/// let output = AudioOutput::start(Arc::clone(&engine), None)?;
/// engine.post_event(Event::note_on(60, 0.8));
/// ```
pub struct AudioOutput {
    sample_rate: f64,
    channels: usize,
    device_name: String,
    _stream: StreamHandle,
}

impl AudioOutput {
    /// Open `device_index` (or the default device), prepare the engine for its
    /// sample rate and start playing.
    pub fn start<S: SynthesisCapability>(
        engine: Arc<RenderEngine<S>>,
        device_index: Option<usize>,
    ) -> Result<Self> {
        let device = get_device(device_index)?;
        let config = device.default_output_config()?;
        let sample_rate = config.sample_rate().0 as f64;
        let channels = config.channels() as usize;

        engine.prepare(sample_rate)?;

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => build_stream::<f32, S>(&device, &config.into(), engine)?,
            cpal::SampleFormat::I16 => build_stream::<i16, S>(&device, &config.into(), engine)?,
            cpal::SampleFormat::U16 => build_stream::<u16, S>(&device, &config.into(), engine)?,
            format => {
                return Err(Error::UnsupportedFormat(format!("{format:?}")));
            }
        };
        stream.play()?;

        let device_name = device.name()?;
        tracing::info!(device = %device_name, sample_rate, channels, "audio output started");

        Ok(Self {
            sample_rate,
            channels,
            device_name,
            _stream: StreamHandle(stream),
        })
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    pub fn list_devices() -> Result<Vec<String>> {
        cpal::default_host()
            .output_devices()?
            .enumerate()
            .map(|(i, d)| Ok(format!("{i}: {}", d.name()?)))
            .collect()
    }
}

fn get_device(index: Option<usize>) -> Result<cpal::Device> {
    let host = cpal::default_host();

    match index {
        Some(i) => {
            let devices: Vec<_> = host.output_devices()?.collect();
            let count = devices.len();
            devices.into_iter().nth(i).ok_or_else(|| {
                Error::InvalidDevice(format!("Device index {i} out of range ({count} available)"))
            })
        }
        None => host
            .default_output_device()
            .ok_or_else(|| Error::InvalidDevice("No output device available".into())),
    }
}

fn build_stream<T, S>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    engine: Arc<RenderEngine<S>>,
) -> Result<cpal::Stream>
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
    S: SynthesisCapability,
{
    let channels = config.channels as usize;

    // Grows on the first callback, then stable
    let mut block = AudioBuffer::default();

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                let frames = data.len() / channels.max(1);
                if block.channels() != channels || block.frames() != frames {
                    block.resize(channels, frames);
                }
                engine.render_into(&mut block);
                block.write_interleaved(data, channels, |s| T::from_sample(s));
            }));

            if result.is_err() {
                output_silence(data);
            }
        },
        |err| tracing::error!("audio stream error: {err}"),
        None,
    )?;

    Ok(stream)
}

/// Output silence (panic recovery).
#[inline]
fn output_silence<T: cpal::SizedSample + cpal::FromSample<f32>>(data: &mut [T]) {
    for sample in data.iter_mut() {
        *sample = T::from_sample(0.0);
    }
}
