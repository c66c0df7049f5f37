//! cpal-backed audio output.
//!
//! The engine only ever sees a per-sample callback
//! `(channel index, time in seconds) -> sample`. Everything else here is the
//! device side: enumeration, picking a device, opening a stream in the
//! requested format and counting rendered frames into a [`SampleClock`].

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, SizedSample};

use crate::config::OutputSettings;
use crate::error::{Error, Result};

use super::clock::SampleClock;

/// Names of every output device the host reports, in host order.
pub fn list_output_devices(host: &cpal::Host) -> Result<Vec<String>> {
    let names = host
        .output_devices()?
        .map(|device| device.name())
        .collect::<std::result::Result<Vec<_>, _>>()?;

    tracing::debug!(host = host.id().name(), count = names.len(), "enumerated output devices");
    Ok(names)
}

/// Index of the device to use.
///
/// With no preference the first enumerated device wins; otherwise the first
/// whose name contains `preferred` (case-insensitive). An empty list is an
/// error, never an index.
pub fn choose_device(names: &[String], preferred: Option<&str>) -> Result<usize> {
    if names.is_empty() {
        return Err(Error::NoOutputDevice);
    }

    match preferred {
        None => Ok(0),
        Some(wanted) => {
            let wanted_lower = wanted.to_lowercase();
            names
                .iter()
                .position(|name| name.to_lowercase().contains(&wanted_lower))
                .ok_or_else(|| Error::DeviceNotFound(wanted.to_string()))
        }
    }
}

/// Device sample format for a bit depth.
pub fn sample_format(bit_depth: u16) -> Result<SampleFormat> {
    match bit_depth {
        8 => Ok(SampleFormat::U8),
        16 => Ok(SampleFormat::I16),
        32 => Ok(SampleFormat::F32),
        other => Err(Error::UnsupportedBitDepth(other)),
    }
}

/// Fill an interleaved device buffer from `callback` and advance `clock`.
///
/// Every frame is stamped with the clock time of that frame; the callback
/// runs once per channel. The engine's mix is unclamped, so samples are
/// clipped to [-1, 1] here, at the device boundary. Returns the peak
/// absolute value seen before clipping.
pub fn fill_frames<T, F>(data: &mut [T], channels: usize, clock: &SampleClock, callback: &mut F) -> f64
where
    T: Sample + FromSample<f64>,
    F: FnMut(usize, f64) -> f64,
{
    let channels = channels.max(1);
    let start = clock.frames();
    let mut peak = 0.0_f64;
    let mut frames = 0;

    for (offset, frame) in data.chunks_mut(channels).enumerate() {
        let time = clock.time_at(start + offset as u64);
        for (channel, out) in frame.iter_mut().enumerate() {
            let sample = callback(channel, time);
            peak = peak.max(sample.abs());
            *out = T::from_sample(sample.clamp(-1.0, 1.0));
        }
        frames += 1;
    }

    clock.advance(frames);
    peak
}

/// An open, playing output stream. Audio stops when this is dropped.
pub struct AudioOutput {
    _stream: cpal::Stream,
    device_name: String,
    clock: SampleClock,
    settings: OutputSettings,
}

impl AudioOutput {
    /// Open `device_name` with `settings` and start calling `callback`.
    pub fn open<F>(
        host: &cpal::Host,
        device_name: &str,
        settings: &OutputSettings,
        callback: F,
    ) -> Result<Self>
    where
        F: FnMut(usize, f64) -> f64 + Send + 'static,
    {
        settings.validate()?;

        let device = find_device(host, device_name)?;
        let config = cpal::StreamConfig {
            channels: settings.channels,
            sample_rate: cpal::SampleRate(settings.sample_rate),
            buffer_size: cpal::BufferSize::Fixed(settings.samples_per_buffer),
        };
        let clock = SampleClock::new(settings.sample_rate);

        let stream = match sample_format(settings.bit_depth)? {
            SampleFormat::U8 => build_stream::<u8, F>(&device, &config, clock.clone(), callback)?,
            SampleFormat::I16 => build_stream::<i16, F>(&device, &config, clock.clone(), callback)?,
            SampleFormat::F32 => build_stream::<f32, F>(&device, &config, clock.clone(), callback)?,
            _ => return Err(Error::UnsupportedBitDepth(settings.bit_depth)),
        };
        stream.play()?;

        tracing::info!(
            device = device_name,
            sample_rate = settings.sample_rate,
            channels = settings.channels,
            bit_depth = settings.bit_depth,
            buffer_count = settings.buffer_count,
            samples_per_buffer = settings.samples_per_buffer,
            "output stream started"
        );

        Ok(Self {
            _stream: stream,
            device_name: device_name.to_string(),
            clock,
            settings: settings.clone(),
        })
    }

    /// Seconds of audio rendered so far.
    pub fn current_time(&self) -> f64 {
        self.clock.current_time()
    }

    pub fn clock(&self) -> &SampleClock {
        &self.clock
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    pub fn settings(&self) -> &OutputSettings {
        &self.settings
    }
}

fn find_device(host: &cpal::Host, name: &str) -> Result<cpal::Device> {
    for device in host.output_devices()? {
        if device.name()? == name {
            return Ok(device);
        }
    }
    Err(Error::DeviceNotFound(name.to_string()))
}

fn build_stream<T, F>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    clock: SampleClock,
    mut callback: F,
) -> Result<cpal::Stream>
where
    T: SizedSample + FromSample<f64>,
    F: FnMut(usize, f64) -> f64 + Send + 'static,
{
    let channels = config.channels as usize;

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            fill_frames(data, channels, &clock, &mut callback);
        },
        |err| tracing::error!(%err, "output stream error"),
        None,
    )?;

    Ok(stream)
}
