//! cpal-backed audio player.
//!
//! The output stream runs for the lifetime of the player and writes silence
//! while paused. Position, play state and the end-of-track flag live in a
//! shared block of atomics that the stream callback, the UI thread and the
//! tick task all read.

use super::device::find_output_device;
use crate::waveform::{AudioPlayer, SampleBuffer, Timeline};
use anyhow::Result;
use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{Sample, SizedSample};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Transport state shared with the audio callback.
#[derive(Debug)]
pub struct SharedTransport {
    /// Read position in source frames, stored as `f64` bits
    position: AtomicU64,
    playing: AtomicBool,
    finished: AtomicBool,
    total_frames: usize,
    sample_rate: u32,
}

impl SharedTransport {
    pub fn new(total_frames: usize, sample_rate: u32) -> Self {
        Self {
            position: AtomicU64::new(0f64.to_bits()),
            playing: AtomicBool::new(false),
            finished: AtomicBool::new(false),
            total_frames,
            sample_rate: sample_rate.max(1),
        }
    }

    fn position(&self) -> f64 {
        f64::from_bits(self.position.load(Ordering::Acquire))
    }

    fn set_position(&self, frames: f64) {
        self.position.store(frames.to_bits(), Ordering::Release);
    }

    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Acquire)
    }

    fn set_playing(&self, playing: bool) {
        self.playing.store(playing, Ordering::Release);
    }

    fn seek_to(&self, seconds: f64) {
        let frames = if seconds.is_finite() {
            (seconds * self.sample_rate as f64).clamp(0.0, self.total_frames as f64)
        } else {
            0.0
        };
        self.set_position(frames);
        self.finished.store(false, Ordering::Release);
    }

    /// Fills one device buffer from `samples`, advancing `step` source frames
    /// per device frame and duplicating the value into every device channel.
    fn render<T>(&self, samples: &[f32], data: &mut [T], channels: usize, step: f64)
    where
        T: SizedSample + cpal::FromSample<f32>,
    {
        let silence = T::from_sample(0.0f32);
        if !self.is_playing() {
            data.fill(silence);
            return;
        }

        let start_bits = self.position.load(Ordering::Acquire);
        let mut position = f64::from_bits(start_bits);
        let mut ran_out = false;

        for frame in data.chunks_mut(channels.max(1)) {
            let value = match samples.get(position as usize) {
                Some(&sample) if !ran_out => {
                    position += step;
                    T::from_sample(sample)
                }
                _ => {
                    ran_out = true;
                    silence
                }
            };
            frame.fill(value);
        }

        // A seek issued while this buffer was rendering wins over our advance.
        let advanced = self.position.compare_exchange(
            start_bits,
            position.to_bits(),
            Ordering::AcqRel,
            Ordering::Acquire,
        );

        if ran_out && advanced.is_ok() {
            self.set_playing(false);
            self.finished.store(true, Ordering::Release);
        }
    }
}

impl Timeline for SharedTransport {
    fn current_time(&self) -> f64 {
        self.position() / self.sample_rate as f64
    }

    fn duration(&self) -> f64 {
        self.total_frames as f64 / self.sample_rate as f64
    }

    fn reached_end(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }
}

/// Plays a [`SampleBuffer`] on an output device.
pub struct CpalPlayer {
    transport: Arc<SharedTransport>,
    device_name: String,
    /// Kept alive for playback; dropping it closes the device
    _stream: cpal::Stream,
}

impl CpalPlayer {
    /// Opens `device_spec` and starts a (silent) output stream for `samples`.
    ///
    /// # Errors
    /// - If the device cannot be found or has no usable default config
    /// - If the output stream cannot be built or started
    pub fn open(samples: SampleBuffer, sample_rate: u32, device_spec: &str) -> Result<Self> {
        let device = find_output_device(device_spec)?;
        let device_name = device
            .name()
            .unwrap_or_else(|_| "Unknown device".to_string());

        let supported = device.default_output_config()?;
        let sample_format = supported.sample_format();
        let config: cpal::StreamConfig = supported.into();
        let device_rate = config.sample_rate.0;
        let channels = config.channels as usize;

        if device_rate != sample_rate {
            tracing::warn!(
                "Track is {}Hz but device runs at {}Hz. Resampling by stepping.",
                sample_rate,
                device_rate
            );
        }

        tracing::info!(
            "Playback device: {} ({}Hz, {} channels, {:?})",
            device_name,
            device_rate,
            channels,
            sample_format
        );

        let transport = Arc::new(SharedTransport::new(samples.len(), sample_rate));
        let step = sample_rate as f64 / device_rate.max(1) as f64;

        let stream = match sample_format {
            cpal::SampleFormat::I16 => {
                build_stream::<i16>(&device, &config, &transport, samples, channels, step)?
            }
            cpal::SampleFormat::U16 => {
                build_stream::<u16>(&device, &config, &transport, samples, channels, step)?
            }
            cpal::SampleFormat::I32 => {
                build_stream::<i32>(&device, &config, &transport, samples, channels, step)?
            }
            _ => build_stream::<f32>(&device, &config, &transport, samples, channels, step)?,
        };
        stream.play()?;

        tracing::debug!("Output stream started");
        Ok(Self {
            transport,
            device_name,
            _stream: stream,
        })
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    transport: &Arc<SharedTransport>,
    samples: SampleBuffer,
    channels: usize,
    step: f64,
) -> Result<cpal::Stream>
where
    T: SizedSample + cpal::FromSample<f32>,
{
    let transport = Arc::clone(transport);
    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            transport.render(samples.as_slice(), data, channels, step);
        },
        |err| {
            tracing::error!("Audio stream error: {}", err);
        },
        None,
    )?;
    Ok(stream)
}

impl AudioPlayer for CpalPlayer {
    fn play(&mut self) -> Result<()> {
        if self.transport.reached_end() {
            self.transport.seek_to(0.0);
        }
        self.transport.set_playing(true);
        tracing::debug!("Playback started at {:.2}s", self.transport.current_time());
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        self.transport.set_playing(false);
        tracing::debug!("Playback paused at {:.2}s", self.transport.current_time());
        Ok(())
    }

    fn seek(&mut self, seconds: f64) {
        self.transport.seek_to(seconds);
    }

    fn timeline(&self) -> Arc<dyn Timeline> {
        self.transport.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paused_transport_renders_silence() {
        let transport = SharedTransport::new(4, 4);
        let mut out = [1.0f32; 4];
        transport.render(&[0.5, 0.5, 0.5, 0.5], &mut out, 2, 1.0);
        assert_eq!(out, [0.0; 4]);
        assert_eq!(transport.current_time(), 0.0);
    }

    #[test]
    fn test_render_duplicates_into_channels_and_advances() {
        let transport = SharedTransport::new(4, 4);
        transport.set_playing(true);
        let mut out = [0.0f32; 4];
        transport.render(&[0.1, 0.2, 0.3, 0.4], &mut out, 2, 1.0);
        assert_eq!(out, [0.1, 0.1, 0.2, 0.2]);
        assert_eq!(transport.current_time(), 0.5);
        assert!(!transport.reached_end());
    }

    #[test]
    fn test_render_steps_for_rate_mismatch() {
        let transport = SharedTransport::new(4, 4);
        transport.set_playing(true);
        let mut out = [0.0f32; 2];
        transport.render(&[0.1, 0.2, 0.3, 0.4], &mut out, 1, 2.0);
        assert_eq!(out, [0.1, 0.3]);
        assert_eq!(transport.current_time(), 1.0);
    }

    #[test]
    fn test_running_off_the_end_marks_finished() {
        let transport = SharedTransport::new(2, 2);
        transport.set_playing(true);
        let mut out = [9.0f32; 4];
        transport.render(&[0.1, 0.2], &mut out, 1, 1.0);
        assert_eq!(out, [0.1, 0.2, 0.0, 0.0]);
        assert!(transport.reached_end());
        assert!(!transport.is_playing());
        assert_eq!(transport.current_time(), transport.duration());
    }

    #[test]
    fn test_seek_clamps_and_clears_end_flag() {
        let transport = SharedTransport::new(10, 10);
        transport.finished.store(true, Ordering::Release);
        transport.seek_to(5.0);
        assert_eq!(transport.current_time(), 1.0);
        assert!(!transport.reached_end());
        transport.seek_to(-3.0);
        assert_eq!(transport.current_time(), 0.0);
        transport.seek_to(f64::NAN);
        assert_eq!(transport.current_time(), 0.0);
        transport.seek_to(0.25);
        assert_eq!(transport.current_time(), 0.25);
    }
}
