//! Audio source: reads a WAV file into a single-channel sample buffer.

use crate::waveform::SampleBuffer;
use hound::{SampleFormat, WavReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Why an audio file could not be turned into samples.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("audio file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("could not decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },
    #[error("{} contains no audio samples", .0.display())]
    Empty(PathBuf),
}

/// Decoded track: the first channel plus the format facts the player needs.
#[derive(Debug, Clone)]
pub struct LoadedAudio {
    pub samples: SampleBuffer,
    pub sample_rate: u32,
    /// Channel count of the file (only channel 0 is kept)
    pub channels: u16,
    pub bits_per_sample: u16,
}

impl LoadedAudio {
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Something that can turn an identifier into samples.
pub trait AudioSource {
    fn load_samples(&self, path: &Path) -> Result<LoadedAudio, LoadError>;
}

/// PCM/float WAV reader backed by `hound`.
#[derive(Debug, Default, Clone, Copy)]
pub struct WavSource;

impl AudioSource for WavSource {
    fn load_samples(&self, path: &Path) -> Result<LoadedAudio, LoadError> {
        if !path.exists() {
            return Err(LoadError::NotFound(path.to_path_buf()));
        }

        let decode_error = |source| LoadError::Decode {
            path: path.to_path_buf(),
            source,
        };

        let reader = WavReader::open(path).map_err(decode_error)?;
        let spec = reader.spec();
        let channels = spec.channels.max(1) as usize;

        let samples: Vec<f32> = match spec.sample_format {
            SampleFormat::Float => reader
                .into_samples::<f32>()
                .step_by(channels)
                .collect::<Result<_, _>>()
                .map_err(decode_error)?,
            SampleFormat::Int => {
                let scale = (1i64 << (spec.bits_per_sample.clamp(1, 32) - 1)) as f32;
                reader
                    .into_samples::<i32>()
                    .step_by(channels)
                    .map(|sample| sample.map(|s| s as f32 / scale))
                    .collect::<Result<_, _>>()
                    .map_err(decode_error)?
            }
        };

        if samples.is_empty() {
            return Err(LoadError::Empty(path.to_path_buf()));
        }

        tracing::info!(
            "Loaded {}: {} samples at {}Hz ({} channels, {}-bit {:?})",
            path.display(),
            samples.len(),
            spec.sample_rate,
            spec.channels,
            spec.bits_per_sample,
            spec.sample_format
        );

        Ok(LoadedAudio {
            samples: SampleBuffer::new(samples),
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            bits_per_sample: spec.bits_per_sample,
        })
    }
}
