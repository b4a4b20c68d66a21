//! Audio input and output for the player.
//!
//! `source` decodes files into sample buffers, `player` plays them through
//! cpal, and `device` resolves output devices. [`open_track`] ties the three
//! together and never fails: anything that goes wrong degrades to a widget
//! that still renders.

pub mod device;
pub mod player;
pub mod source;

pub use device::{list_output_devices, OutputDeviceInfo, DEFAULT_DEVICE};
pub use player::CpalPlayer;
pub use source::{AudioSource, LoadedAudio, WavSource};

use crate::waveform::{PlayerHandle, SampleBuffer};
use std::path::Path;

/// Everything the player UI needs for one track.
#[derive(Debug)]
pub struct OpenedTrack {
    pub samples: SampleBuffer,
    pub handle: PlayerHandle,
    /// Human-readable reason when the track or device could not be used
    pub notice: Option<String>,
}

/// Loads `path` and binds it to an output device.
///
/// A load failure yields the placeholder buffer with an unbound player; a
/// device failure keeps the samples but leaves the player unbound.
pub fn open_track(source: &dyn AudioSource, path: &Path, device: &str) -> OpenedTrack {
    let audio = match source.load_samples(path) {
        Ok(audio) => audio,
        Err(e) => {
            tracing::error!("Failed to load track: {}", e);
            return OpenedTrack {
                samples: SampleBuffer::placeholder(),
                handle: PlayerHandle::Unbound,
                notice: Some(e.to_string()),
            };
        }
    };

    match CpalPlayer::open(audio.samples.clone(), audio.sample_rate, device) {
        Ok(player) => {
            tracing::info!(
                "Track bound to {} ({:.2}s)",
                player.device_name(),
                audio.duration_secs()
            );
            OpenedTrack {
                samples: audio.samples,
                handle: PlayerHandle::bound(player, audio.sample_rate),
                notice: None,
            }
        }
        Err(e) => {
            tracing::warn!("Playback unavailable, showing waveform only: {:#}", e);
            OpenedTrack {
                samples: audio.samples,
                handle: PlayerHandle::Unbound,
                notice: Some(format!("Playback unavailable: {e}")),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_track_degrades_to_placeholder() {
        let track = open_track(
            &WavSource,
            Path::new("/no/such/track.wav"),
            DEFAULT_DEVICE,
        );
        assert_eq!(track.samples.len(), 1);
        assert!(!track.handle.is_bound());
        assert!(track
            .notice
            .as_deref()
            .is_some_and(|n| n.contains("not found")));
    }

    #[test]
    fn test_undecodable_track_degrades_to_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.wav");
        std::fs::write(&path, b"RIFF????WAVEjunk").unwrap();

        let track = open_track(&WavSource, &path, DEFAULT_DEVICE);
        assert_eq!(track.samples.as_slice(), &[0.0]);
        assert!(!track.handle.is_bound());
    }
}
