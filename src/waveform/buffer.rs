//! Immutable single-channel sample storage shared by the widget and renderer.

use std::sync::Arc;

/// Ordered amplitude samples of one audio channel.
///
/// Cloning is cheap: the samples live behind an `Arc` and are never mutated
/// after load.
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    samples: Arc<[f32]>,
}

impl SampleBuffer {
    pub fn new(samples: Vec<f32>) -> Self {
        Self {
            samples: samples.into(),
        }
    }

    /// Single silent sample used when the audio source could not be loaded.
    pub fn placeholder() -> Self {
        Self::new(vec![0.0])
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.samples
    }

    /// Returns the part of `[start, start + length)` that exists in the buffer.
    ///
    /// Windows are allowed to run past the end of the track; the overrun is
    /// clipped here instead of by every caller.
    pub fn window(&self, start: usize, length: usize) -> &[f32] {
        let start = start.min(self.samples.len());
        let end = start.saturating_add(length).min(self.samples.len());
        &self.samples[start..end]
    }
}

impl Default for SampleBuffer {
    fn default() -> Self {
        Self::placeholder()
    }
}
