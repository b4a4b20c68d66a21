//! Waveform widget core.
//!
//! Backend-independent state for an interactive waveform bound to a player:
//!
//! - `buffer`: immutable single-channel samples
//! - `window`: visible sample window and playhead placement per view mode
//! - `gesture`: pointer input to seek / pan intents
//! - `clock`: player wrapper, progress and periodic ticks
//! - `widget`: composition of the above that a host drives

pub mod buffer;
pub mod clock;
pub mod gesture;
pub mod widget;
pub mod window;

pub use buffer::SampleBuffer;
pub use clock::{format_clock, AudioPlayer, PlayerHandle, Timeline, DEFAULT_TICK_INTERVAL};
pub use widget::{WaveformWidget, WidgetOptions};
pub use window::{ViewMode, ViewRange, ZOOM_WINDOW_SAMPLES};
