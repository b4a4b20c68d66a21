//! The waveform widget: sample buffer, window, gestures and clock in one place.
//!
//! A host feeds the widget layout sizes, pointer events and clock events, and
//! reads back a [`WindowFrame`] plus labels to draw. Nothing here depends on a
//! particular rendering backend.

use super::buffer::SampleBuffer;
use super::clock::{format_clock, ClockEvent, PlaybackClock, PlayerHandle, DEFAULT_TICK_INTERVAL};
use super::gesture::{GestureCoordinator, GestureIntent, PlaybackSnapshot};
use super::window::{
    SeekCursor, ViewGeometry, ViewMode, ViewRange, WindowController, WindowFrame,
    ZOOM_WINDOW_SAMPLES,
};
use std::time::Duration;

/// Construction-time behaviour of the widget.
#[derive(Debug, Clone)]
pub struct WidgetOptions {
    pub initial_mode: ViewMode,
    pub show_transport_controls: bool,
    pub show_mode_toggle: bool,
    pub view_range: ViewRange,
    pub zoom_window_samples: usize,
    pub tick_interval: Duration,
}

impl Default for WidgetOptions {
    fn default() -> Self {
        Self {
            initial_mode: ViewMode::Linear,
            show_transport_controls: true,
            show_mode_toggle: true,
            view_range: ViewRange::FULL,
            zoom_window_samples: ZOOM_WINDOW_SAMPLES,
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }
}

/// Interactive waveform bound to one track.
pub struct WaveformWidget {
    samples: SampleBuffer,
    window: WindowController,
    gestures: GestureCoordinator,
    clock: PlaybackClock,
    is_playing: bool,
    options: WidgetOptions,
}

impl WaveformWidget {
    pub fn new(samples: SampleBuffer, handle: PlayerHandle, options: WidgetOptions) -> Self {
        let window = WindowController::new(samples.len(), options.initial_mode)
            .with_range(options.view_range)
            .with_zoom_window(options.zoom_window_samples);
        let clock = PlaybackClock::new(handle);

        tracing::debug!(
            "Waveform widget created: {} samples, mode={}, player={:?}",
            samples.len(),
            options.initial_mode,
            clock.handle()
        );

        let mut widget = Self {
            samples,
            window,
            gestures: GestureCoordinator::new(),
            clock,
            is_playing: false,
            options,
        };
        widget.sync_progress();
        widget
    }

    /// Registers the periodic clock tick. The registration lives as long as
    /// the widget (or until [`Self::detach`]).
    pub fn attach(&mut self) {
        if self.clock.is_subscribed() {
            return;
        }
        self.clock.subscribe(self.options.tick_interval);
    }

    pub fn detach(&mut self) {
        self.clock.unsubscribe();
    }

    pub fn samples(&self) -> &SampleBuffer {
        &self.samples
    }

    pub fn options(&self) -> &WidgetOptions {
        &self.options
    }

    pub fn mode(&self) -> ViewMode {
        self.window.mode()
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn is_bound(&self) -> bool {
        self.clock.handle().is_bound()
    }

    pub fn frame(&self) -> WindowFrame {
        self.window.window_frame()
    }

    pub fn seek_cursor(&self) -> Option<SeekCursor> {
        self.window.seek_cursor()
    }

    pub fn current_time_label(&self) -> String {
        format_clock(self.clock.current_time())
    }

    pub fn duration_label(&self) -> String {
        format_clock(self.clock.duration())
    }

    /// Records the render surface size from the latest layout pass.
    pub fn layout(&mut self, width: f32, height: f32) {
        self.window.set_geometry(ViewGeometry::new(width, height));
    }

    pub fn on_tick(&mut self, current_time: f64, duration: f64) {
        self.clock.apply_tick(current_time, duration);
        self.sync_progress();
    }

    /// Playback ran off the end: behave like the stop button.
    pub fn on_end_of_media(&mut self) {
        tracing::info!("End of media reached");
        self.stop();
    }

    /// Applies queued clock events. Returns true when any were applied.
    pub fn pump_clock(&mut self) -> bool {
        let events = self.clock.drain_events();
        let changed = !events.is_empty();
        for event in events {
            match event {
                ClockEvent::Tick {
                    current_time,
                    duration,
                } => self.on_tick(current_time, duration),
                ClockEvent::EndOfMedia => self.on_end_of_media(),
            }
        }
        changed
    }

    pub fn play(&mut self) {
        if self.clock.play() {
            self.is_playing = true;
        }
        self.window.reset_drag_offset();
    }

    pub fn pause(&mut self) {
        self.clock.pause();
        self.is_playing = false;
    }

    pub fn toggle_playback(&mut self) {
        if self.is_playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Pauses, rewinds and resets the playhead to the start, abandoning any
    /// drag in flight.
    pub fn stop(&mut self) {
        self.is_playing = false;
        if self.gestures.is_active() {
            self.cancel_gesture();
        }
        self.clock.stop();
        self.sync_progress();
    }

    /// Flips between linear and scroll mode, abandoning any gesture in flight.
    pub fn toggle_mode(&mut self) -> ViewMode {
        self.cancel_gesture();
        let mode = self.window.toggle_mode();
        tracing::info!("View mode switched to {}", mode);
        mode
    }

    pub fn pointer_down(&mut self, x: f32) {
        self.gestures.pointer_down(x);
    }

    pub fn pointer_moved(&mut self, x: f32) {
        let snapshot = self.snapshot();
        let intents = self.gestures.pointer_moved(x, &mut self.window, &snapshot);
        self.apply_intents(intents);
    }

    pub fn pointer_up(&mut self, x: f32) {
        let snapshot = self.snapshot();
        let intents = self.gestures.pointer_up(x, &mut self.window, &snapshot);
        self.apply_intents(intents);
    }

    fn cancel_gesture(&mut self) {
        let snapshot = self.snapshot();
        let intents = self.gestures.cancel(&mut self.window, &snapshot);
        self.apply_intents(intents);
    }

    fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            is_playing: self.is_playing,
            current_time: self.clock.current_time(),
            duration: self.clock.duration(),
            sample_rate: self.clock.sample_rate(),
        }
    }

    fn apply_intents(&mut self, intents: Vec<GestureIntent>) {
        for intent in intents {
            match intent {
                GestureIntent::Seek(seconds) => {
                    self.clock.seek(seconds);
                    self.sync_progress();
                }
                // Drag pauses leave `is_playing` set so release can resume.
                GestureIntent::Pause => {
                    self.clock.pause();
                }
                GestureIntent::Resume => {
                    self.clock.play();
                }
                GestureIntent::Play => self.play(),
            }
        }
    }

    fn sync_progress(&mut self) {
        self.window.set_progress(self.clock.progress());
    }
}
