//! Visible sample window and playhead placement.
//!
//! The controller maps playback progress onto the slice of the sample buffer
//! that is drawn and onto view coordinates. Linear mode shows a fixed fraction
//! of the track across the whole width. Scroll mode shows a fixed number of
//! samples centered on the playhead, except near the start of the track where
//! centering would need samples before zero; there the playhead slides instead
//! of the waveform.

use super::gesture::GestureState;
use serde::{Deserialize, Serialize};

/// Samples shown by one scroll-mode window (the fixed zoom level).
pub const ZOOM_WINDOW_SAMPLES: usize = 159_157;

/// Display mode of the waveform.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Whole-track view scaled to the view width
    #[default]
    Linear,
    /// Fixed zoom window following the playhead
    Scroll,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Linear => Self::Scroll,
            Self::Scroll => Self::Linear,
        }
    }

    /// Label of the button that switches *to* the other mode.
    pub fn toggle_label(self) -> &'static str {
        match self {
            Self::Linear => "Scroll",
            Self::Scroll => "Linear",
        }
    }
}

impl std::fmt::Display for ViewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Linear => write!(f, "linear"),
            Self::Scroll => write!(f, "scroll"),
        }
    }
}

/// Size of the render surface. Pixel computations are relative to `width`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewGeometry {
    pub width: f32,
    pub height: f32,
}

impl ViewGeometry {
    /// Creates a geometry, treating non-finite or negative sizes as zero.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: sanitize_extent(width),
            height: sanitize_extent(height),
        }
    }
}

fn sanitize_extent(value: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Linear-mode view range as fractions of the whole track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewRange {
    pub start: f64,
    pub length: f64,
}

impl ViewRange {
    pub const FULL: ViewRange = ViewRange {
        start: 0.0,
        length: 1.0,
    };

    /// Builds a range, falling back to the full track for values that break
    /// the `length > 0` contract. Lengths beyond the whole track are capped
    /// at 1.
    pub fn new(start: f64, length: f64) -> Self {
        let start = if start.is_finite() {
            start.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let length = if length.is_finite() && length > 0.0 {
            if length > 1.0 {
                tracing::warn!("View length {length} exceeds the track, capping at 1");
            }
            length.min(1.0)
        } else {
            tracing::warn!("Invalid view length {length}, using the full track");
            1.0
        };
        Self { start, length }
    }
}

impl Default for ViewRange {
    fn default() -> Self {
        Self::FULL
    }
}

/// Result of one window computation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WindowFrame {
    /// First sample to draw, never negative
    pub start: usize,
    /// Number of samples to draw; may run past the end of the buffer
    pub length: usize,
    /// Window start before clamping (negative during scroll pre-roll)
    pub raw_start: i64,
    /// Playhead position in view coordinates
    pub playhead_x: f32,
    /// Width of the "played" mask from the left edge
    pub progress_width: f32,
    /// Scroll mode with the playhead fixed at the view center
    pub pinned: bool,
}

/// Linear-mode seek cursor while the pointer is held down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeekCursor {
    pub x: f32,
    /// Highlighted span between the playhead and the cursor
    pub band_start: f32,
    pub band_width: f32,
}

/// Computes the visible window and playhead for the active mode.
#[derive(Debug, Clone)]
pub struct WindowController {
    mode: ViewMode,
    range: ViewRange,
    zoom_window_samples: usize,
    sample_count: usize,
    progress: f64,
    geometry: ViewGeometry,
    gesture: GestureState,
}

impl WindowController {
    pub fn new(sample_count: usize, mode: ViewMode) -> Self {
        Self {
            mode,
            range: ViewRange::FULL,
            zoom_window_samples: ZOOM_WINDOW_SAMPLES,
            sample_count,
            progress: 0.0,
            geometry: ViewGeometry::default(),
            gesture: GestureState::Idle,
        }
    }

    pub fn with_range(mut self, range: ViewRange) -> Self {
        self.range = range;
        self
    }

    pub fn with_zoom_window(mut self, samples: usize) -> Self {
        if samples == 0 {
            tracing::warn!("Zoom window of 0 samples requested, keeping {ZOOM_WINDOW_SAMPLES}");
            self.zoom_window_samples = ZOOM_WINDOW_SAMPLES;
        } else {
            self.zoom_window_samples = samples;
        }
        self
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    /// Switches mode. Any gesture in flight and its pan offset are dropped.
    pub fn set_mode(&mut self, mode: ViewMode) {
        if self.mode != mode {
            tracing::debug!("View mode {} -> {}", self.mode, mode);
        }
        self.mode = mode;
        self.gesture = GestureState::Idle;
    }

    pub fn toggle_mode(&mut self) -> ViewMode {
        self.set_mode(self.mode.toggled());
        self.mode
    }

    /// Stores the latest playback progress. NaN and infinities count as 0.
    pub fn set_progress(&mut self, progress: f64) {
        self.progress = if progress.is_finite() {
            progress.clamp(0.0, 1.0)
        } else {
            0.0
        };
    }

    pub fn geometry(&self) -> ViewGeometry {
        self.geometry
    }

    pub fn set_geometry(&mut self, geometry: ViewGeometry) {
        self.geometry = ViewGeometry::new(geometry.width, geometry.height);
    }

    pub fn gesture(&self) -> &GestureState {
        &self.gesture
    }

    pub fn set_gesture(&mut self, gesture: GestureState) {
        self.gesture = gesture;
    }

    pub fn clear_gesture(&mut self) {
        self.gesture = GestureState::Idle;
    }

    /// Current scroll pan offset in samples (0 unless scroll-dragging).
    pub fn drag_offset(&self) -> i64 {
        match self.gesture {
            GestureState::ScrollDragging { offset_samples, .. } => offset_samples,
            _ => 0,
        }
    }

    /// Drops the pan offset while keeping the rest of the drag state.
    pub fn reset_drag_offset(&mut self) {
        if let GestureState::ScrollDragging { offset_samples, .. } = &mut self.gesture {
            *offset_samples = 0;
        }
    }

    pub fn window_length(&self) -> usize {
        match self.mode {
            ViewMode::Scroll => self.zoom_window_samples,
            ViewMode::Linear => (self.range.length * self.sample_count as f64).floor() as usize,
        }
    }

    /// Scroll-window scale: how many windows fit in the track.
    fn windows_per_track(&self) -> f64 {
        self.sample_count as f64 / self.zoom_window_samples as f64
    }

    /// Playhead position in samples, computed through the window-relative
    /// scale and truncated once at the end.
    pub fn raw_center(&self) -> i64 {
        let window = self.zoom_window_samples as f64;
        (self.windows_per_track() * self.progress * window) as i64
    }

    pub fn pre_roll_samples(&self) -> i64 {
        (self.zoom_window_samples / 2) as i64
    }

    /// True when a scroll window with `offset` pan could not be centered on
    /// the playhead without reaching before the first sample.
    pub fn is_in_pre_roll_with(&self, offset: i64) -> bool {
        self.mode == ViewMode::Scroll
            && self.raw_center().saturating_add(offset) < self.pre_roll_samples()
    }

    pub fn is_in_pre_roll(&self) -> bool {
        self.is_in_pre_roll_with(self.drag_offset())
    }

    /// Computes window bounds and playhead for the current state.
    pub fn window_frame(&self) -> WindowFrame {
        if self.sample_count == 0 {
            return WindowFrame::default();
        }
        match self.mode {
            ViewMode::Linear => self.linear_frame(),
            ViewMode::Scroll => self.scroll_frame(),
        }
    }

    fn linear_frame(&self) -> WindowFrame {
        let last_index = self.sample_count.saturating_sub(1) as f64;
        let start = (self.range.start * last_index).floor().max(0.0) as usize;
        let playhead_x = (self.progress * self.geometry.width as f64) as f32;

        WindowFrame {
            start,
            length: self.window_length(),
            raw_start: start as i64,
            playhead_x,
            progress_width: playhead_x,
            pinned: false,
        }
    }

    fn scroll_frame(&self) -> WindowFrame {
        let length = self.zoom_window_samples;
        let offset = self.drag_offset();
        let raw_start = self.raw_center() - (length / 2) as i64 + offset;
        let start = raw_start.max(0) as usize;
        let width = self.geometry.width;

        if !self.is_in_pre_roll() {
            let center = width / 2.0;
            return WindowFrame {
                start,
                length,
                raw_start,
                playhead_x: center,
                progress_width: center,
                pinned: true,
            };
        }

        let scaled = self.windows_per_track() * self.progress * width as f64;
        let playhead_x = match self.gesture {
            GestureState::ScrollDragging {
                is_near_start: true,
                drag_pointer_x,
                ..
            } => drag_pointer_x,
            _ => clamp_to_width((scaled + offset as f64) as f32, width),
        };

        WindowFrame {
            start,
            length,
            raw_start,
            playhead_x,
            progress_width: clamp_to_width(scaled as f32, width),
            pinned: false,
        }
    }

    /// Seek cursor and highlight band, present only while seeking in linear mode.
    pub fn seek_cursor(&self) -> Option<SeekCursor> {
        if self.mode != ViewMode::Linear {
            return None;
        }
        let GestureState::Seeking { pointer_x } = self.gesture else {
            return None;
        };
        let x = clamp_to_width(pointer_x, self.geometry.width);
        let playhead_x = self.window_frame().playhead_x;
        Some(SeekCursor {
            x,
            band_start: playhead_x,
            band_width: (x - playhead_x).max(0.0),
        })
    }
}

fn clamp_to_width(x: f32, width: f32) -> f32 {
    if x.is_finite() {
        x.clamp(0.0, width.max(0.0))
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller(sample_count: usize, mode: ViewMode, width: f32) -> WindowController {
        let mut controller = WindowController::new(sample_count, mode);
        controller.set_geometry(ViewGeometry::new(width, 20.0));
        controller
    }

    #[test]
    fn test_linear_half_progress_lands_mid_view() {
        let mut c = controller(1000, ViewMode::Linear, 200.0);
        c.set_progress(0.5);
        let frame = c.window_frame();
        assert_eq!(frame.playhead_x, 100.0);
        assert_eq!(frame.progress_width, 100.0);
        assert_eq!(frame.start, 0);
        assert_eq!(frame.length, 1000);
    }

    #[test]
    fn test_linear_playhead_is_monotonic() {
        let mut c = controller(48_000, ViewMode::Linear, 137.0);
        let mut last = f32::MIN;
        for step in 0..=1000 {
            c.set_progress(step as f64 / 1000.0);
            let x = c.window_frame().playhead_x;
            assert!(x >= last, "playhead moved backwards at step {step}");
            last = x;
        }
        assert_eq!(last, 137.0);
    }

    #[test]
    fn test_linear_partial_range() {
        let c = controller(1001, ViewMode::Linear, 100.0)
            .with_range(ViewRange::new(0.25, 0.5));
        let frame = c.window_frame();
        assert_eq!(frame.start, 250);
        assert_eq!(frame.length, 500);
    }

    #[test]
    fn test_non_finite_progress_is_zero() {
        let mut c = controller(1000, ViewMode::Linear, 200.0);
        c.set_progress(f64::NAN);
        assert_eq!(c.window_frame().playhead_x, 0.0);
        c.set_progress(f64::INFINITY);
        assert_eq!(c.window_frame().playhead_x, 0.0);
    }

    #[test]
    fn test_window_start_never_negative() {
        for sample_count in [0usize, 1, 2, 1000, 159_157, 1_000_000] {
            for mode in [ViewMode::Linear, ViewMode::Scroll] {
                let mut c = controller(sample_count, mode, 80.0);
                for step in 0..=20 {
                    c.set_progress(step as f64 / 20.0);
                    for offset in [-500_000i64, -10, 0, 10, 500_000] {
                        c.set_gesture(GestureState::ScrollDragging {
                            offset_samples: offset,
                            is_near_start: false,
                            drag_pointer_x: 0.0,
                        });
                        let frame = c.window_frame();
                        assert_eq!(frame.start as i64, frame.raw_start.max(0));
                        assert!((0.0..=80.0).contains(&frame.playhead_x));
                    }
                }
            }
        }
    }

    #[test]
    fn test_empty_buffer_is_all_zero() {
        for mode in [ViewMode::Linear, ViewMode::Scroll] {
            let mut c = controller(0, mode, 200.0);
            c.set_progress(0.7);
            assert_eq!(c.window_frame(), WindowFrame::default());
        }
    }

    #[test]
    fn test_zero_width_gives_zero_positions() {
        for mode in [ViewMode::Linear, ViewMode::Scroll] {
            let mut c = controller(1_000_000, mode, 0.0);
            c.set_progress(0.6);
            let frame = c.window_frame();
            assert_eq!(frame.playhead_x, 0.0);
            assert_eq!(frame.progress_width, 0.0);
        }
    }

    #[test]
    fn test_scroll_pre_roll_clamps_start_and_slides_playhead() {
        let mut c = controller(1_000_000, ViewMode::Scroll, 400.0);
        c.set_progress(0.0001);
        // window-relative scaling may land a hair under 100 before truncation
        assert!((99..=100).contains(&c.raw_center()));
        assert!(c.is_in_pre_roll());

        let frame = c.window_frame();
        assert!(frame.raw_start < 0);
        assert_eq!(frame.start, 0);
        assert_eq!(frame.length, ZOOM_WINDOW_SAMPLES);
        assert!(!frame.pinned);

        let expected = (1_000_000.0 / ZOOM_WINDOW_SAMPLES as f64 * 0.0001 * 400.0) as f32;
        assert_eq!(frame.playhead_x, expected);
        assert_eq!(frame.progress_width, expected);
        assert!(frame.playhead_x < 200.0);
    }

    #[test]
    fn test_pre_roll_playhead_includes_pan_offset() {
        let mut c = controller(1_000_000, ViewMode::Scroll, 400.0);
        c.set_progress(0.0001);
        c.set_gesture(GestureState::ScrollDragging {
            offset_samples: 10,
            is_near_start: false,
            drag_pointer_x: 0.0,
        });
        assert!(c.is_in_pre_roll());

        let scaled = 1_000_000.0 / ZOOM_WINDOW_SAMPLES as f64 * 0.0001 * 400.0;
        let frame = c.window_frame();
        assert_eq!(frame.playhead_x, (scaled + 10.0) as f32);
        // the played mask ignores the pan
        assert_eq!(frame.progress_width, scaled as f32);

        c.set_gesture(GestureState::ScrollDragging {
            offset_samples: -50,
            is_near_start: false,
            drag_pointer_x: 0.0,
        });
        assert_eq!(c.window_frame().playhead_x, 0.0);
    }

    #[test]
    fn test_scroll_pins_playhead_past_pre_roll() {
        let mut c = controller(1_000_000, ViewMode::Scroll, 321.0);
        for progress in [0.2, 0.5, 0.9, 1.0] {
            c.set_progress(progress);
            let frame = c.window_frame();
            assert!(frame.pinned);
            assert_eq!(frame.playhead_x, 160.5);
            assert_eq!(frame.progress_width, 160.5);
            assert_eq!(
                frame.raw_start,
                c.raw_center() - (ZOOM_WINDOW_SAMPLES / 2) as i64
            );
        }
    }

    #[test]
    fn test_scroll_drag_near_start_follows_pointer() {
        let mut c = controller(1_000_000, ViewMode::Scroll, 400.0);
        c.set_progress(0.01);
        c.set_gesture(GestureState::ScrollDragging {
            offset_samples: -5000,
            is_near_start: true,
            drag_pointer_x: 42.0,
        });
        assert!(c.is_in_pre_roll());
        assert_eq!(c.window_frame().playhead_x, 42.0);
    }

    #[test]
    fn test_drag_offset_shifts_scroll_window() {
        let mut c = controller(1_000_000, ViewMode::Scroll, 400.0);
        c.set_progress(0.5);
        let base = c.window_frame().start;
        c.set_gesture(GestureState::ScrollDragging {
            offset_samples: 1234,
            is_near_start: false,
            drag_pointer_x: 0.0,
        });
        assert_eq!(c.window_frame().start, base + 1234);
        c.reset_drag_offset();
        assert_eq!(c.window_frame().start, base);
    }

    #[test]
    fn test_mode_switch_resets_gesture() {
        let mut c = controller(1_000_000, ViewMode::Scroll, 400.0);
        c.set_gesture(GestureState::ScrollDragging {
            offset_samples: 99,
            is_near_start: false,
            drag_pointer_x: 3.0,
        });
        assert_eq!(c.toggle_mode(), ViewMode::Linear);
        assert_eq!(c.gesture(), &GestureState::Idle);
        assert_eq!(c.drag_offset(), 0);
        assert_eq!(c.toggle_mode(), ViewMode::Scroll);
        assert_eq!(c.gesture(), &GestureState::Idle);
        assert_eq!(c.drag_offset(), 0);
    }

    #[test]
    fn test_seek_cursor_band_spans_from_playhead() {
        let mut c = controller(1000, ViewMode::Linear, 100.0);
        assert!(c.seek_cursor().is_none());
        c.set_progress(0.25);
        c.set_gesture(GestureState::Seeking { pointer_x: 60.0 });
        let cursor = c.seek_cursor().expect("cursor while seeking");
        assert_eq!(cursor.x, 60.0);
        assert_eq!(cursor.band_start, 25.0);
        assert_eq!(cursor.band_width, 35.0);

        c.set_gesture(GestureState::Seeking { pointer_x: 10.0 });
        assert_eq!(c.seek_cursor().map(|s| s.band_width), Some(0.0));
    }

    #[test]
    fn test_invalid_range_falls_back_to_full_track() {
        assert_eq!(ViewRange::new(0.0, 0.0), ViewRange::FULL);
        assert_eq!(ViewRange::new(f64::NAN, f64::NAN), ViewRange::FULL);
    }

    #[test]
    fn test_oversized_range_is_capped_to_track() {
        assert_eq!(ViewRange::new(0.0, 1e15), ViewRange::FULL);
        assert_eq!(ViewRange::new(0.5, 3.0).length, 1.0);

        let c = controller(1000, ViewMode::Linear, 80.0).with_range(ViewRange::new(0.0, 1e15));
        assert_eq!(c.window_frame().length, 1000);
    }
}
