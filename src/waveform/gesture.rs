//! Pointer input to seek / pan intents.
//!
//! Linear mode: dragging shows a seek cursor, releasing seeks there, a tap
//! seeks and starts playback. Scroll mode: dragging pans the zoom window by a
//! signed number of samples (pausing playback while the pointer is down) and
//! releasing seeks by the panned amount.

use super::window::{ViewMode, WindowController};

/// Pointer travel (in view units) before a press counts as a drag.
pub const MIN_DRAG_DISTANCE: f32 = 1.0;

/// Transient pointer state, owned by the window controller.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    /// Linear-mode drag with the seek cursor under the pointer
    Seeking { pointer_x: f32 },
    /// Scroll-mode pan
    ScrollDragging {
        offset_samples: i64,
        /// Pan happens inside the pre-roll region
        is_near_start: bool,
        /// Live pointer position, used as the playhead near track start
        drag_pointer_x: f32,
    },
}

/// Command produced by a gesture, applied by the widget to the playback clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureIntent {
    Seek(f64),
    Pause,
    Resume,
    Play,
}

/// Playback facts a gesture needs at the moment it is handled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackSnapshot {
    pub is_playing: bool,
    /// Last time reported by the clock
    pub current_time: f64,
    pub duration: f64,
    /// `None` while no player is bound
    pub sample_rate: Option<u32>,
}

impl PlaybackSnapshot {
    fn can_seek(&self) -> bool {
        self.sample_rate.is_some_and(|rate| rate > 0)
    }

    fn clamp_time(&self, seconds: f64) -> f64 {
        let duration = if self.duration.is_finite() {
            self.duration.max(0.0)
        } else {
            0.0
        };
        if seconds.is_finite() {
            seconds.clamp(0.0, duration)
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Press {
    origin_x: f32,
    dragging: bool,
}

/// Turns raw pointer events into gesture state and playback intents.
#[derive(Debug, Default)]
pub struct GestureCoordinator {
    press: Option<Press>,
    /// Playback was running when the current scroll drag started
    resume_after_drag: bool,
}

impl GestureCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.press.is_some()
    }

    pub fn pointer_down(&mut self, x: f32) {
        self.press = Some(Press {
            origin_x: x,
            dragging: false,
        });
        self.resume_after_drag = false;
    }

    /// Handles pointer motion while pressed.
    pub fn pointer_moved(
        &mut self,
        x: f32,
        window: &mut WindowController,
        playback: &PlaybackSnapshot,
    ) -> Vec<GestureIntent> {
        let Some(mut press) = self.press else {
            return Vec::new();
        };

        let translation = x - press.origin_x;
        if !press.dragging && translation.abs() < MIN_DRAG_DISTANCE {
            return Vec::new();
        }

        let mut intents = Vec::new();
        let starting = !press.dragging;
        press.dragging = true;
        self.press = Some(press);

        match window.mode() {
            ViewMode::Linear => {
                window.set_gesture(GestureState::Seeking { pointer_x: x });
            }
            ViewMode::Scroll => {
                if starting && playback.is_playing {
                    self.resume_after_drag = true;
                    intents.push(GestureIntent::Pause);
                }
                self.update_scroll_drag(x, translation, window);
            }
        }
        intents
    }

    /// Handles release, finishing either a drag or a tap.
    pub fn pointer_up(
        &mut self,
        x: f32,
        window: &mut WindowController,
        playback: &PlaybackSnapshot,
    ) -> Vec<GestureIntent> {
        let Some(press) = self.press.take() else {
            return Vec::new();
        };

        let translation = x - press.origin_x;
        let dragging = press.dragging || translation.abs() >= MIN_DRAG_DISTANCE;

        let intents = match (window.mode(), dragging) {
            (ViewMode::Linear, true) => {
                window.clear_gesture();
                self.linear_seek(x, window, playback).into_iter().collect()
            }
            (ViewMode::Linear, false) => self.tap(x, window, playback),
            (ViewMode::Scroll, true) => self.finish_scroll_drag(x, translation, window, playback),
            (ViewMode::Scroll, false) => Vec::new(),
        };

        window.clear_gesture();
        self.resume_after_drag = false;
        intents
    }

    /// Abandons any gesture in flight (e.g. on a mode switch). A drag pause
    /// is undone only while playback is still wanted.
    pub fn cancel(
        &mut self,
        window: &mut WindowController,
        playback: &PlaybackSnapshot,
    ) -> Vec<GestureIntent> {
        self.press = None;
        window.clear_gesture();
        if std::mem::take(&mut self.resume_after_drag) && playback.is_playing {
            vec![GestureIntent::Resume]
        } else {
            Vec::new()
        }
    }

    fn update_scroll_drag(&mut self, x: f32, translation: f32, window: &mut WindowController) {
        let offset = scroll_offset(translation, window);
        let is_near_start = window.is_in_pre_roll_with(offset);
        let drag_pointer_x = match window.gesture() {
            GestureState::ScrollDragging { drag_pointer_x, .. } if !is_near_start => {
                *drag_pointer_x
            }
            _ => x,
        };
        window.set_gesture(GestureState::ScrollDragging {
            offset_samples: offset,
            is_near_start,
            drag_pointer_x,
        });
    }

    fn finish_scroll_drag(
        &mut self,
        x: f32,
        translation: f32,
        window: &mut WindowController,
        playback: &PlaybackSnapshot,
    ) -> Vec<GestureIntent> {
        self.update_scroll_drag(x, translation, window);
        let offset = window.drag_offset();
        window.reset_drag_offset();

        let mut intents = Vec::new();
        match playback.sample_rate.filter(|rate| *rate > 0) {
            Some(rate) => {
                // Player time has centisecond resolution.
                let offset_seconds = (offset as f64 / rate as f64 * 100.0).trunc() / 100.0;
                let target = playback.clamp_time(playback.current_time + offset_seconds);
                tracing::debug!(
                    "Scroll drag released: {} samples ({:.2}s), seeking to {:.2}s",
                    offset,
                    offset_seconds,
                    target
                );
                intents.push(GestureIntent::Seek(target));
            }
            None => tracing::debug!("Scroll drag released without a bound player"),
        }

        // Paused or stopped mid-drag: stay paused.
        if self.resume_after_drag && playback.is_playing {
            intents.push(GestureIntent::Resume);
        }
        intents
    }

    fn linear_seek(
        &self,
        x: f32,
        window: &WindowController,
        playback: &PlaybackSnapshot,
    ) -> Option<GestureIntent> {
        if !playback.can_seek() {
            tracing::debug!("Seek ignored: no player bound");
            return None;
        }
        let width = window.geometry().width;
        if width <= 0.0 {
            return None;
        }
        let seek_time = playback.clamp_time((x / width) as f64 * playback.duration);
        tracing::debug!("Seeking to {:.2}s", seek_time);
        Some(GestureIntent::Seek(seek_time))
    }

    fn tap(
        &self,
        x: f32,
        window: &WindowController,
        playback: &PlaybackSnapshot,
    ) -> Vec<GestureIntent> {
        let mut intents: Vec<GestureIntent> =
            self.linear_seek(x, window, playback).into_iter().collect();
        if !intents.is_empty() && !playback.is_playing {
            intents.push(GestureIntent::Play);
        }
        intents
    }
}

/// Converts a horizontal drag distance into a signed sample offset.
fn scroll_offset(translation: f32, window: &WindowController) -> i64 {
    let width = window.geometry().width;
    if width <= 0.0 || !translation.is_finite() {
        return 0;
    }
    ((translation / width) as f64 * window.window_length() as f64) as i64
}
