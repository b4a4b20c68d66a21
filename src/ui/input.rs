//! Keyboard and mouse routing for the player screen.

use super::render::{hit_test, TransportAction, TransportButton};
use crate::waveform::WaveformWidget;
use crossterm::event::{
    KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Rect;

/// What the event loop should do after an input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCommand {
    Continue,
    Quit,
}

/// Applies a key press to the widget.
pub fn handle_key(widget: &mut WaveformWidget, key: KeyEvent) -> PlayerCommand {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => {
            tracing::debug!("Escape or 'q' pressed: leaving player");
            PlayerCommand::Quit
        }
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            tracing::debug!("Ctrl+C pressed: leaving player");
            PlayerCommand::Quit
        }
        KeyCode::Char(' ') => {
            widget.toggle_playback();
            PlayerCommand::Continue
        }
        KeyCode::Char('s') => {
            widget.stop();
            PlayerCommand::Continue
        }
        KeyCode::Char('m') if widget.options().show_mode_toggle => {
            widget.toggle_mode();
            PlayerCommand::Continue
        }
        _ => PlayerCommand::Continue,
    }
}

pub fn apply_transport(widget: &mut WaveformWidget, action: TransportAction) {
    tracing::debug!("Transport button: {:?}", action);
    match action {
        TransportAction::TogglePlayback => widget.toggle_playback(),
        TransportAction::Stop => widget.stop(),
        TransportAction::ToggleMode => {
            widget.toggle_mode();
        }
    }
}

/// Turns terminal mouse events into widget pointer events.
///
/// A press inside the waveform area starts a pointer gesture; drags and the
/// release are forwarded even when they leave the area so a gesture always
/// ends. Presses on the transport line hit the buttons.
#[derive(Debug, Default)]
pub struct PointerRouter {
    pressed: bool,
}

impl PointerRouter {
    pub fn handle_mouse(
        &mut self,
        widget: &mut WaveformWidget,
        waveform_area: Rect,
        buttons: &[TransportButton],
        mouse: MouseEvent,
    ) {
        let x = mouse.column as f32 - waveform_area.x as f32;
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if contains(waveform_area, mouse.column, mouse.row) {
                    self.pressed = true;
                    widget.pointer_down(x);
                } else if let Some(action) = hit_test(buttons, mouse.column, mouse.row) {
                    apply_transport(widget, action);
                }
            }
            MouseEventKind::Drag(MouseButton::Left) if self.pressed => {
                widget.pointer_moved(x);
            }
            MouseEventKind::Up(MouseButton::Left) if self.pressed => {
                self.pressed = false;
                widget.pointer_up(x);
            }
            _ => {}
        }
    }
}

fn contains(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x
        && column < area.x.saturating_add(area.width)
        && row >= area.y
        && row < area.y.saturating_add(area.height)
}
