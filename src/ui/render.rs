//! Terminal rendering of the waveform widget.
//!
//! One terminal cell is one view unit: a waveform area `width` cells wide is
//! laid out as a `width`-wide view, so the playhead and seek cursor positions
//! from the window controller map directly onto columns.

use super::theme::Palette;
use crate::waveform::{SampleBuffer, WaveformWidget};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::Span,
    widgets::Widget,
};

const BAR: &str = "█";
const SILENCE: &str = "─";
const LINE: &str = "│";

/// Turns a slice of the sample buffer into something drawable.
pub trait WaveformRenderer {
    /// Reduces `length` samples starting at `start` to one amplitude in
    /// `[0, 1]` per column. A window running past the end of the buffer is
    /// clipped; columns with no samples are 0.
    fn render(&self, samples: &SampleBuffer, start: usize, length: usize, columns: usize)
        -> Vec<f32>;
}

/// Peak-amplitude renderer: each column shows the largest absolute sample
/// in its share of the window.
#[derive(Debug, Default, Clone, Copy)]
pub struct PeakRenderer;

impl WaveformRenderer for PeakRenderer {
    fn render(
        &self,
        samples: &SampleBuffer,
        start: usize,
        length: usize,
        columns: usize,
    ) -> Vec<f32> {
        if samples.is_empty() {
            return vec![0.0; columns];
        }
        let visible = samples.window(start, length);
        let share = |column: usize| -> usize {
            let edge = column as u128 * length as u128 / columns as u128;
            edge.min(visible.len() as u128) as usize
        };
        (0..columns)
            .map(|column| {
                let lo = share(column);
                let hi = share(column + 1).max(lo + 1).min(visible.len());
                let lo = lo.min(hi);
                visible[lo..hi]
                    .iter()
                    .fold(0.0f32, |peak, s| peak.max(s.abs()))
                    .min(1.0)
            })
            .collect()
    }
}

/// What a click on the transport line does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportAction {
    TogglePlayback,
    Stop,
    ToggleMode,
}

/// One clickable button on the transport line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportButton {
    pub action: TransportAction,
    pub area: Rect,
    pub label: String,
}

/// Lays out the transport buttons left to right inside `area`, honouring the
/// widget's `show_transport_controls` and `show_mode_toggle` options.
pub fn transport_buttons(area: Rect, widget: &WaveformWidget) -> Vec<TransportButton> {
    let options = widget.options();
    let mut entries = Vec::new();
    if options.show_transport_controls {
        let play_label = if widget.is_playing() {
            "❚❚ Pause"
        } else {
            "▶ Play"
        };
        entries.push((TransportAction::TogglePlayback, play_label.to_string()));
        entries.push((TransportAction::Stop, "■ Stop".to_string()));
    }
    if options.show_mode_toggle {
        entries.push((
            TransportAction::ToggleMode,
            widget.mode().toggle_label().to_string(),
        ));
    }

    let mut x = area.x;
    let right = area.x.saturating_add(area.width);
    let mut buttons = Vec::new();
    for (action, label) in entries {
        let label = format!("[ {label} ]");
        let width = Span::raw(label.as_str()).width() as u16;
        if x.saturating_add(width) > right {
            break;
        }
        buttons.push(TransportButton {
            action,
            area: Rect::new(x, area.y, width, area.height.min(1)),
            label,
        });
        x = x.saturating_add(width + 2);
    }
    buttons
}

/// Finds the transport button under a terminal cell.
pub fn hit_test(buttons: &[TransportButton], column: u16, row: u16) -> Option<TransportAction> {
    buttons
        .iter()
        .find(|b| {
            row == b.area.y && column >= b.area.x && column < b.area.x + b.area.width
        })
        .map(|b| b.action)
}

/// Renders the transport buttons.
pub fn render_transport(buttons: &[TransportButton], palette: &Palette, buf: &mut Buffer) {
    let style = Style::default().fg(palette.control_tint);
    for button in buttons {
        buf.set_string(button.area.x, button.area.y, &button.label, style);
    }
}

/// Ratatui view of one [`WaveformWidget`]. The widget must have been laid out
/// with the size of the area it is rendered into.
pub struct WaveformView<'a> {
    widget: &'a WaveformWidget,
    palette: &'a Palette,
    renderer: &'a dyn WaveformRenderer,
}

impl<'a> WaveformView<'a> {
    pub fn new(
        widget: &'a WaveformWidget,
        palette: &'a Palette,
        renderer: &'a dyn WaveformRenderer,
    ) -> Self {
        Self {
            widget,
            palette,
            renderer,
        }
    }

    fn draw_bars(&self, area: Rect, buf: &mut Buffer, peaks: &[f32], progress_width: f32) {
        let height = area.height as f32;
        let mid = area.y + area.height / 2;

        for (offset, &peak) in peaks.iter().enumerate() {
            let x = area.x + offset as u16;
            let color = if (offset as f32) < progress_width {
                self.palette.progress_fill
            } else {
                self.palette.background
            };
            let style = Style::default().fg(color);

            let rows = (peak * height).round() as u16;
            if rows == 0 {
                buf.set_string(x, mid, SILENCE, style);
                continue;
            }
            let top = area.y + (area.height - rows.min(area.height)) / 2;
            for y in top..top + rows.min(area.height) {
                buf.set_string(x, y, BAR, style);
            }
        }
    }

    fn draw_vertical_line(area: Rect, buf: &mut Buffer, x: f32, style: Style) {
        let Some(column) = column_at(area, x) else {
            return;
        };
        for y in area.y..area.y + area.height {
            buf.set_string(column, y, LINE, style);
        }
    }

    fn draw_label(area: Rect, buf: &mut Buffer, center_x: f32, text: &str, style: Style) {
        let width = Span::raw(text).width() as u16;
        if width > area.width || area.height == 0 {
            return;
        }
        let half = width as f32 / 2.0;
        let left = (center_x - half).clamp(0.0, (area.width - width) as f32) as u16;
        buf.set_string(area.x + left, area.y + area.height / 2, text, style);
    }
}

fn column_at(area: Rect, x: f32) -> Option<u16> {
    if area.width == 0 || !x.is_finite() {
        return None;
    }
    let offset = (x.max(0.0) as u16).min(area.width - 1);
    Some(area.x + offset)
}

impl Widget for WaveformView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let frame = self.widget.frame();
        let peaks = self.renderer.render(
            self.widget.samples(),
            frame.start,
            frame.length,
            area.width as usize,
        );
        self.draw_bars(area, buf, &peaks, frame.progress_width);

        if let Some(cursor) = self.widget.seek_cursor() {
            let band = Style::default().bg(self.palette.cursor);
            let end = cursor.band_start + cursor.band_width;
            for offset in 0..area.width {
                let x = offset as f32;
                if x >= cursor.band_start && x < end {
                    for y in area.y..area.y + area.height {
                        buf[(area.x + offset, y)].set_style(band);
                    }
                }
            }
            Self::draw_vertical_line(
                area,
                buf,
                cursor.x,
                Style::default().fg(self.palette.cursor),
            );
        }

        Self::draw_vertical_line(
            area,
            buf,
            frame.playhead_x,
            Style::default().fg(self.palette.playhead),
        );

        let label_style = Style::default()
            .fg(self.palette.time_label_text)
            .bg(self.palette.time_label_background);
        let duration = self.widget.duration_label();
        Self::draw_label(area, buf, area.width as f32, &duration, label_style);
        let label_x = if frame.pinned {
            area.width as f32 / 2.0
        } else {
            frame.playhead_x
        };
        Self::draw_label(
            area,
            buf,
            label_x,
            &self.widget.current_time_label(),
            label_style,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::waveform::clock::testing::FakePlayer;
    use crate::waveform::{PlayerHandle, ViewMode, WidgetOptions};

    fn widget(width: u16, height: u16, options: WidgetOptions) -> WaveformWidget {
        let samples: Vec<f32> = (0..1000).map(|i| if i % 2 == 0 { 0.5 } else { -1.0 }).collect();
        let mut widget = WaveformWidget::new(
            SampleBuffer::new(samples),
            PlayerHandle::bound(FakePlayer::new(100.0), 10),
            options,
        );
        widget.layout(width as f32, height as f32);
        widget
    }

    #[test]
    fn test_peaks_take_absolute_maximum() {
        let buffer = SampleBuffer::new(vec![0.1, -0.8, 0.3, 0.2]);
        let peaks = PeakRenderer.render(&buffer, 0, 4, 2);
        assert_eq!(peaks, vec![0.8, 0.3]);
    }

    #[test]
    fn test_peaks_tolerate_overrun() {
        let buffer = SampleBuffer::new(vec![0.5, 0.5]);
        let peaks = PeakRenderer.render(&buffer, 1, 4, 4);
        assert_eq!(peaks, vec![0.5, 0.0, 0.0, 0.0]);
        assert!(PeakRenderer.render(&buffer, 10, 4, 3).iter().all(|&p| p == 0.0));
    }

    #[test]
    fn test_huge_window_length_does_not_overflow() {
        let buffer = SampleBuffer::new(vec![0.5, -1.0, 0.25]);
        let peaks = PeakRenderer.render(&buffer, 0, usize::MAX, 80);
        assert_eq!(peaks.len(), 80);
        assert_eq!(peaks[0], 1.0);
        assert!(peaks[1..].iter().all(|&p| p == 0.0));
    }

    #[test]
    fn test_empty_buffer_renders_silence() {
        let buffer = SampleBuffer::new(Vec::new());
        assert_eq!(PeakRenderer.render(&buffer, 0, 10, 3), vec![0.0; 3]);
    }

    #[test]
    fn test_more_columns_than_samples() {
        let buffer = SampleBuffer::new(vec![0.25, 1.0]);
        let peaks = PeakRenderer.render(&buffer, 0, 2, 4);
        assert_eq!(peaks, vec![0.25, 0.25, 1.0, 1.0]);
    }

    #[test]
    fn test_view_draws_playhead_and_progress() {
        let palette = Palette::default();
        let mut w = widget(20, 5, WidgetOptions::default());
        w.on_tick(50.0, 100.0);

        let area = Rect::new(0, 0, 20, 5);
        let mut buf = Buffer::empty(area);
        WaveformView::new(&w, &palette, &PeakRenderer).render(area, &mut buf);

        assert_eq!(buf[(10, 0)].symbol(), LINE);
        assert_eq!(buf[(10, 0)].fg, palette.playhead);
        assert_eq!(buf[(3, 0)].symbol(), BAR);
        assert_eq!(buf[(3, 0)].fg, palette.progress_fill);
        assert_eq!(buf[(15, 0)].fg, palette.background);
    }

    #[test]
    fn test_view_draws_time_labels_on_middle_row() {
        let palette = Palette::default();
        let mut w = widget(40, 5, WidgetOptions::default());
        w.on_tick(0.0, 100.0);

        let area = Rect::new(0, 0, 40, 5);
        let mut buf = Buffer::empty(area);
        WaveformView::new(&w, &palette, &PeakRenderer).render(area, &mut buf);

        let row: String = (0..40).map(|x| buf[(x, 2)].symbol().to_string()).collect();
        assert!(row.starts_with("00:00"));
        assert!(row.ends_with("01:40"));
        assert_eq!(buf[(0, 2)].bg, palette.time_label_background);
    }

    #[test]
    fn test_seek_cursor_drawn_while_seeking() {
        let palette = Palette::default();
        let mut w = widget(20, 4, WidgetOptions::default());
        w.on_tick(0.0, 100.0);
        w.pointer_down(2.0);
        w.pointer_moved(12.0);

        let area = Rect::new(0, 0, 20, 4);
        let mut buf = Buffer::empty(area);
        WaveformView::new(&w, &palette, &PeakRenderer).render(area, &mut buf);

        assert_eq!(buf[(12, 0)].symbol(), LINE);
        assert_eq!(buf[(12, 0)].fg, palette.cursor);
        assert_eq!(buf[(6, 0)].bg, palette.cursor);
        assert_ne!(buf[(15, 0)].bg, palette.cursor);
    }

    #[test]
    fn test_transport_layout_and_hit_test() {
        let w = widget(60, 5, WidgetOptions::default());
        let buttons = transport_buttons(Rect::new(2, 7, 60, 1), &w);
        let actions: Vec<_> = buttons.iter().map(|b| b.action).collect();
        assert_eq!(
            actions,
            vec![
                TransportAction::TogglePlayback,
                TransportAction::Stop,
                TransportAction::ToggleMode
            ]
        );
        assert_eq!(buttons[0].label, "[ ▶ Play ]");
        assert_eq!(buttons[2].label, "[ Scroll ]");

        let first = buttons[0].area;
        assert_eq!(hit_test(&buttons, first.x, 7), Some(TransportAction::TogglePlayback));
        assert_eq!(hit_test(&buttons, first.x + first.width, 7), None);
        assert_eq!(hit_test(&buttons, first.x, 8), None);
        let toggle = buttons[2].area;
        assert_eq!(
            hit_test(&buttons, toggle.x + toggle.width - 1, 7),
            Some(TransportAction::ToggleMode)
        );
    }

    #[test]
    fn test_hidden_controls_are_not_laid_out() {
        let options = WidgetOptions {
            initial_mode: ViewMode::Scroll,
            show_transport_controls: false,
            ..WidgetOptions::default()
        };
        let w = widget(60, 5, options);
        let buttons = transport_buttons(Rect::new(0, 0, 60, 1), &w);
        assert_eq!(buttons.len(), 1);
        assert_eq!(buttons[0].label, "[ Linear ]");

        let options = WidgetOptions {
            show_transport_controls: false,
            show_mode_toggle: false,
            ..WidgetOptions::default()
        };
        let w = widget(60, 5, options);
        assert!(transport_buttons(Rect::new(0, 0, 60, 1), &w).is_empty());
    }
}
