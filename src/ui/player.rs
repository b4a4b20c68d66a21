//! Full-screen terminal player hosting one waveform widget.

use super::input::{handle_key, PlayerCommand, PointerRouter};
use super::render::{
    render_transport, transport_buttons, PeakRenderer, TransportButton, WaveformView,
};
use super::theme::Palette;
use crate::waveform::WaveformWidget;
use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Padding, Paragraph},
};
use std::io::{self, Stdout};
use std::time::Duration;

const BG: Color = Color::Rgb(0, 0, 0);
const FG: Color = Color::Rgb(255, 255, 255);
const HELP_FG: Color = Color::Rgb(100, 100, 100);
const NOTICE_FG: Color = Color::Yellow;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Screen regions of the player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerLayout {
    pub header: Rect,
    pub waveform: Rect,
    pub transport: Rect,
    pub footer: Rect,
}

impl PlayerLayout {
    pub fn new(area: Rect) -> Self {
        let inner = Block::default().padding(Padding::uniform(1)).inner(area);
        let [header, waveform, transport, footer] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(inner);
        Self {
            header,
            waveform,
            transport,
            footer,
        }
    }
}

fn help_text(bound: bool, show_mode_toggle: bool) -> &'static str {
    match (bound, show_mode_toggle) {
        (true, true) => "space play/pause, s stop, m mode, click/drag to seek, esc/q exit",
        (true, false) => "space play/pause, s stop, click/drag to seek, esc/q exit",
        (false, true) => "playback unavailable, m mode, esc/q exit",
        (false, false) => "playback unavailable, esc/q exit",
    }
}

/// Terminal player: draws the widget, feeds it input and clock events.
pub struct PlayerTui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    widget: WaveformWidget,
    palette: Palette,
    title: String,
    notice: Option<String>,
    layout: PlayerLayout,
    buttons: Vec<TransportButton>,
    pointer: PointerRouter,
}

impl PlayerTui {
    /// Enters the alternate screen with mouse capture.
    ///
    /// # Errors
    /// - If the terminal cannot be initialized
    pub fn new(
        widget: WaveformWidget,
        palette: Palette,
        title: String,
        notice: Option<String>,
    ) -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;

        Ok(Self {
            terminal,
            widget,
            palette,
            title,
            notice,
            layout: PlayerLayout::default(),
            buttons: Vec::new(),
            pointer: PointerRouter::default(),
        })
    }

    /// Runs the player until the user quits.
    ///
    /// # Errors
    /// - If drawing or event polling fails
    pub fn run(&mut self) -> Result<()> {
        self.widget.attach();
        tracing::debug!("Player started");

        let result = self.event_loop();

        self.widget.detach();
        self.cleanup()?;
        result
    }

    fn event_loop(&mut self) -> Result<()> {
        loop {
            self.widget.pump_clock();
            self.draw()?;

            if !event::poll(POLL_INTERVAL)? {
                continue;
            }
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if handle_key(&mut self.widget, key) == PlayerCommand::Quit {
                        return Ok(());
                    }
                }
                Event::Mouse(mouse) => {
                    self.pointer.handle_mouse(
                        &mut self.widget,
                        self.layout.waveform,
                        &self.buttons,
                        mouse,
                    );
                }
                _ => {}
            }
        }
    }

    fn draw(&mut self) -> Result<()> {
        let widget = &mut self.widget;
        let palette = &self.palette;
        let title = &self.title;
        let notice = &self.notice;
        let layout_slot = &mut self.layout;
        let buttons_slot = &mut self.buttons;

        self.terminal.draw(|frame| {
            let area = frame.area();
            frame.render_widget(Block::default().style(Style::default().bg(BG)), area);

            let layout = PlayerLayout::new(area);
            widget.layout(layout.waveform.width as f32, layout.waveform.height as f32);

            let mut header = vec![Span::styled(
                format!("{}  [{}]", title, widget.mode()),
                Style::default().fg(FG),
            )];
            if let Some(notice) = notice {
                header.push(Span::styled(
                    format!("  {notice}"),
                    Style::default().fg(NOTICE_FG),
                ));
            }
            frame.render_widget(Paragraph::new(Line::from(header)), layout.header);

            frame.render_widget(
                WaveformView::new(widget, palette, &PeakRenderer),
                layout.waveform,
            );

            let buttons = transport_buttons(layout.transport, widget);
            render_transport(&buttons, palette, frame.buffer_mut());

            let help = help_text(widget.is_bound(), widget.options().show_mode_toggle);
            frame.render_widget(
                Paragraph::new(help)
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(HELP_FG)),
                layout.footer,
            );

            *layout_slot = layout;
            *buttons_slot = buttons;
        })?;

        Ok(())
    }

    fn cleanup(&mut self) -> Result<()> {
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        self.terminal.show_cursor()?;
        tracing::debug!("Player terminal cleanup complete");
        Ok(())
    }
}

impl Drop for PlayerTui {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}
