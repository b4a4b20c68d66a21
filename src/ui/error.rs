//! Full-screen error display for failures that happen while the terminal is
//! in raw mode.

use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Paragraph, Wrap},
};
use std::io::{self, Stdout};

const ERROR_BG: Color = Color::Rgb(255, 0, 0);
const ERROR_FG: Color = Color::Rgb(255, 255, 255);

/// Red screen with the message centered, dismissed by any key.
pub struct ErrorScreen {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl ErrorScreen {
    /// Enters the alternate screen.
    ///
    /// # Errors
    /// - If raw mode or the alternate screen cannot be entered
    pub fn new() -> anyhow::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(ErrorScreen { terminal })
    }

    /// Shows `message` until a key is pressed.
    ///
    /// # Errors
    /// - If terminal rendering or event polling fails
    pub fn show_error(&mut self, message: &str) -> anyhow::Result<()> {
        tracing::debug!("Showing error screen");
        loop {
            self.terminal.draw(|frame| {
                let area = frame.area();
                render_error(area, frame.buffer_mut(), message);
            })?;

            if event::poll(std::time::Duration::from_millis(100))? {
                if let Event::Key(_) = event::read()? {
                    break;
                }
            }
        }
        Ok(())
    }

    /// Leaves the alternate screen and restores the terminal.
    ///
    /// # Errors
    /// - If raw mode cannot be disabled or the cursor cannot be shown
    pub fn cleanup(&mut self) -> anyhow::Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for ErrorScreen {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

/// Paints the whole area red and wraps `message` into the middle 80%.
pub fn render_error(area: Rect, buf: &mut Buffer, message: &str) {
    buf.set_style(area, Style::default().bg(ERROR_BG));

    let text = Line::from(Span::styled(
        message,
        Style::default().fg(ERROR_FG).bg(ERROR_BG),
    ));
    let paragraph = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    let text_area = Rect {
        x: area.x + area.width / 10,
        y: area.y + area.height / 2,
        width: area.width * 8 / 10,
        height: area.height - area.height / 2,
    };
    paragraph.render(text_area, buf);
}

/// Shows `message` on an error screen and waits for a key press.
///
/// # Errors
/// - If the terminal cannot be set up or drawn to
pub fn show_error_screen(message: &str) -> anyhow::Result<()> {
    let mut screen = ErrorScreen::new()?;
    screen.show_error(message)?;
    screen.cleanup()
}
