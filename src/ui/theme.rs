//! Color palette resolved from the `[colors]` config section.

use crate::config::ColorConfig;
use ratatui::style::Color;
use std::str::FromStr;

/// Resolved widget colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub cursor: Color,
    pub playhead: Color,
    pub progress_fill: Color,
    pub background: Color,
    pub time_label_text: Color,
    pub time_label_background: Color,
    pub control_tint: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            cursor: Color::Blue,
            playhead: Color::Red,
            progress_fill: Color::Rgb(0x4a, 0x4f, 0x56),
            background: Color::Rgb(0xdf, 0xe0, 0xe5),
            time_label_text: Color::White,
            time_label_background: Color::Black,
            control_tint: Color::Gray,
        }
    }
}

impl Palette {
    /// Parses every configured color, keeping the default for values that do
    /// not parse.
    pub fn from_config(colors: &ColorConfig) -> Self {
        let defaults = Self::default();
        Self {
            cursor: parse_color("cursor", &colors.cursor, defaults.cursor),
            playhead: parse_color("playhead", &colors.playhead, defaults.playhead),
            progress_fill: parse_color(
                "progress_fill",
                &colors.progress_fill,
                defaults.progress_fill,
            ),
            background: parse_color("background", &colors.background, defaults.background),
            time_label_text: parse_color(
                "time_label_text",
                &colors.time_label_text,
                defaults.time_label_text,
            ),
            time_label_background: parse_color(
                "time_label_background",
                &colors.time_label_background,
                defaults.time_label_background,
            ),
            control_tint: parse_color("control_tint", &colors.control_tint, defaults.control_tint),
        }
    }
}

fn parse_color(field: &str, value: &str, fallback: Color) -> Color {
    Color::from_str(value.trim()).unwrap_or_else(|_| {
        tracing::warn!("Invalid color '{}' for colors.{}, using default", value, field);
        fallback
    })
}
