//! Terminal user interface.
//!
//! - `player`: the full-screen player loop
//! - `render`: ratatui drawing of the waveform and transport line
//! - `input`: keyboard and mouse routing into the widget
//! - `theme`: colors from the config file
//! - `error`: full-screen error display

pub mod error;
pub mod input;
pub mod player;
pub mod render;
pub mod theme;

pub use error::show_error_screen;
pub use player::PlayerTui;
pub use theme::Palette;
