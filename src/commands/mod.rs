//! Application command handlers for scrubwave.
//!
//! # Commands
//! - `play`: Interactive waveform player (default)
//! - `info`: Print format details of an audio file
//! - `config`: Open configuration file in user's preferred editor
//! - `list_devices`: List available audio output devices
//! - `logs`: Display recent log entries

pub mod config;
pub mod info;
pub mod list_devices;
pub mod logs;
pub mod play;

pub use config::handle_config;
pub use info::handle_info;
pub use list_devices::handle_list_devices;
pub use logs::handle_logs;
pub use play::{handle_play, PlayOptions};
