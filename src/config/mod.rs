//! Configuration management for scrubwave.
//!
//! Loads the TOML config file from the user's config directory and turns it
//! into widget options and a color palette.

pub mod file;

pub use file::{get_config_path, ColorConfig, ScrubwaveConfig};
