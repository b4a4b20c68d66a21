//! Configuration file management for scrubwave.
//!
//! Configuration lives in `~/.config/scrubwave/scrubwave.toml`. Every field has
//! a default, so partial files are fine. The file is created from the bundled
//! template on first run.

use crate::audio::DEFAULT_DEVICE;
use crate::waveform::{
    ViewMode, ViewRange, WidgetOptions, DEFAULT_TICK_INTERVAL, ZOOM_WINDOW_SAMPLES,
};
use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Template written on first run.
pub const DEFAULT_CONFIG: &str = include_str!("../../environments/scrubwave.toml");

/// Widget colors. Values are ratatui color names or `#rrggbb` strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub cursor: String,
    pub playhead: String,
    pub progress_fill: String,
    pub background: String,
    pub time_label_text: String,
    pub time_label_background: String,
    pub control_tint: String,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            cursor: "blue".to_string(),
            playhead: "red".to_string(),
            progress_fill: "#4a4f56".to_string(),
            background: "#dfe0e5".to_string(),
            time_label_text: "white".to_string(),
            time_label_background: "black".to_string(),
            control_tint: "gray".to_string(),
        }
    }
}

/// What the player shows around the waveform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub show_transport_controls: bool,
    pub show_mode_toggle: bool,
    pub initial_mode: ViewMode,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_transport_controls: true,
            show_mode_toggle: true,
            initial_mode: ViewMode::Linear,
        }
    }
}

/// Output device and clock settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Audio device to use. Options:
    /// - "default" for system default device
    /// - numeric index (0, 1, 2, etc.) from `scrubwave list-devices`
    /// - device name from `scrubwave list-devices`
    pub device: String,
    pub tick_interval_ms: u64,
    pub zoom_window_samples: usize,
    /// Linear-mode view start as a fraction of the track
    pub view_start: f64,
    /// Linear-mode view length as a fraction of the track
    pub view_length: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            device: DEFAULT_DEVICE.to_string(),
            tick_interval_ms: DEFAULT_TICK_INTERVAL.as_millis() as u64,
            zoom_window_samples: ZOOM_WINDOW_SAMPLES,
            view_start: 0.0,
            view_length: 1.0,
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrubwaveConfig {
    pub colors: ColorConfig,
    pub display: DisplayConfig,
    pub playback: PlaybackConfig,
}

impl ScrubwaveConfig {
    /// Loads configuration from the user's config directory, creating the
    /// file from the template when it does not exist yet.
    ///
    /// # Errors
    /// - If the config directory cannot be determined or created
    /// - If the config file cannot be read or written
    /// - If the TOML is malformed
    pub fn load() -> anyhow::Result<Self> {
        let config_path = get_config_path()?;
        if ensure_config_file(&config_path)? {
            tracing::info!("Created default config at {}", config_path.display());
        }
        Self::load_from(&config_path)
    }

    /// Parses a config file at `path`.
    ///
    /// # Errors
    /// - If the file cannot be read or the TOML is malformed
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: ScrubwaveConfig = toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        tracing::debug!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    pub fn tick_interval(&self) -> Duration {
        if self.playback.tick_interval_ms == 0 {
            tracing::warn!("tick_interval_ms must be positive, using default");
            return DEFAULT_TICK_INTERVAL;
        }
        Duration::from_millis(self.playback.tick_interval_ms)
    }

    pub fn view_range(&self) -> ViewRange {
        ViewRange::new(self.playback.view_start, self.playback.view_length)
    }

    /// Widget construction options derived from the file.
    pub fn widget_options(&self) -> WidgetOptions {
        WidgetOptions {
            initial_mode: self.display.initial_mode,
            show_transport_controls: self.display.show_transport_controls,
            show_mode_toggle: self.display.show_mode_toggle,
            view_range: self.view_range(),
            zoom_window_samples: self.playback.zoom_window_samples,
            tick_interval: self.tick_interval(),
        }
    }
}

/// Writes the default template to `path` if no file exists there.
/// Returns whether a file was created.
///
/// # Errors
/// - If the parent directory or the file cannot be created
pub fn ensure_config_file(path: &Path) -> anyhow::Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| anyhow!("Failed to create config directory: {e}"))?;
    }
    fs::write(path, DEFAULT_CONFIG)?;
    Ok(true)
}

/// Retrieves the path to the config file.
///
/// # Errors
/// - If the home directory cannot be determined
pub fn get_config_path() -> anyhow::Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| anyhow!("Could not determine home directory"))?;
    Ok(home.join(".config").join("scrubwave").join("scrubwave.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_matches_defaults() {
        let parsed: ScrubwaveConfig = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(parsed, ScrubwaveConfig::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let parsed: ScrubwaveConfig = toml::from_str(
            r#"
            [display]
            initial_mode = "scroll"

            [playback]
            tick_interval_ms = 40
            "#,
        )
        .unwrap();
        assert_eq!(parsed.display.initial_mode, ViewMode::Scroll);
        assert!(parsed.display.show_transport_controls);
        assert_eq!(parsed.playback.device, "default");
        assert_eq!(parsed.tick_interval(), Duration::from_millis(40));
        assert_eq!(parsed.colors, ColorConfig::default());
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        let result: Result<ScrubwaveConfig, _> = toml::from_str(
            r#"
            [display]
            initial_mode = "spiral"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_tick_interval_falls_back() {
        let mut config = ScrubwaveConfig::default();
        config.playback.tick_interval_ms = 0;
        assert_eq!(config.tick_interval(), DEFAULT_TICK_INTERVAL);
    }

    #[test]
    fn test_invalid_view_length_falls_back_to_full_track() {
        let mut config = ScrubwaveConfig::default();
        config.playback.view_start = 0.25;
        config.playback.view_length = 0.0;
        let options = config.widget_options();
        assert_eq!(options.view_range, ViewRange::new(0.25, 1.0));
    }

    #[test]
    fn test_ensure_creates_once_and_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("scrubwave.toml");

        assert!(ensure_config_file(&path).unwrap());
        assert!(!ensure_config_file(&path).unwrap());

        let mut config = ScrubwaveConfig::load_from(&path).unwrap();
        config.playback.device = "USB Audio".to_string();
        fs::write(&path, toml::to_string_pretty(&config).unwrap()).unwrap();

        let reloaded = ScrubwaveConfig::load_from(&path).unwrap();
        assert_eq!(reloaded.playback.device, "USB Audio");
        assert!(!ensure_config_file(&path).unwrap());
    }

    #[test]
    fn test_malformed_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scrubwave.toml");
        fs::write(&path, "[display\nshow_mode_toggle = yes").unwrap();
        let err = ScrubwaveConfig::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("scrubwave.toml"));
    }
}
