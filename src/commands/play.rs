//! Interactive waveform player.
//!
//! Loads a track, binds it to the configured output device and runs the
//! terminal player until the user quits.

use crate::audio::{self, WavSource};
use crate::config::ScrubwaveConfig;
use crate::ui::{self, Palette, PlayerTui};
use crate::waveform::{ViewMode, WaveformWidget, WidgetOptions};
use std::path::{Path, PathBuf};

/// Command-line overrides for the player.
#[derive(Debug, Clone, Default)]
pub struct PlayOptions {
    pub file: PathBuf,
    pub mode: Option<ViewMode>,
    pub no_transport: bool,
    pub no_mode_toggle: bool,
}

/// Merges config file values with command-line flags. Flags win.
pub fn widget_options(config: &ScrubwaveConfig, opts: &PlayOptions) -> WidgetOptions {
    let mut options = config.widget_options();
    if let Some(mode) = opts.mode {
        options.initial_mode = mode;
    }
    if opts.no_transport {
        options.show_transport_controls = false;
    }
    if opts.no_mode_toggle {
        options.show_mode_toggle = false;
    }
    options
}

fn display_title(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Opens the player for `opts.file`.
///
/// A track that cannot be loaded, or a device that cannot be opened, still
/// opens the player with a notice in the header.
///
/// # Errors
/// - If the configuration is invalid
/// - If the terminal cannot be driven
pub async fn handle_play(opts: PlayOptions) -> Result<(), anyhow::Error> {
    tracing::info!("=== scrubwave player started ===");

    let config = match ScrubwaveConfig::load() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("Failed to load configuration: {err:#}");
            let error_message = format!(
                "Configuration Error:\n\n{err:#}\n\nPlease check your ~/.config/scrubwave/scrubwave.toml file and try again."
            );
            ui::show_error_screen(&error_message)?;
            return Err(err);
        }
    };

    let options = widget_options(&config, &opts);
    tracing::info!(
        "Opening {} (device={}, mode={}, tick={}ms)",
        opts.file.display(),
        config.playback.device,
        options.initial_mode,
        options.tick_interval.as_millis()
    );

    let track = audio::open_track(&WavSource, &opts.file, &config.playback.device);
    let widget = WaveformWidget::new(track.samples, track.handle, options);
    let palette = Palette::from_config(&config.colors);

    let mut tui = PlayerTui::new(widget, palette, display_title(&opts.file), track.notice)?;
    tui.run()?;

    tracing::info!("Player closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let mut config = ScrubwaveConfig::default();
        config.display.initial_mode = ViewMode::Linear;
        config.playback.tick_interval_ms = 250;

        let opts = PlayOptions {
            file: PathBuf::from("a.wav"),
            mode: Some(ViewMode::Scroll),
            no_transport: true,
            no_mode_toggle: false,
        };
        let options = widget_options(&config, &opts);
        assert_eq!(options.initial_mode, ViewMode::Scroll);
        assert!(!options.show_transport_controls);
        assert!(options.show_mode_toggle);
        assert_eq!(options.tick_interval.as_millis(), 250);
    }

    #[test]
    fn test_no_flags_keep_config() {
        let mut config = ScrubwaveConfig::default();
        config.display.initial_mode = ViewMode::Scroll;
        config.display.show_mode_toggle = false;

        let options = widget_options(&config, &PlayOptions::default());
        assert_eq!(options.initial_mode, ViewMode::Scroll);
        assert!(!options.show_mode_toggle);
    }

    #[test]
    fn test_title_is_file_name() {
        assert_eq!(display_title(Path::new("/music/take 3.wav")), "take 3.wav");
        assert_eq!(display_title(Path::new("/")), "/");
    }
}
