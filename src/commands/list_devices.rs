//! List available audio output devices.

use crate::audio::{list_output_devices, OutputDeviceInfo};

/// Lists all audio output devices on the system.
///
/// # Errors
/// - If the audio host cannot enumerate devices
pub fn handle_list_devices() -> Result<(), anyhow::Error> {
    let devices = list_output_devices()?;

    if devices.is_empty() {
        println!("No audio output devices found on this system.");
        return Ok(());
    }

    println!();
    println!("Available audio output devices:");
    println!();
    for device in &devices {
        println!("{}", format_device(device));
    }

    Ok(())
}

fn format_device(device: &OutputDeviceInfo) -> String {
    let default_indicator = if device.is_default { " [DEFAULT]" } else { "" };
    let config_info = match device.config {
        Some((sample_rate, channels)) => format!(" ({sample_rate}Hz, {channels} channels)"),
        None => " (configuration unavailable)".to_string(),
    };
    format!(
        "  ID: {}\n    Name: {}{}\n    Config:{}\n",
        device.index, device.name, default_indicator, config_info
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_default_device() {
        let device = OutputDeviceInfo {
            index: 0,
            name: "pipewire".to_string(),
            is_default: true,
            config: Some((48000, 2)),
        };
        assert_eq!(
            format_device(&device),
            "  ID: 0\n    Name: pipewire [DEFAULT]\n    Config: (48000Hz, 2 channels)\n"
        );
    }

    #[test]
    fn test_format_device_without_config() {
        let device = OutputDeviceInfo {
            index: 3,
            name: "hdmi".to_string(),
            is_default: false,
            config: None,
        };
        assert!(format_device(&device).ends_with("Config: (configuration unavailable)\n"));
    }
}
