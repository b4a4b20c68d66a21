//! Output device lookup.

use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, HostTrait};

#[cfg(target_os = "linux")]
use std::fs::OpenOptions;
#[cfg(target_os = "linux")]
use std::os::unix::io::AsRawFd;

/// Device spec meaning "whatever the host considers the default output".
pub const DEFAULT_DEVICE: &str = "default";

/// Summary of an output device, as shown by `list-devices`.
#[derive(Debug, Clone)]
pub struct OutputDeviceInfo {
    pub index: usize,
    pub name: String,
    pub is_default: bool,
    /// `(sample_rate, channels)` when the default config could be queried
    pub config: Option<(u32, u16)>,
}

/// Resolves a device spec: `"default"`, a numeric index, or an exact name.
pub fn find_output_device(spec: &str) -> Result<cpal::Device> {
    suppress_alsa_warnings(|| {
        let host = cpal::default_host();

        if spec == DEFAULT_DEVICE {
            return host
                .default_output_device()
                .ok_or_else(|| anyhow!("No audio output device available"));
        }

        let devices: Vec<cpal::Device> = host
            .output_devices()
            .map_err(|e| anyhow!("Failed to enumerate devices: {e}"))?
            .collect();

        if let Ok(index) = spec.parse::<usize>() {
            let count = devices.len();
            return devices.into_iter().nth(index).ok_or_else(|| {
                anyhow!(
                    "Device index {} is out of range (0-{})",
                    index,
                    count.saturating_sub(1)
                )
            });
        }

        devices
            .into_iter()
            .find(|device| device.name().map(|name| name == spec).unwrap_or(false))
            .ok_or_else(|| {
                anyhow!(
                    "Audio output device '{spec}' not found. Use 'scrubwave list-devices' to see available devices."
                )
            })
    })
}

/// Enumerates output devices, skipping any whose name cannot be queried.
pub fn list_output_devices() -> Result<Vec<OutputDeviceInfo>> {
    suppress_alsa_warnings(|| {
        let host = cpal::default_host();
        let default_name = host.default_output_device().and_then(|d| d.name().ok());

        let devices = host
            .output_devices()
            .map_err(|e| anyhow!("Failed to enumerate audio devices: {e}"))?
            .filter_map(|device| device.name().ok().map(|name| (device, name)))
            .enumerate()
            .map(|(index, (device, name))| OutputDeviceInfo {
                index,
                is_default: default_name.as_deref() == Some(name.as_str()),
                config: device
                    .default_output_config()
                    .ok()
                    .map(|config| (config.sample_rate().0, config.channels())),
                name,
            })
            .collect();

        Ok(devices)
    })
}

/// Runs `f` with stderr pointed at /dev/null so ALSA's probing noise does not
/// land on top of the terminal UI.
#[cfg(target_os = "linux")]
pub(crate) fn suppress_alsa_warnings<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    let dev_null = OpenOptions::new()
        .write(true)
        .open("/dev/null")
        .map_err(|e| anyhow!("Failed to open /dev/null: {e}"))?;

    let old_stderr = unsafe { libc::dup(libc::STDERR_FILENO) };
    if old_stderr == -1 {
        return Err(anyhow!("Failed to duplicate stderr"));
    }

    if unsafe { libc::dup2(dev_null.as_raw_fd(), libc::STDERR_FILENO) } == -1 {
        unsafe { libc::close(old_stderr) };
        return Err(anyhow!("Failed to redirect stderr"));
    }

    let result = f();

    unsafe {
        libc::dup2(old_stderr, libc::STDERR_FILENO);
        libc::close(old_stderr);
    }

    result
}

#[cfg(not(target_os = "linux"))]
pub(crate) fn suppress_alsa_warnings<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suppressed_closure_result_is_returned() {
        let value = suppress_alsa_warnings(|| Ok(42)).unwrap();
        assert_eq!(value, 42);

        let err = suppress_alsa_warnings::<_, ()>(|| Err(anyhow!("boom"))).unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }
}
