//! Print format details of an audio file.

use crate::audio::{AudioSource, LoadedAudio, WavSource};
use crate::waveform::format_clock;
use std::path::Path;

/// Label/value rows describing a loaded track.
pub fn describe(audio: &LoadedAudio) -> Vec<(&'static str, String)> {
    let duration = audio.duration_secs();
    vec![
        ("Sample rate", format!("{} Hz", audio.sample_rate)),
        ("Channels", format!("{} (channel 0 shown)", audio.channels)),
        ("Bit depth", format!("{}-bit", audio.bits_per_sample)),
        ("Samples", audio.samples.len().to_string()),
        ("Duration", format!("{} ({:.3}s)", format_clock(duration), duration)),
    ]
}

/// Loads `file` and prints its format details.
///
/// # Errors
/// - If the file cannot be found or decoded
pub fn handle_info(file: &Path) -> Result<(), anyhow::Error> {
    let audio = WavSource.load_samples(file)?;

    println!();
    println!("{}", file.display());
    println!();
    for (label, value) in describe(&audio) {
        println!("  {label:<12} {value}");
    }
    println!();
    Ok(())
}
