//! scrubwave: an interactive terminal waveform player with scrubbing.

mod app;
mod audio;
mod commands;
mod config;
mod logging;
mod ui;
mod waveform;

#[tokio::main]
async fn main() {
    if let Err(e) = app::run().await {
        tracing::error!("Fatal error: {e:#}");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
