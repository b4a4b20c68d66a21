//! Application orchestration and command routing.
//!
//! Handles command-line argument parsing and delegates to the command handlers.

use crate::commands::{self, PlayOptions};
use crate::logging;
use crate::waveform::ViewMode;
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;
use std::process;

/// An interactive terminal waveform player with scrubbing
#[derive(Parser, Debug)]
#[command(name = "scrubwave")]
#[command(version)]
#[command(about = "An interactive terminal waveform player with scrubbing")]
#[command(long_about = "An interactive terminal waveform player with scrubbing and a zoomed\nscroll view that follows the playhead.\n\nDEFAULT COMMAND:\n    'scrubwave FILE' is the same as 'scrubwave play FILE'.\n\nEXAMPLES:\n    # Play a file in the whole-track view\n    $ scrubwave take1.wav\n\n    # Start in the zoomed scroll view\n    $ scrubwave play take1.wav --mode scroll\n\n    # Show format details\n    $ scrubwave info take1.wav\n\n    # Edit configuration file\n    $ scrubwave config")]
#[command(
    after_help = "CONFIGURATION:\n    Config file:        ~/.config/scrubwave/scrubwave.toml\n    Logs:               ~/.local/state/scrubwave/scrubwave.log.*"
)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Audio file to open in the player (shorthand for `play FILE`)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Debug)]
struct PlayArgs {
    /// WAV file to play
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Initial view mode (overrides the config file)
    #[arg(short, long, value_enum)]
    mode: Option<ViewMode>,

    /// Hide the play/pause and stop buttons
    #[arg(long)]
    no_transport: bool,

    /// Hide the linear/scroll mode toggle
    #[arg(long)]
    no_mode_toggle: bool,
}

impl From<PlayArgs> for PlayOptions {
    fn from(args: PlayArgs) -> Self {
        PlayOptions {
            file: args.file,
            mode: args.mode,
            no_transport: args.no_transport,
            no_mode_toggle: args.no_mode_toggle,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open a WAV file in the interactive player
    ///
    /// Space plays/pauses, s stops, m switches between the linear and scroll
    /// views, Escape/q quits. Click or drag on the waveform to seek.
    #[command(visible_alias = "p")]
    Play(PlayArgs),

    /// Print sample rate, channels, length and duration of a WAV file
    #[command(visible_alias = "i")]
    Info {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Open configuration file in your preferred editor
    ///
    /// Opens ~/.config/scrubwave/scrubwave.toml using $EDITOR, nano or vi.
    Config,

    /// List available audio output devices
    ///
    /// Use the ID or name in the [playback] device setting of the config file.
    ListDevices,

    /// Show recent log entries
    Logs,

    /// Generate shell completion script
    ///
    /// Examples:
    ///   scrubwave completions bash > scrubwave.bash
    ///   scrubwave completions zsh > _scrubwave
    ///   scrubwave completions fish > scrubwave.fish
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Runs the application based on command-line arguments.
///
/// # Errors
/// - If logging initialization fails
/// - If command execution fails
pub async fn run() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Commands that print to the terminal and need no logging
    match &cli.command {
        Some(Commands::Completions { shell }) => {
            generate(*shell, &mut Cli::command(), "scrubwave", &mut io::stdout());
            return Ok(());
        }
        Some(Commands::ListDevices) => return exit_on_error(commands::handle_list_devices()),
        Some(Commands::Logs) => return exit_on_error(commands::handle_logs()),
        _ => {}
    }

    logging::init_logging()?;

    match (cli.command, cli.file) {
        (Some(Commands::Play(args)), _) => commands::handle_play(args.into()).await?,
        (None, Some(file)) => {
            commands::handle_play(PlayOptions {
                file,
                ..PlayOptions::default()
            })
            .await?
        }
        (None, None) => {
            Cli::command().print_help()?;
            println!();
        }
        (Some(Commands::Info { file }), _) => commands::handle_info(&file)?,
        (Some(Commands::Config), _) => commands::handle_config()?,
        (Some(Commands::Completions { .. }), _)
        | (Some(Commands::ListDevices), _)
        | (Some(Commands::Logs), _) => unreachable!("These commands are handled earlier"),
    }

    Ok(())
}

fn exit_on_error(result: anyhow::Result<()>) -> anyhow::Result<()> {
    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
    Ok(())
}
