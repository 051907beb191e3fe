//! Diapason CLI - play the fretboard synth from touch scripts.

mod commands;
mod midi;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "diapason")]
#[command(author, version, about = "Diapason fretboard synth", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a touch script through the synth, live or to a WAV file
    Play(commands::play::PlayArgs),

    /// List audio output devices and MIDI output ports
    Devices(commands::devices::DevicesArgs),

    /// Show or initialise the settings file
    Settings(commands::settings::SettingsArgs),

    /// List the preset slots
    Presets(commands::presets::PresetsArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();
    tracing_log::LogTracer::init().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play(args) => commands::play::run(args),
        Commands::Devices(args) => commands::devices::run(args),
        Commands::Settings(args) => commands::settings::run(args),
        Commands::Presets(args) => commands::presets::run(args),
    }
}
