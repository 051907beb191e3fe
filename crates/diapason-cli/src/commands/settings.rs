//! Settings file command.

use std::path::PathBuf;

use anyhow::bail;
use clap::{Args, Subcommand};
use diapason_config::Settings;

use super::common::settings_path;

#[derive(Args)]
pub struct SettingsArgs {
    /// Settings file (defaults to the user config directory)
    #[arg(long, value_name = "FILE", global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<SettingsCommand>,
}

#[derive(Subcommand)]
enum SettingsCommand {
    /// Print the effective settings as TOML
    Show,

    /// Write the factory settings
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the settings file location
    Path,
}

pub fn run(args: SettingsArgs) -> anyhow::Result<()> {
    let path = settings_path(args.settings.as_deref());
    match args.command.unwrap_or(SettingsCommand::Show) {
        SettingsCommand::Show => {
            let settings = Settings::load_or_default(&path)?;
            print!("{}", settings.to_toml()?);
        }
        SettingsCommand::Init { force } => {
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            Settings::default().save(&path)?;
            println!("Wrote {}", path.display());
        }
        SettingsCommand::Path => println!("{}", path.display()),
    }
    Ok(())
}
