//! Preset listing command.

use std::path::PathBuf;

use clap::Args;
use diapason_config::{Mode, Settings};
use diapason_synth::Patch;

use super::common::settings_path;

#[derive(Args)]
pub struct PresetsArgs {
    /// Settings file (defaults to the user config directory)
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,
}

fn on_off(on: bool) -> &'static str {
    if on { "on" } else { "off" }
}

pub fn run(args: PresetsArgs) -> anyhow::Result<()> {
    let settings = Settings::load_or_default(settings_path(args.settings.as_deref()))?;

    println!("Presets");
    println!("=======\n");
    for (slot, preset) in settings.presets.iter().enumerate() {
        let mode = match preset.mode {
            Mode::Tapping => "tapping",
            Mode::Strum => "strum",
        };
        println!(
            "  [{}] patch {} ({}), {}, distortion {}, filter {}, pitches {:?}, capo {}",
            slot + 1,
            preset.patch,
            Patch::lookup(preset.patch).name,
            mode,
            on_off(preset.distortion.enabled),
            on_off(preset.filter.enabled),
            preset.tuning.pitches,
            preset.tuning.capo
        );
    }
    Ok(())
}
