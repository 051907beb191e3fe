//! Device listing command.

use clap::Args;
use diapason_audio::list_output_devices;

use crate::midi;

#[derive(Args)]
pub struct DevicesArgs {
    /// Also list MIDI output ports
    #[arg(long)]
    midi: bool,
}

pub fn run(args: DevicesArgs) -> anyhow::Result<()> {
    let devices = list_output_devices()?;

    println!("Audio Output Devices");
    println!("====================\n");
    if devices.is_empty() {
        println!("  (none)");
    }
    for (idx, device) in devices.iter().enumerate() {
        let default = if device.is_default { " (default)" } else { "" };
        println!(
            "  [{}] {} ({} Hz, {} ch){}",
            idx, device.name, device.default_sample_rate, device.channels, default
        );
    }

    if args.midi {
        println!("\nMIDI Output Ports");
        println!("=================\n");
        let ports = midi::list_ports()?;
        if ports.is_empty() {
            println!("  (none)");
        }
        for (idx, name) in ports.iter().enumerate() {
            println!("  [{idx}] {name}");
        }
    }

    println!();
    println!("Tip: use an index or partial name with --device / --midi:");
    println!("  diapason play --script song.txt --device 0");
    Ok(())
}
