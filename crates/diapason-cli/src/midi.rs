//! MIDI output through midir.

use anyhow::{Context, bail};
use diapason_synth::MidiOut;
use midir::{MidiOutput, MidiOutputConnection};

const CLIENT_NAME: &str = "diapason";

/// Connected output port.
pub struct MidiPort {
    connection: MidiOutputConnection,
    name: String,
    failed: bool,
}

impl MidiPort {
    /// Connects to the first port whose name contains `pattern`
    /// (case-insensitive), or to port number `pattern`.
    pub fn connect(pattern: &str) -> anyhow::Result<Self> {
        let midi_out = MidiOutput::new(CLIENT_NAME).context("failed to initialise MIDI output")?;
        let ports = midi_out.ports();

        let port = match pattern.parse::<usize>() {
            Ok(index) => ports.get(index),
            Err(_) => {
                let needle = pattern.to_lowercase();
                ports.iter().find(|port| {
                    midi_out
                        .port_name(port)
                        .is_ok_and(|name| name.to_lowercase().contains(&needle))
                })
            }
        };
        let Some(port) = port else {
            bail!("no MIDI output port matching '{pattern}'");
        };

        let name = midi_out
            .port_name(port)
            .unwrap_or_else(|_| "unknown".into());
        let connection = midi_out
            .connect(port, "diapason-notes")
            .map_err(|e| anyhow::anyhow!("failed to connect to MIDI port '{name}': {e}"))?;
        tracing::info!(port = %name, "MIDI output connected");

        Ok(Self {
            connection,
            name,
            failed: false,
        })
    }

    /// Port name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl MidiOut for MidiPort {
    fn send(&mut self, message: &[u8; 3]) {
        if let Err(err) = self.connection.send(message) {
            // one report per session; the synth keeps playing
            if !self.failed {
                tracing::warn!(port = %self.name, %err, "MIDI send failed");
                self.failed = true;
            }
        }
    }
}

/// Names of the available output ports.
pub fn list_ports() -> anyhow::Result<Vec<String>> {
    let midi_out = MidiOutput::new(CLIENT_NAME).context("failed to initialise MIDI output")?;
    Ok(midi_out
        .ports()
        .iter()
        .filter_map(|port| midi_out.port_name(port).ok())
        .collect())
}
