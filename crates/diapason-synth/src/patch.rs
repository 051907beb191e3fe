//! Factory patch bank.
//!
//! A patch is two detuned oscillators through one envelope. Patch numbers
//! are a byte on the instrument; they wrap around the bank so every number
//! selects something.

use crate::envelope::EnvelopeShape;
use crate::oscillator::Waveform;

/// One voice configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Patch {
    /// Display name.
    pub name: &'static str,
    /// First oscillator waveform.
    pub osc1: Waveform,
    /// Second oscillator waveform.
    pub osc2: Waveform,
    /// Second oscillator detune in cents.
    pub detune_cents: f32,
    /// Second oscillator level relative to the first, 0 to 1.
    pub mix: f32,
    /// Amplitude envelope.
    pub envelope: EnvelopeShape,
}

const fn shape(attack_ms: f32, decay_ms: f32, sustain: f32, release_ms: f32) -> EnvelopeShape {
    EnvelopeShape {
        attack_ms,
        decay_ms,
        sustain,
        release_ms,
    }
}

/// Factory bank.
pub const PATCHES: [Patch; 6] = [
    Patch {
        name: "Pluck",
        osc1: Waveform::Saw,
        osc2: Waveform::Triangle,
        detune_cents: 4.0,
        mix: 0.5,
        envelope: shape(2.0, 400.0, 0.3, 300.0),
    },
    Patch {
        name: "Round Bass",
        osc1: Waveform::Sine,
        osc2: Waveform::Triangle,
        detune_cents: 0.0,
        mix: 0.4,
        envelope: shape(4.0, 600.0, 0.7, 200.0),
    },
    Patch {
        name: "Reed",
        osc1: Waveform::Square,
        osc2: Waveform::Saw,
        detune_cents: -6.0,
        mix: 0.3,
        envelope: shape(15.0, 200.0, 0.8, 250.0),
    },
    Patch {
        name: "Glass",
        osc1: Waveform::Sine,
        osc2: Waveform::Sine,
        detune_cents: 1200.0,
        mix: 0.35,
        envelope: shape(3.0, 900.0, 0.2, 700.0),
    },
    Patch {
        name: "Twin Saw",
        osc1: Waveform::Saw,
        osc2: Waveform::Saw,
        detune_cents: 9.0,
        mix: 1.0,
        envelope: shape(6.0, 300.0, 0.6, 350.0),
    },
    Patch {
        name: "Soft Pad",
        osc1: Waveform::Triangle,
        osc2: Waveform::Square,
        detune_cents: -3.0,
        mix: 0.25,
        envelope: shape(120.0, 500.0, 0.8, 900.0),
    },
];

/// Power-on patch number.
pub const DEFAULT_PATCH: u8 = 226;

impl Patch {
    /// Bank entry for a patch number.
    pub fn lookup(number: u8) -> &'static Patch {
        &PATCHES[usize::from(number) % PATCHES.len()]
    }
}

impl Default for Patch {
    fn default() -> Self {
        *Self::lookup(DEFAULT_PATCH)
    }
}
