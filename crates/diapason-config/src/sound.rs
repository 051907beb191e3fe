//! The part of the settings a preset captures.

use diapason_effects::distortion::{DEFAULT_GAIN, DEFAULT_LEVEL, MAX_GAIN, MIN_GAIN};
use diapason_effects::filter::{
    DEFAULT_CUTOFF_HZ, DEFAULT_RESONANCE, MAX_CUTOFF_HZ, MAX_RESONANCE, MIN_CUTOFF_HZ,
    MIN_RESONANCE,
};
use diapason_synth::DEFAULT_PATCH;
use diapason_touch::{DEFAULT_PITCHES, PlayingMode, STRINGS, Tuning};
use serde::{Deserialize, Serialize};

/// Playing mode as written in the settings file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Every fret is a key.
    #[default]
    Tapping,
    /// Frets select, the last column strums.
    Strum,
}

impl From<Mode> for PlayingMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Tapping => PlayingMode::Tapping,
            Mode::Strum => PlayingMode::Strum,
        }
    }
}

impl From<PlayingMode> for Mode {
    fn from(mode: PlayingMode) -> Self {
        match mode {
            PlayingMode::Tapping => Mode::Tapping,
            PlayingMode::Strum => Mode::Strum,
        }
    }
}

/// Distortion stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistortionSettings {
    /// Stage on.
    pub enabled: bool,
    /// Wet mix, 0 to 1.
    pub level: f32,
    /// Drive, 10 to 20.
    pub gain: f32,
}

impl Default for DistortionSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            level: DEFAULT_LEVEL,
            gain: DEFAULT_GAIN,
        }
    }
}

/// Low-pass filter stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    /// Stage on.
    pub enabled: bool,
    /// Cutoff in Hz.
    pub cutoff_hz: f32,
    /// Q.
    pub resonance: f32,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            cutoff_hz: DEFAULT_CUTOFF_HZ,
            resonance: DEFAULT_RESONANCE,
        }
    }
}

/// Open-string pitches and capo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TuningSettings {
    /// MIDI note of each open string.
    pub pitches: [u8; STRINGS],
    /// Semitone offset, ±24.
    pub capo: i8,
}

impl Default for TuningSettings {
    fn default() -> Self {
        Self {
            pitches: DEFAULT_PITCHES,
            capo: 0,
        }
    }
}

impl From<TuningSettings> for Tuning {
    fn from(t: TuningSettings) -> Self {
        Tuning::new(t.pitches, t.capo)
    }
}

/// Patch, effects, tuning and mode: everything a preset slot stores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sound {
    /// Synth patch number.
    pub patch: u8,
    /// Playing mode.
    pub mode: Mode,
    /// Distortion stage.
    pub distortion: DistortionSettings,
    /// Filter stage.
    pub filter: FilterSettings,
    /// String tuning.
    pub tuning: TuningSettings,
}

impl Default for Sound {
    fn default() -> Self {
        Self {
            patch: DEFAULT_PATCH,
            mode: Mode::Tapping,
            distortion: DistortionSettings::default(),
            filter: FilterSettings::default(),
            tuning: TuningSettings::default(),
        }
    }
}

/// Clamps to `[min, max]`; NaN becomes `fallback`.
fn clamp_or(v: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if v.is_nan() { fallback } else { v.clamp(min, max) }
}

impl Sound {
    /// Factory sound with a different patch.
    pub fn with_patch(patch: u8) -> Self {
        Self {
            patch,
            ..Self::default()
        }
    }

    /// Pulls every field into range.
    pub fn sanitize(&mut self) {
        let d = &mut self.distortion;
        d.level = clamp_or(d.level, 0.0, 1.0, DEFAULT_LEVEL);
        d.gain = clamp_or(d.gain, MIN_GAIN, MAX_GAIN, DEFAULT_GAIN);

        let f = &mut self.filter;
        f.cutoff_hz = clamp_or(f.cutoff_hz, MIN_CUTOFF_HZ, MAX_CUTOFF_HZ, DEFAULT_CUTOFF_HZ);
        f.resonance = clamp_or(f.resonance, MIN_RESONANCE, MAX_RESONANCE, DEFAULT_RESONANCE);

        // Tuning owns the pitch and capo limits
        let tuning = Tuning::from(self.tuning);
        self.tuning = TuningSettings {
            pitches: tuning.pitches(),
            capo: tuning.capo(),
        };
    }

    /// Tuning for the arbiter.
    pub fn tuning(&self) -> Tuning {
        self.tuning.into()
    }

    /// Playing mode for the arbiter.
    pub fn playing_mode(&self) -> PlayingMode {
        self.mode.into()
    }
}
