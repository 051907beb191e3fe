//! The settings file.

use std::path::Path;

use diapason_synth::{DEFAULT_UI_VOLUME, MAX_UI_VOLUME};
use diapason_touch::{PlayingMode, STRINGS, TimingParams, Tuning};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::factory_presets::factory_presets;
use crate::paths::ensure_parent_dir;
use crate::sound::Sound;
use crate::NUM_PRESETS;

/// Arbiter timing windows as written in the settings file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingSettings {
    /// Strum look-back window.
    pub snapshot_window_ms: u64,
    /// Age after which a touch no longer counts for a strum.
    pub stale_timeout_ms: u64,
    /// Touches this fresh beat older ones in a strum.
    pub very_recent_threshold_ms: u64,
    /// Fret changes this soon after a strum retrigger the note.
    pub post_strum_threshold_ms: u64,
    /// Wait before a released fret stops its note.
    pub release_delay_ms: u64,
}

impl Default for TimingSettings {
    fn default() -> Self {
        TimingParams::default().into()
    }
}

impl From<TimingParams> for TimingSettings {
    fn from(t: TimingParams) -> Self {
        Self {
            snapshot_window_ms: t.snapshot_window_ms(),
            stale_timeout_ms: t.stale_timeout_ms(),
            very_recent_threshold_ms: t.very_recent_threshold_ms(),
            post_strum_threshold_ms: t.post_strum_threshold_ms(),
            release_delay_ms: t.release_delay_ms(),
        }
    }
}

impl From<TimingSettings> for TimingParams {
    fn from(t: TimingSettings) -> Self {
        let mut params = TimingParams::default();
        params.set_snapshot_window_ms(t.snapshot_window_ms);
        params.set_stale_timeout_ms(t.stale_timeout_ms);
        params.set_very_recent_threshold_ms(t.very_recent_threshold_ms);
        params.set_post_strum_threshold_ms(t.post_strum_threshold_ms);
        params.set_release_delay_ms(t.release_delay_ms);
        params
    }
}

/// Everything the instrument remembers between sessions.
///
/// # TOML Format
///
/// ```toml
/// volume = 3
/// left_handed = false
///
/// [sound]
/// patch = 226
/// mode = "tapping"
///
/// [sound.distortion]
/// enabled = false
/// level = 0.75
/// gain = 10.0
///
/// [sound.filter]
/// enabled = false
/// cutoff_hz = 1000.0
/// resonance = 0.7
///
/// [sound.tuning]
/// pitches = [55, 50, 45, 40]
/// capo = 0
///
/// [timing]
/// snapshot_window_ms = 100
/// stale_timeout_ms = 5000
/// very_recent_threshold_ms = 50
/// post_strum_threshold_ms = 30
/// release_delay_ms = 50
///
/// [[presets]]
/// patch = 226
/// # ...
/// ```
///
/// Missing fields take their factory values and out-of-range values are
/// clamped on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// UI volume step, 0 to 8.
    pub volume: u8,
    /// Mirror the electrode layout.
    pub left_handed: bool,
    /// Active sound.
    pub sound: Sound,
    /// Arbiter timing.
    pub timing: TimingSettings,
    /// Stored preset slots.
    pub presets: Vec<Sound>,
}

impl Default for Settings {
    fn default() -> Self {
        let presets = factory_presets();
        Self {
            volume: DEFAULT_UI_VOLUME,
            left_handed: false,
            sound: presets[0],
            timing: TimingSettings::default(),
            presets: presets.to_vec(),
        }
    }
}

impl Settings {
    /// Loads and sanitizes a settings file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let settings = Self::from_toml(&contents)?;
        tracing::debug!(path = %path.display(), "settings loaded");
        Ok(settings)
    }

    /// Like [`load`](Self::load), but a missing file yields the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            tracing::info!(path = %path.display(), "no settings file, using defaults");
            Ok(Self::default())
        }
    }

    /// Writes the settings, creating the parent directory if needed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        ensure_parent_dir(path)?;
        let contents = self.to_toml()?;
        std::fs::write(path, contents).map_err(|e| ConfigError::write_file(path, e))?;
        tracing::debug!(path = %path.display(), "settings saved");
        Ok(())
    }

    /// Parses and sanitizes TOML.
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        let mut settings: Self = toml::from_str(s)?;
        settings.sanitize();
        Ok(settings)
    }

    /// Serializes to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Pulls every field into range and restores missing preset slots.
    pub fn sanitize(&mut self) {
        self.volume = self.volume.min(MAX_UI_VOLUME);
        self.sound.sanitize();
        self.timing = TimingParams::from(self.timing).into();

        let factory = factory_presets();
        self.presets.truncate(NUM_PRESETS);
        let have = self.presets.len();
        self.presets.extend_from_slice(&factory[have..]);
        for preset in &mut self.presets {
            preset.sanitize();
        }
    }

    /// Sets the UI volume, clamped to 8.
    pub fn set_volume(&mut self, step: u8) {
        self.volume = step.min(MAX_UI_VOLUME);
    }

    /// One volume step up.
    pub fn volume_up(&mut self) {
        self.set_volume(self.volume.saturating_add(1));
    }

    /// One volume step down.
    pub fn volume_down(&mut self) {
        self.set_volume(self.volume.saturating_sub(1));
    }

    /// Stores a tuning, already clamped by [`Tuning`].
    pub fn set_tuning(&mut self, tuning: &Tuning) {
        self.sound.tuning.pitches = tuning.pitches();
        self.sound.tuning.capo = tuning.capo();
    }

    /// Sets one open-string pitch through [`Tuning`] so it stays in range.
    pub fn set_pitch(&mut self, string: u8, pitch: u8) {
        if usize::from(string) < STRINGS {
            let mut tuning = self.sound.tuning();
            tuning.set_pitch(string, pitch);
            self.set_tuning(&tuning);
        }
    }

    /// Sets the capo, clamped to ±24.
    pub fn set_capo(&mut self, capo: i8) {
        let mut tuning = self.sound.tuning();
        tuning.set_capo(capo);
        self.set_tuning(&tuning);
    }

    /// Stores timing windows, already clamped by [`TimingParams`].
    pub fn set_timing(&mut self, timing: &TimingParams) {
        self.timing = (*timing).into();
    }

    /// Sets the playing mode.
    pub fn set_playing_mode(&mut self, mode: PlayingMode) {
        self.sound.mode = mode.into();
    }

    /// Timing for the arbiter.
    pub fn timing(&self) -> TimingParams {
        self.timing.into()
    }

    /// Copies preset `slot` (0-based) into the active sound.
    pub fn apply_preset(&mut self, slot: usize) -> Result<(), ConfigError> {
        let preset = *self
            .presets
            .get(slot)
            .ok_or(ConfigError::UnknownPreset(slot))?;
        self.sound = preset;
        tracing::info!(slot, patch = preset.patch, "preset applied");
        Ok(())
    }

    /// Saves the active sound into preset `slot` (0-based).
    pub fn store_preset(&mut self, slot: usize) -> Result<(), ConfigError> {
        let target = self
            .presets
            .get_mut(slot)
            .ok_or(ConfigError::UnknownPreset(slot))?;
        *target = self.sound;
        tracing::info!(slot, "preset stored");
        Ok(())
    }

    /// Restores the factory preset slots. The active sound is unchanged.
    pub fn reset_presets(&mut self) {
        self.presets = factory_presets().to_vec();
    }
}
