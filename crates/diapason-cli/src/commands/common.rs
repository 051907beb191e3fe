//! Helpers shared by commands.

use std::path::{Path, PathBuf};

use diapason_audio::EngineParams;
use diapason_config::{Settings, default_settings_path};

/// Explicit settings path, or the platform default.
pub fn settings_path(explicit: Option<&Path>) -> PathBuf {
    explicit.map_or_else(default_settings_path, Path::to_path_buf)
}

/// Pushes volume, patch and effect settings into the engine parameters.
pub fn apply_sound(params: &EngineParams, settings: &Settings) {
    let sound = &settings.sound;
    params.set_volume(settings.volume);
    params.set_patch(sound.patch);
    params.set_distortion_enabled(sound.distortion.enabled);
    params.set_distortion_level(sound.distortion.level);
    params.set_distortion_gain(sound.distortion.gain);
    params.set_filter_enabled(sound.filter.enabled);
    params.set_filter_cutoff_hz(sound.filter.cutoff_hz);
    params.set_filter_resonance(sound.filter.resonance);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_sound_copies_every_field() {
        let mut settings = Settings::default();
        settings.set_volume(7);
        settings.sound.patch = 4;
        settings.sound.filter.enabled = true;
        settings.sound.filter.cutoff_hz = 3000.0;
        settings.sound.distortion.gain = 15.0;

        let params = EngineParams::default();
        apply_sound(&params, &settings);
        let snap = params.snapshot();
        assert_eq!(snap.volume, 7);
        assert_eq!(snap.patch, 4);
        assert!(snap.filter_enabled);
        assert!(!snap.distortion_enabled);
        assert_eq!(snap.filter_cutoff_hz, 3000.0);
        assert_eq!(snap.distortion_gain, 15.0);
    }

    #[test]
    fn explicit_path_wins() {
        assert_eq!(settings_path(Some(Path::new("x.toml"))), PathBuf::from("x.toml"));
        assert_eq!(settings_path(None), default_settings_path());
    }
}
