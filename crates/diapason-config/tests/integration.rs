//! Integration tests for diapason-config.

use diapason_config::{ConfigError, Mode, Settings};
use diapason_touch::{PlayingMode, TimingParams};
use tempfile::TempDir;

#[test]
fn save_and_reload_through_nested_dir() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("settings.toml");

    let mut settings = Settings::default();
    settings.set_volume(6);
    settings.left_handed = true;
    settings.set_playing_mode(PlayingMode::Strum);
    settings.sound.filter.enabled = true;
    settings.sound.filter.cutoff_hz = 2500.0;
    settings.set_capo(-3);
    let mut timing = TimingParams::default();
    timing.release_delay_up();
    settings.set_timing(&timing);
    settings.store_preset(3).unwrap();
    settings.save(&path).unwrap();

    let loaded = Settings::load(&path).unwrap();
    assert_eq!(loaded, settings);
    assert_eq!(loaded.sound.mode, Mode::Strum);
    assert_eq!(loaded.sound.tuning().capo(), -3);
    assert_eq!(loaded.timing().release_delay_ms(), 60);
    assert_eq!(loaded.presets[3].filter.cutoff_hz, 2500.0);
}

#[test]
fn missing_file_gives_defaults() {
    let dir = TempDir::new().unwrap();
    let settings = Settings::load_or_default(dir.path().join("none.toml")).unwrap();
    assert_eq!(settings, Settings::default());
}

#[test]
fn missing_file_is_read_error_on_strict_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("none.toml");
    let err = Settings::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ReadFile { path: ref p, .. } if *p == path));
}

#[test]
fn hand_edited_file_is_clamped() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.toml");
    std::fs::write(
        &path,
        "volume = 99\n[sound]\npatch = 3\n[sound.distortion]\ngain = 1.0\nlevel = 2.0\n",
    )
    .unwrap();

    let settings = Settings::load(&path).unwrap();
    assert_eq!(settings.volume, 8);
    assert_eq!(settings.sound.patch, 3);
    assert_eq!(settings.sound.distortion.gain, 10.0);
    assert_eq!(settings.sound.distortion.level, 1.0);
}
