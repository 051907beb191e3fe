//! Volume scales.
//!
//! The player sets volume in nine steps (0 to 8); the synth works on a
//! 0 to 11 scale, applied to the mix as a linear master gain.

/// Highest UI volume step.
pub const MAX_UI_VOLUME: u8 = 8;
/// Top of the synth volume scale.
pub const MAX_SYNTH_VOLUME: f32 = 11.0;
/// Power-on UI volume.
pub const DEFAULT_UI_VOLUME: u8 = 3;

/// UI step to synth volume. Steps above 8 are treated as 8.
pub fn ui_volume_to_synth(step: u8) -> f32 {
    f32::from(step.min(MAX_UI_VOLUME)) / f32::from(MAX_UI_VOLUME) * MAX_SYNTH_VOLUME
}

/// Linear gain for a synth volume.
pub fn master_gain(synth_volume: f32) -> f32 {
    (synth_volume / MAX_SYNTH_VOLUME).clamp(0.0, 1.0)
}
