//! Global cubic distortion stage.
//!
//! Runs on the mixed interleaved block before the filter. Drive pushes the
//! signal into an odd-symmetric cubic shaper, a hard clip whose threshold
//! tightens as drive rises adds edge, and a drive-dependent compensation
//! gain keeps loudness roughly constant. `level` crossfades between the
//! clean and distorted signal.

use diapason_core::{BlockEffect, PCM16_MAX, cubic_shape, hard_clip, i16_to_unit, saturate_i16};

/// Lowest internal drive (shown as 1.0 on the instrument).
pub const MIN_GAIN: f32 = 10.0;
/// Highest internal drive (shown as 2.0 on the instrument).
pub const MAX_GAIN: f32 = 20.0;
/// Factory distortion mix.
pub const DEFAULT_LEVEL: f32 = 0.75;
/// Factory drive.
pub const DEFAULT_GAIN: f32 = 10.0;

/// Cubic waveshaping distortion for interleaved PCM16 blocks.
///
/// Parameters are clamped on write, so any state reachable through the
/// setters keeps every output sample inside the PCM16 range.
///
/// # Example
///
/// ```rust
/// use diapason_core::BlockEffect;
/// use diapason_effects::GlobalDistortion;
///
/// let mut dist = GlobalDistortion::new();
/// dist.set_enabled(true);
/// dist.configure(1.0, 20.0);
///
/// let mut block = [8000i16, -8000, 0, 0];
/// dist.process_block(&mut block, 2);
/// assert!(block[0] > 0 && block[1] < 0);
/// ```
#[derive(Debug, Clone)]
pub struct GlobalDistortion {
    enabled: bool,
    level: f32,
    gain: f32,
}

impl Default for GlobalDistortion {
    fn default() -> Self {
        Self::new()
    }
}

impl GlobalDistortion {
    /// Disabled stage with factory level and gain.
    pub fn new() -> Self {
        Self {
            enabled: false,
            level: DEFAULT_LEVEL,
            gain: DEFAULT_GAIN,
        }
    }

    /// Sets mix and drive, clamping to [0, 1] and [10, 20].
    pub fn configure(&mut self, level: f32, gain: f32) {
        self.set_level(level);
        self.set_gain(gain);
    }

    /// Sets the clean/distorted mix, clamped to [0, 1].
    pub fn set_level(&mut self, level: f32) {
        self.level = if level.is_nan() { 0.0 } else { level.clamp(0.0, 1.0) };
    }

    /// Sets the drive, clamped to [`MIN_GAIN`, `MAX_GAIN`].
    pub fn set_gain(&mut self, gain: f32) {
        self.gain = if gain.is_nan() { MIN_GAIN } else { gain.clamp(MIN_GAIN, MAX_GAIN) };
    }

    /// Enables or bypasses the stage.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Whether the stage is switched on.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Current mix.
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Current drive.
    pub fn gain(&self) -> f32 {
        self.gain
    }

    /// Clip threshold for the current drive; shrinks as drive grows.
    #[inline]
    pub fn clip_threshold(&self) -> f32 {
        1.0 / (1.0 + (self.gain - 1.0) * 0.5)
    }

    /// Output compensation for the current drive.
    #[inline]
    pub fn volume_compensation(&self) -> f32 {
        1.0 / (1.0 + (self.gain - 1.0) * 0.4)
    }

    /// Processes one PCM16 sample.
    #[inline]
    pub fn process_sample(&self, sample: i16) -> i16 {
        let clean = i16_to_unit(sample);
        let shaped = cubic_shape(clean * self.gain);
        let distorted = hard_clip(shaped, self.clip_threshold());
        let mixed =
            clean * (1.0 - self.level) + distorted * self.volume_compensation() * self.level;
        saturate_i16(mixed * PCM16_MAX)
    }
}

impl BlockEffect for GlobalDistortion {
    fn process_block(&mut self, block: &mut [i16], _channels: usize) {
        if !self.is_active() {
            return;
        }
        for sample in block.iter_mut() {
            *sample = self.process_sample(*sample);
        }
    }

    fn reset(&mut self) {}

    fn is_active(&self) -> bool {
        self.enabled && self.level > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let dist = GlobalDistortion::new();
        assert!(!dist.enabled());
        assert_eq!(dist.level(), DEFAULT_LEVEL);
        assert_eq!(dist.gain(), DEFAULT_GAIN);
    }

    #[test]
    fn test_configure_clamps() {
        let mut dist = GlobalDistortion::new();
        dist.configure(3.0, 1.5);
        assert_eq!(dist.level(), 1.0);
        assert_eq!(dist.gain(), MIN_GAIN);
        dist.configure(-1.0, 100.0);
        assert_eq!(dist.level(), 0.0);
        assert_eq!(dist.gain(), MAX_GAIN);
        dist.configure(f32::NAN, f32::NAN);
        assert_eq!(dist.level(), 0.0);
        assert_eq!(dist.gain(), MIN_GAIN);
    }

    #[test]
    fn test_zero_level_is_bypass() {
        let mut dist = GlobalDistortion::new();
        dist.set_enabled(true);
        dist.set_level(0.0);
        let mut block = [1234i16, -4321, 32767, -32768];
        let before = block;
        dist.process_block(&mut block, 2);
        assert_eq!(block, before);
    }

    #[test]
    fn test_clip_threshold_tightens_with_drive() {
        let mut dist = GlobalDistortion::new();
        dist.set_gain(10.0);
        let soft = dist.clip_threshold();
        dist.set_gain(20.0);
        assert!(dist.clip_threshold() < soft);
        // 1 / (1 + 19 * 0.5)
        assert!((dist.clip_threshold() - 1.0 / 10.5).abs() < 1e-6);
    }

    #[test]
    fn test_full_mix_known_value() {
        let mut dist = GlobalDistortion::new();
        dist.configure(1.0, 10.0);
        // full-scale input saturates the shaper, then the clip at 1/5.5
        // and the compensation 1/4.6 apply
        let expected = ((1.0f32 / 5.5) * (1.0 / 4.6) * 32767.0) as i16;
        assert_eq!(dist.process_sample(32767), expected);
        assert_eq!(dist.process_sample(-32767), -expected);
        assert_eq!(dist.process_sample(0), 0);
    }

    #[test]
    fn test_half_mix_blends_clean() {
        let mut dist = GlobalDistortion::new();
        dist.configure(0.5, 10.0);
        let out = dist.process_sample(16384);
        let clean_half = (16384.0 / 32767.0) * 0.5 * 32767.0;
        assert!(f32::from(out) > clean_half - 1.0);
    }
}
