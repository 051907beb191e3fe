//! Effect and voice parameters shared between the control side and the
//! render loop.
//!
//! Writers clamp and store with `Release`; the render loop takes one
//! [`ParamSnapshot`] per block with `Acquire` loads, so a block never sees
//! a half-applied change to a single parameter.

use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU32, Ordering};

use diapason_effects::distortion::{DEFAULT_GAIN, DEFAULT_LEVEL, MAX_GAIN, MIN_GAIN};
use diapason_effects::filter::{
    DEFAULT_CUTOFF_HZ, DEFAULT_RESONANCE, MAX_CUTOFF_HZ, MAX_RESONANCE, MIN_CUTOFF_HZ,
    MIN_RESONANCE,
};
use diapason_synth::{DEFAULT_PATCH, DEFAULT_UI_VOLUME, MAX_UI_VOLUME};

/// Lock-free f32 with a fixed range.
#[derive(Debug)]
pub struct AtomicParam {
    value: AtomicU32,
    min: f32,
    max: f32,
    default: f32,
}

impl AtomicParam {
    /// Parameter starting at `default`.
    pub fn new(default: f32, min: f32, max: f32) -> Self {
        Self {
            value: AtomicU32::new(default.clamp(min, max).to_bits()),
            min,
            max,
            default,
        }
    }

    /// Stores `v` clamped to the range.
    #[inline]
    pub fn set(&self, v: f32) {
        self.value
            .store(v.clamp(self.min, self.max).to_bits(), Ordering::Release);
    }

    /// Current value.
    #[inline]
    pub fn get(&self) -> f32 {
        f32::from_bits(self.value.load(Ordering::Acquire))
    }

    /// Lower bound.
    pub fn min(&self) -> f32 {
        self.min
    }

    /// Upper bound.
    pub fn max(&self) -> f32 {
        self.max
    }

    /// Back to the starting value.
    pub fn reset(&self) {
        self.set(self.default);
    }
}

/// Everything the render loop reads once per block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSnapshot {
    /// Distortion stage on.
    pub distortion_enabled: bool,
    /// Distortion wet mix, 0 to 1.
    pub distortion_level: f32,
    /// Distortion drive, 10 to 20.
    pub distortion_gain: f32,
    /// Filter stage on.
    pub filter_enabled: bool,
    /// Filter cutoff in Hz.
    pub filter_cutoff_hz: f32,
    /// Filter Q.
    pub filter_resonance: f32,
    /// UI volume step, 0 to 8.
    pub volume: u8,
    /// Patch number.
    pub patch: u8,
}

/// Shared parameter block.
///
/// ```rust
/// use diapason_audio::EngineParams;
///
/// let params = EngineParams::default();
/// params.set_filter_cutoff_hz(5.0);
/// params.set_volume(12);
/// let snap = params.snapshot();
/// assert_eq!(snap.filter_cutoff_hz, 20.0);
/// assert_eq!(snap.volume, 8);
/// ```
#[derive(Debug)]
pub struct EngineParams {
    distortion_enabled: AtomicBool,
    distortion_level: AtomicParam,
    distortion_gain: AtomicParam,
    filter_enabled: AtomicBool,
    filter_cutoff_hz: AtomicParam,
    filter_resonance: AtomicParam,
    volume: AtomicU8,
    patch: AtomicU8,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            distortion_enabled: AtomicBool::new(false),
            distortion_level: AtomicParam::new(DEFAULT_LEVEL, 0.0, 1.0),
            distortion_gain: AtomicParam::new(DEFAULT_GAIN, MIN_GAIN, MAX_GAIN),
            filter_enabled: AtomicBool::new(false),
            filter_cutoff_hz: AtomicParam::new(DEFAULT_CUTOFF_HZ, MIN_CUTOFF_HZ, MAX_CUTOFF_HZ),
            filter_resonance: AtomicParam::new(DEFAULT_RESONANCE, MIN_RESONANCE, MAX_RESONANCE),
            volume: AtomicU8::new(DEFAULT_UI_VOLUME),
            patch: AtomicU8::new(DEFAULT_PATCH),
        }
    }
}

impl EngineParams {
    /// Turns the distortion stage on or off.
    pub fn set_distortion_enabled(&self, on: bool) {
        self.distortion_enabled.store(on, Ordering::Release);
    }

    /// Distortion wet mix, clamped to [0, 1].
    pub fn set_distortion_level(&self, level: f32) {
        self.distortion_level.set(level);
    }

    /// Distortion drive, clamped to [10, 20].
    pub fn set_distortion_gain(&self, gain: f32) {
        self.distortion_gain.set(gain);
    }

    /// Turns the filter stage on or off.
    pub fn set_filter_enabled(&self, on: bool) {
        self.filter_enabled.store(on, Ordering::Release);
    }

    /// Filter cutoff, clamped to [20, 20000] Hz.
    pub fn set_filter_cutoff_hz(&self, hz: f32) {
        self.filter_cutoff_hz.set(hz);
    }

    /// Filter Q, clamped to [0.5, 16].
    pub fn set_filter_resonance(&self, q: f32) {
        self.filter_resonance.set(q);
    }

    /// UI volume step, clamped to 8.
    pub fn set_volume(&self, step: u8) {
        self.volume.store(step.min(MAX_UI_VOLUME), Ordering::Release);
    }

    /// Patch number.
    pub fn set_patch(&self, patch: u8) {
        self.patch.store(patch, Ordering::Release);
    }

    /// Reads every parameter once.
    pub fn snapshot(&self) -> ParamSnapshot {
        ParamSnapshot {
            distortion_enabled: self.distortion_enabled.load(Ordering::Acquire),
            distortion_level: self.distortion_level.get(),
            distortion_gain: self.distortion_gain.get(),
            filter_enabled: self.filter_enabled.load(Ordering::Acquire),
            filter_cutoff_hz: self.filter_cutoff_hz.get(),
            filter_resonance: self.filter_resonance.get(),
            volume: self.volume.load(Ordering::Acquire),
            patch: self.patch.load(Ordering::Acquire),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atomic_param_clamps() {
        let p = AtomicParam::new(0.5, 0.0, 1.0);
        p.set(3.0);
        assert_eq!(p.get(), 1.0);
        p.set(-3.0);
        assert_eq!(p.get(), 0.0);
        p.reset();
        assert_eq!(p.get(), 0.5);
    }

    #[test]
    fn test_factory_snapshot() {
        let snap = EngineParams::default().snapshot();
        assert!(!snap.distortion_enabled);
        assert!(!snap.filter_enabled);
        assert_eq!(snap.distortion_level, 0.75);
        assert_eq!(snap.distortion_gain, 10.0);
        assert_eq!(snap.filter_cutoff_hz, 1000.0);
        assert_eq!(snap.filter_resonance, 0.7);
        assert_eq!(snap.volume, 3);
        assert_eq!(snap.patch, 226);
    }

    #[test]
    fn test_setters_clamp() {
        let params = EngineParams::default();
        params.set_distortion_gain(50.0);
        params.set_distortion_level(-1.0);
        params.set_filter_resonance(0.1);
        let snap = params.snapshot();
        assert_eq!(snap.distortion_gain, 20.0);
        assert_eq!(snap.distortion_level, 0.0);
        assert_eq!(snap.filter_resonance, 0.5);
    }
}
