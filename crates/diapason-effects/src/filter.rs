//! Global 24 dB/octave low-pass stage.
//!
//! Each channel runs the same RBJ low-pass section twice in cascade. The
//! coefficients are recomputed at the start of every block from the live
//! cutoff and resonance, while the delay lines persist across blocks.

use diapason_core::{Biquad, BlockEffect, PCM16_MAX, i16_to_unit, lowpass_coefficients, saturate_i16};

/// Channels with independent filter state.
pub const MAX_CHANNELS: usize = 2;
/// Cascaded sections per channel.
pub const STAGES: usize = 2;

/// Lowest cutoff accepted by the setters.
pub const MIN_CUTOFF_HZ: f32 = 20.0;
/// Highest cutoff accepted by the setters.
pub const MAX_CUTOFF_HZ: f32 = 20_000.0;
/// Lowest resonance (Q) accepted by the setters.
pub const MIN_RESONANCE: f32 = 0.5;
/// Highest resonance (Q) accepted by the setters.
pub const MAX_RESONANCE: f32 = 16.0;
/// Factory cutoff.
pub const DEFAULT_CUTOFF_HZ: f32 = 1000.0;
/// Factory resonance.
pub const DEFAULT_RESONANCE: f32 = 0.7;

/// Two cascaded low-pass sections: one channel's worth of state.
#[derive(Debug, Clone, Default)]
pub struct Lpf24 {
    stages: [Biquad; STAGES],
}

impl Lpf24 {
    /// Delay elements across both sections.
    pub const DELAYS: usize = STAGES * Biquad::DELAYS;

    /// Retunes both sections to the normalized cutoff `ratio` and `q`.
    pub fn tune(&mut self, ratio: f32, q: f32) {
        let coeffs = lowpass_coefficients(ratio, q);
        for stage in &mut self.stages {
            stage.set_coefficients(coeffs);
        }
    }

    /// Runs one unit-range sample through both sections.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let [first, second] = &mut self.stages;
        second.process(first.process(input))
    }

    /// Zeroes both delay lines.
    pub fn clear(&mut self) {
        for stage in &mut self.stages {
            stage.clear();
        }
    }

    /// True when no history remains in either section.
    pub fn is_idle(&self) -> bool {
        self.stages.iter().all(Biquad::is_idle)
    }
}

/// Resonant 24 dB/oct low-pass over interleaved PCM16 blocks.
///
/// # Example
///
/// ```rust
/// use diapason_core::BlockEffect;
/// use diapason_effects::GlobalFilter;
///
/// let mut filter = GlobalFilter::new(44100.0);
/// filter.set_enabled(true);
/// filter.configure(500.0, 0.7);
///
/// let mut block = [0i16; 512];
/// block[0] = 20000;
/// filter.process_block(&mut block, 2);
/// assert!(block[0] < 20000);
/// ```
#[derive(Debug, Clone)]
pub struct GlobalFilter {
    enabled: bool,
    cutoff_hz: f32,
    resonance: f32,
    sample_rate: f32,
    channels: [Lpf24; MAX_CHANNELS],
}

impl GlobalFilter {
    /// Disabled filter with factory cutoff and resonance.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            enabled: false,
            cutoff_hz: DEFAULT_CUTOFF_HZ,
            resonance: DEFAULT_RESONANCE,
            sample_rate,
            channels: Default::default(),
        }
    }

    /// Sets cutoff and resonance, clamping both.
    pub fn configure(&mut self, cutoff_hz: f32, resonance: f32) {
        self.set_cutoff_hz(cutoff_hz);
        self.set_resonance(resonance);
    }

    /// Sets the cutoff, clamped to [20, 20000] Hz.
    pub fn set_cutoff_hz(&mut self, cutoff_hz: f32) {
        self.cutoff_hz = if cutoff_hz.is_nan() {
            DEFAULT_CUTOFF_HZ
        } else {
            cutoff_hz.clamp(MIN_CUTOFF_HZ, MAX_CUTOFF_HZ)
        };
    }

    /// Sets the resonance (Q), clamped to [0.5, 16].
    pub fn set_resonance(&mut self, resonance: f32) {
        self.resonance = if resonance.is_nan() {
            DEFAULT_RESONANCE
        } else {
            resonance.clamp(MIN_RESONANCE, MAX_RESONANCE)
        };
    }

    /// Switches the stage. Switching off clears every delay line so the
    /// next enable starts from silence.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.reset();
        }
    }

    /// Updates the sample rate used to normalize the cutoff.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
    }

    /// Whether the stage is switched on.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Current cutoff in Hz.
    pub fn cutoff_hz(&self) -> f32 {
        self.cutoff_hz
    }

    /// Current resonance.
    pub fn resonance(&self) -> f32 {
        self.resonance
    }

    /// Normalized cutoff fed to the coefficient design.
    pub fn cutoff_ratio(&self) -> f32 {
        self.cutoff_hz / self.sample_rate
    }

    /// True when every channel's delay line is zero.
    pub fn is_idle(&self) -> bool {
        self.channels.iter().all(Lpf24::is_idle)
    }
}

impl BlockEffect for GlobalFilter {
    fn process_block(&mut self, block: &mut [i16], channels: usize) {
        if !self.enabled || channels == 0 {
            return;
        }
        let ratio = self.cutoff_ratio();
        let q = self.resonance;

        for (c, state) in self.channels.iter_mut().enumerate().take(channels) {
            state.tune(ratio, q);

            let silent_input = block.iter().skip(c).step_by(channels).all(|&s| s == 0);
            if silent_input && state.is_idle() {
                continue;
            }

            for sample in block.iter_mut().skip(c).step_by(channels) {
                *sample = saturate_i16(state.process(i16_to_unit(*sample)) * PCM16_MAX);
            }
        }
    }

    fn reset(&mut self) {
        for state in &mut self.channels {
            state.clear();
        }
    }

    fn is_active(&self) -> bool {
        self.enabled
    }
}

/// Peak of one channel in an interleaved block.
pub fn channel_peak(block: &[i16], channel: usize, channels: usize) -> u16 {
    if channels == 0 {
        return 0;
    }
    block.iter().skip(channel).step_by(channels).map(|s| s.unsigned_abs()).max().unwrap_or(0)
}
