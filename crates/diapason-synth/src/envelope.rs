//! Amplitude envelope for a plucked-string voice.
//!
//! One-pole exponential segments. The attack aims past full scale so it
//! lands on 1.0 in finite time; decay settles onto the sustain level and
//! release falls to silence, at which point the envelope goes idle.

use libm::expf;

/// Envelope segment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Stage {
    /// Silent.
    #[default]
    Idle,
    /// Rising toward full scale.
    Attack,
    /// Falling toward sustain.
    Decay,
    /// Holding while the note is down.
    Sustain,
    /// Falling to silence after note-off.
    Release,
}

const ATTACK_TARGET: f32 = 1.2;
const SILENCE: f32 = 1.0e-4;

/// Segment times and sustain level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnvelopeShape {
    /// Attack time in ms.
    pub attack_ms: f32,
    /// Decay time in ms.
    pub decay_ms: f32,
    /// Sustain level, 0 to 1.
    pub sustain: f32,
    /// Release time in ms.
    pub release_ms: f32,
}

impl Default for EnvelopeShape {
    fn default() -> Self {
        Self {
            attack_ms: 5.0,
            decay_ms: 300.0,
            sustain: 0.6,
            release_ms: 250.0,
        }
    }
}

/// ADSR envelope.
#[derive(Debug, Clone)]
pub struct Envelope {
    stage: Stage,
    level: f32,
    sample_rate: f32,
    shape: EnvelopeShape,
    attack_coeff: f32,
    decay_coeff: f32,
    release_coeff: f32,
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

fn coeff(ms: f32, sample_rate: f32) -> f32 {
    let samples = ms * 0.001 * sample_rate;
    expf(-1.0 / samples.max(1.0))
}

impl Envelope {
    /// Idle envelope with the default shape.
    pub fn new(sample_rate: f32) -> Self {
        let mut env = Self {
            stage: Stage::Idle,
            level: 0.0,
            sample_rate,
            shape: EnvelopeShape::default(),
            attack_coeff: 0.0,
            decay_coeff: 0.0,
            release_coeff: 0.0,
        };
        env.set_shape(EnvelopeShape::default());
        env
    }

    /// Replaces the shape. Times below 0.1 ms and sustain outside [0, 1]
    /// are clamped.
    pub fn set_shape(&mut self, shape: EnvelopeShape) {
        self.shape = EnvelopeShape {
            attack_ms: shape.attack_ms.max(0.1),
            decay_ms: shape.decay_ms.max(0.1),
            sustain: shape.sustain.clamp(0.0, 1.0),
            release_ms: shape.release_ms.max(0.1),
        };
        self.recalculate();
    }

    /// Current shape.
    pub fn shape(&self) -> EnvelopeShape {
        self.shape
    }

    /// Changes sample rate and recomputes the segment coefficients.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.recalculate();
    }

    fn recalculate(&mut self) {
        self.attack_coeff = coeff(self.shape.attack_ms, self.sample_rate);
        self.decay_coeff = coeff(self.shape.decay_ms, self.sample_rate);
        self.release_coeff = coeff(self.shape.release_ms, self.sample_rate);
    }

    /// Starts the attack from the current level.
    pub fn gate_on(&mut self) {
        self.stage = Stage::Attack;
    }

    /// Enters release unless idle.
    pub fn gate_off(&mut self) {
        if self.stage != Stage::Idle {
            self.stage = Stage::Release;
        }
    }

    /// Silences immediately.
    pub fn reset(&mut self) {
        self.stage = Stage::Idle;
        self.level = 0.0;
    }

    /// Current segment.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Last output level.
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Anything but idle.
    pub fn is_active(&self) -> bool {
        self.stage != Stage::Idle
    }

    /// Advances one sample.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        match self.stage {
            Stage::Idle => self.level = 0.0,
            Stage::Attack => {
                self.level = ATTACK_TARGET + (self.level - ATTACK_TARGET) * self.attack_coeff;
                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.stage = Stage::Decay;
                }
            }
            Stage::Decay => {
                let sustain = self.shape.sustain;
                self.level = sustain + (self.level - sustain) * self.decay_coeff;
                if (self.level - sustain).abs() < SILENCE {
                    self.level = sustain;
                    self.stage = Stage::Sustain;
                }
            }
            Stage::Sustain => self.level = self.shape.sustain,
            Stage::Release => {
                self.level *= self.release_coeff;
                if self.level < SILENCE {
                    self.level = 0.0;
                    self.stage = Stage::Idle;
                }
            }
        }
        self.level
    }
}
