//! Biquad (bi-quadratic) filter section.
//!
//! A second-order IIR section in Direct Form I. Coefficients come from the
//! RBJ Audio EQ Cookbook low-pass design, parameterized by the normalized
//! cutoff `f / fs` so callers that recompute per block never touch the
//! sample rate twice.

use core::f32::consts::PI;
use libm::{cosf, sinf};

/// Lowest normalized cutoff accepted by [`lowpass_coefficients`].
pub const MIN_CUTOFF_RATIO: f32 = 0.0001;

/// Highest normalized cutoff accepted by [`lowpass_coefficients`].
///
/// Kept below Nyquist (0.5) so the section never aliases.
pub const MAX_CUTOFF_RATIO: f32 = 0.45;

/// Normalized biquad coefficients (`a0 == 1`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefficients {
    /// Feedforward coefficient for x[n].
    pub b0: f32,
    /// Feedforward coefficient for x[n-1].
    pub b1: f32,
    /// Feedforward coefficient for x[n-2].
    pub b2: f32,
    /// Feedback coefficient for y[n-1].
    pub a1: f32,
    /// Feedback coefficient for y[n-2].
    pub a2: f32,
}

impl Coefficients {
    /// Identity section: `y[n] = x[n]`.
    pub const PASSTHROUGH: Self = Self {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    /// Builds normalized coefficients from the raw cookbook terms.
    pub fn from_raw(b0: f32, b1: f32, b2: f32, a0: f32, a1: f32, a2: f32) -> Self {
        let a0_inv = 1.0 / a0;
        Self {
            b0: b0 * a0_inv,
            b1: b1 * a0_inv,
            b2: b2 * a0_inv,
            a1: a1 * a0_inv,
            a2: a2 * a0_inv,
        }
    }
}

impl Default for Coefficients {
    fn default() -> Self {
        Self::PASSTHROUGH
    }
}

/// Second-order IIR section with its own delay line.
///
/// ```text
/// y[n] = b0*x[n] + b1*x[n-1] + b2*x[n-2]
///                - a1*y[n-1] - a2*y[n-2]
/// ```
///
/// Each section holds four delays (two input, two output).
#[derive(Debug, Clone, Default)]
pub struct Biquad {
    coeffs: Coefficients,
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl Biquad {
    /// Number of delay elements held by one section.
    pub const DELAYS: usize = 4;

    /// Creates a passthrough section with cleared state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the coefficients, keeping the delay line.
    ///
    /// Keeping the history lets callers retune every block without clicks.
    #[inline]
    pub fn set_coefficients(&mut self, coeffs: Coefficients) {
        self.coeffs = coeffs;
    }

    /// Current coefficients.
    pub fn coefficients(&self) -> Coefficients {
        self.coeffs
    }

    /// Processes one sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let c = &self.coeffs;
        let output = c.b0 * input + c.b1 * self.x1 + c.b2 * self.x2 - c.a1 * self.y1 - c.a2 * self.y2;

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;

        output
    }

    /// Clears the delay line without touching the coefficients.
    pub fn clear(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }

    /// Largest absolute value held in the delay line.
    pub fn state_peak(&self) -> f32 {
        self.x1.abs().max(self.x2.abs()).max(self.y1.abs()).max(self.y2.abs())
    }

    /// True when every delay element is exactly zero.
    pub fn is_idle(&self) -> bool {
        self.state_peak() == 0.0
    }
}

/// Low-pass coefficients from a normalized cutoff and Q.
///
/// `ratio` is `cutoff_hz / sample_rate` and is clamped to
/// [`MIN_CUTOFF_RATIO`, `MAX_CUTOFF_RATIO`]. `q` must be positive.
///
/// # Example
///
/// ```rust
/// use diapason_core::{Biquad, lowpass_coefficients};
///
/// let mut lpf = Biquad::new();
/// lpf.set_coefficients(lowpass_coefficients(1000.0 / 44100.0, 0.707));
/// let y = lpf.process(1.0);
/// assert!(y > 0.0 && y < 1.0);
/// ```
pub fn lowpass_coefficients(ratio: f32, q: f32) -> Coefficients {
    let ratio = ratio.clamp(MIN_CUTOFF_RATIO, MAX_CUTOFF_RATIO);
    let omega = 2.0 * PI * ratio;
    let cos_omega = cosf(omega);
    let alpha = sinf(omega) / (2.0 * q);

    let b1 = 1.0 - cos_omega;
    let b0 = b1 / 2.0;
    Coefficients::from_raw(b0, b1, b0, 1.0 + alpha, -2.0 * cos_omega, 1.0 - alpha)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passthrough() {
        let mut bq = Biquad::new();
        for x in [0.5, -0.25, 1.0, 0.0] {
            assert_eq!(bq.process(x), x);
        }
    }

    #[test]
    fn test_lowpass_unity_dc_gain() {
        let mut bq = Biquad::new();
        bq.set_coefficients(lowpass_coefficients(0.02, 0.707));
        let mut y = 0.0;
        for _ in 0..20_000 {
            y = bq.process(1.0);
        }
        assert!((y - 1.0).abs() < 1e-3, "DC gain was {y}");
    }

    #[test]
    fn test_lowpass_attenuates_nyquist() {
        let mut bq = Biquad::new();
        bq.set_coefficients(lowpass_coefficients(0.01, 0.707));
        let mut peak = 0.0f32;
        for i in 0..4096 {
            let x = if i % 2 == 0 { 1.0 } else { -1.0 };
            let y = bq.process(x);
            if i > 1024 {
                peak = peak.max(y.abs());
            }
        }
        assert!(peak < 0.01, "nyquist leaked through at {peak}");
    }

    #[test]
    fn test_ratio_is_clamped() {
        assert_eq!(lowpass_coefficients(0.9, 1.0), lowpass_coefficients(MAX_CUTOFF_RATIO, 1.0));
        assert_eq!(lowpass_coefficients(0.0, 1.0), lowpass_coefficients(MIN_CUTOFF_RATIO, 1.0));
    }

    #[test]
    fn test_clear_and_idle() {
        let mut bq = Biquad::new();
        bq.set_coefficients(lowpass_coefficients(0.1, 2.0));
        assert!(bq.is_idle());
        bq.process(0.7);
        assert!(!bq.is_idle());
        assert!(bq.state_peak() > 0.0);
        bq.clear();
        assert!(bq.is_idle());
    }

    #[test]
    fn test_retune_keeps_history() {
        let mut bq = Biquad::new();
        bq.set_coefficients(lowpass_coefficients(0.1, 0.707));
        bq.process(1.0);
        bq.set_coefficients(lowpass_coefficients(0.2, 0.707));
        assert!(!bq.is_idle());
    }
}
