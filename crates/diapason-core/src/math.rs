//! Sample conversion and waveshaping helpers.
//!
//! Everything here is allocation-free and `no_std`.
//!
//! # Conversions
//!
//! - [`i16_to_unit`] / [`unit_to_i16`] - PCM16 to and from the [-1, 1] float domain
//! - [`peak_abs`] - Largest absolute sample in a PCM16 block
//!
//! # Waveshaping
//!
//! | Function | Character |
//! |----------|-----------|
//! | [`hard_clip`] | Flat tops, many odd harmonics |
//! | [`cubic_shape`] | Odd-symmetric `x³`, harsh expansion near full scale |

/// Full-scale positive PCM16 value as a float.
pub const PCM16_MAX: f32 = 32767.0;

/// Full-scale negative PCM16 value as a float.
pub const PCM16_MIN: f32 = -32768.0;

/// Converts a PCM16 sample to the unit range.
///
/// Divides by 32767, so `i16::MIN` maps slightly below -1.0.
#[inline]
pub fn i16_to_unit(sample: i16) -> f32 {
    f32::from(sample) / PCM16_MAX
}

/// Converts a unit-range float back to PCM16.
///
/// Scales by 32767, clamps to the PCM16 range and truncates toward zero.
/// NaN maps to 0.
///
/// ```rust
/// use diapason_core::unit_to_i16;
///
/// assert_eq!(unit_to_i16(1.0), 32767);
/// assert_eq!(unit_to_i16(-2.0), -32768);
/// assert_eq!(unit_to_i16(f32::NAN), 0);
/// ```
#[inline]
pub fn unit_to_i16(value: f32) -> i16 {
    // `as` saturates and sends NaN to zero
    (value * PCM16_MAX).clamp(PCM16_MIN, PCM16_MAX) as i16
}

/// Clamps a PCM-scaled float into the PCM16 range and truncates.
#[inline]
pub fn saturate_i16(value: f32) -> i16 {
    value.clamp(PCM16_MIN, PCM16_MAX) as i16
}

/// Hard clip to `[-threshold, threshold]`.
#[inline]
pub fn hard_clip(x: f32, threshold: f32) -> f32 {
    x.clamp(-threshold, threshold)
}

/// Odd-symmetric cubic waveshaper.
///
/// Input is clamped to [-1, 1] first, so the output is `sign(x)·|x|³`
/// within [-1, 1] for every finite input.
///
/// ```rust
/// use diapason_core::cubic_shape;
///
/// assert_eq!(cubic_shape(0.5), 0.125);
/// assert_eq!(cubic_shape(-0.5), -0.125);
/// assert_eq!(cubic_shape(8.0), 1.0);
/// ```
#[inline]
pub fn cubic_shape(x: f32) -> f32 {
    let x = x.clamp(-1.0, 1.0);
    x * x * x
}

/// Largest absolute value in a PCM16 block, widened so `i16::MIN` fits.
pub fn peak_abs(block: &[i16]) -> u16 {
    block.iter().map(|s| s.unsigned_abs()).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_conversion_extremes() {
        assert_eq!(i16_to_unit(32767), 1.0);
        assert!(i16_to_unit(i16::MIN) < -1.0);
        assert_eq!(unit_to_i16(0.0), 0);
        assert_eq!(unit_to_i16(10.0), 32767);
        assert_eq!(unit_to_i16(f32::NEG_INFINITY), -32768);
    }

    #[test]
    fn test_unit_to_i16_truncates() {
        // 0.5 * 32767 = 16383.5
        assert_eq!(unit_to_i16(0.5), 16383);
        assert_eq!(unit_to_i16(-0.5), -16383);
    }

    #[test]
    fn test_cubic_is_odd() {
        for i in -100..=100 {
            let x = i as f32 / 50.0;
            assert_eq!(cubic_shape(-x), -cubic_shape(x));
        }
    }

    #[test]
    fn test_hard_clip() {
        assert_eq!(hard_clip(0.9, 0.5), 0.5);
        assert_eq!(hard_clip(-0.9, 0.5), -0.5);
        assert_eq!(hard_clip(0.1, 0.5), 0.1);
    }

    #[test]
    fn test_peak_abs() {
        assert_eq!(peak_abs(&[]), 0);
        assert_eq!(peak_abs(&[3, -7, 5]), 7);
        assert_eq!(peak_abs(&[i16::MIN]), 32768);
    }
}
