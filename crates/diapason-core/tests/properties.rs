//! Property-based tests for diapason-core primitives.

use diapason_core::{Biquad, cubic_shape, hard_clip, i16_to_unit, lowpass_coefficients, unit_to_i16};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Any cutoff ratio and Q in the supported range yields a finite,
    /// bounded response to finite unit-range input.
    #[test]
    fn lowpass_stability(
        ratio in 0.0f32..0.6f32,
        q in 0.5f32..16.0f32,
        input in prop::array::uniform32(-1.0f32..=1.0f32),
    ) {
        let mut bq = Biquad::new();
        bq.set_coefficients(lowpass_coefficients(ratio, q));
        for _ in 0..8 {
            for &x in &input {
                let y = bq.process(x);
                prop_assert!(y.is_finite(), "ratio={} q={} gave {}", ratio, q, y);
                prop_assert!(y.abs() < 64.0, "ratio={} q={} grew to {}", ratio, q, y);
            }
        }
    }

    /// The cubic shaper never leaves [-1, 1].
    #[test]
    fn cubic_shape_bounded(x in -1.0e6f32..1.0e6f32) {
        let y = cubic_shape(x);
        prop_assert!((-1.0..=1.0).contains(&y));
    }

    /// Hard clip respects its threshold.
    #[test]
    fn hard_clip_bounded(x in -10.0f32..10.0f32, t in 0.01f32..2.0f32) {
        prop_assert!(hard_clip(x, t).abs() <= t);
    }

    /// PCM16 → unit → PCM16 loses at most one step.
    #[test]
    fn pcm16_conversion_within_one_step(s in any::<i16>()) {
        let back = unit_to_i16(i16_to_unit(s));
        prop_assert!((i32::from(back) - i32::from(s)).abs() <= 1);
    }
}
