//! Preset slots as shipped.
//!
//! All four use the factory tuning, tapping mode and both effects off;
//! they differ only in patch.

use crate::NUM_PRESETS;
use crate::sound::Sound;

/// Patch of each factory slot.
pub const FACTORY_PATCHES: [u8; NUM_PRESETS] = [226, 241, 40, 239];

/// The factory preset slots.
pub fn factory_presets() -> [Sound; NUM_PRESETS] {
    FACTORY_PATCHES.map(Sound::with_patch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sound::Mode;

    #[test]
    fn slot_zero_is_the_default_sound() {
        assert_eq!(factory_presets()[0], Sound::default());
    }

    #[test]
    fn all_slots_tap_with_effects_off() {
        for preset in factory_presets() {
            assert_eq!(preset.mode, Mode::Tapping);
            assert!(!preset.distortion.enabled);
            assert!(!preset.filter.enabled);
        }
    }
}
