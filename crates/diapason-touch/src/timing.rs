//! Adjustable arbitration timing.
//!
//! Five windows are user-adjustable, each clamped on write. Three more are
//! fixed constants of the instrument.
//!
//! | Parameter | Default | Range | Step |
//! |-----------|---------|-------|------|
//! | snapshot window | 100 | 10..=1000 | 10 |
//! | stale timeout | 5000 | 100..=30000 | 100 |
//! | very recent | 50 | 10..=500 | 10 |
//! | post strum | 30 | 10..=500 | 10 |
//! | release delay | 50 | 0..=500 | 10 |

use core::ops::RangeInclusive;

/// Transitions on one electrode closer than this are ignored.
pub const DEBOUNCE_MS: u64 = 20;
/// A released fret still counts as held for this long.
pub const RELEASE_TOLERANCE_MS: u64 = 25;
/// Open strings keep ringing this long after the strum is released.
pub const OPEN_STRING_SUSTAIN_MS: u64 = 3000;

/// Snapshot window limits.
pub const SNAPSHOT_WINDOW_RANGE: RangeInclusive<u64> = 10..=1000;
/// Stale timeout limits.
pub const STALE_TIMEOUT_RANGE: RangeInclusive<u64> = 100..=30_000;
/// Very-recent threshold limits.
pub const VERY_RECENT_RANGE: RangeInclusive<u64> = 10..=500;
/// Post-strum (hammer-on) window limits.
pub const POST_STRUM_RANGE: RangeInclusive<u64> = 10..=500;
/// Release delay limits; zero disables delayed note-offs.
pub const RELEASE_DELAY_RANGE: RangeInclusive<u64> = 0..=500;

const SNAPSHOT_WINDOW_STEP: u64 = 10;
const STALE_TIMEOUT_STEP: u64 = 100;
const VERY_RECENT_STEP: u64 = 10;
const POST_STRUM_STEP: u64 = 10;
const RELEASE_DELAY_STEP: u64 = 10;

fn clamp(value: u64, range: &RangeInclusive<u64>) -> u64 {
    value.clamp(*range.start(), *range.end())
}

/// User-adjustable arbitration windows, all in milliseconds.
///
/// # Example
///
/// ```rust
/// use diapason_touch::TimingParams;
///
/// let mut timing = TimingParams::default();
/// timing.set_release_delay_ms(9000);
/// assert_eq!(timing.release_delay_ms(), 500);
///
/// timing.post_strum_down();
/// assert_eq!(timing.post_strum_threshold_ms(), 20);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingParams {
    snapshot_window_ms: u64,
    stale_timeout_ms: u64,
    very_recent_threshold_ms: u64,
    post_strum_threshold_ms: u64,
    release_delay_ms: u64,
}

impl Default for TimingParams {
    fn default() -> Self {
        Self {
            snapshot_window_ms: 100,
            stale_timeout_ms: 5000,
            very_recent_threshold_ms: 50,
            post_strum_threshold_ms: 30,
            release_delay_ms: 50,
        }
    }
}

impl TimingParams {
    /// How far back a strum looks for recent touches.
    pub fn snapshot_window_ms(&self) -> u64 {
        self.snapshot_window_ms
    }

    /// Sets the snapshot window, clamped to 10..=1000.
    pub fn set_snapshot_window_ms(&mut self, ms: u64) {
        self.snapshot_window_ms = clamp(ms, &SNAPSHOT_WINDOW_RANGE);
    }

    /// Age past which touch and release records are discarded.
    pub fn stale_timeout_ms(&self) -> u64 {
        self.stale_timeout_ms
    }

    /// Sets the stale timeout, clamped to 100..=30000.
    pub fn set_stale_timeout_ms(&mut self, ms: u64) {
        self.stale_timeout_ms = clamp(ms, &STALE_TIMEOUT_RANGE);
    }

    /// Threshold for treating a touch as very recent. Stored and persisted
    /// with the other windows.
    pub fn very_recent_threshold_ms(&self) -> u64 {
        self.very_recent_threshold_ms
    }

    /// Sets the very-recent threshold, clamped to 10..=500.
    pub fn set_very_recent_threshold_ms(&mut self, ms: u64) {
        self.very_recent_threshold_ms = clamp(ms, &VERY_RECENT_RANGE);
    }

    /// Window after a strum in which a fret touch sounds without a new strum.
    pub fn post_strum_threshold_ms(&self) -> u64 {
        self.post_strum_threshold_ms
    }

    /// Sets the hammer-on window, clamped to 10..=500.
    pub fn set_post_strum_threshold_ms(&mut self, ms: u64) {
        self.post_strum_threshold_ms = clamp(ms, &POST_STRUM_RANGE);
    }

    /// How long a released fret's note keeps sounding. Zero stops at once.
    pub fn release_delay_ms(&self) -> u64 {
        self.release_delay_ms
    }

    /// Sets the release delay, clamped to 0..=500.
    pub fn set_release_delay_ms(&mut self, ms: u64) {
        self.release_delay_ms = clamp(ms, &RELEASE_DELAY_RANGE);
    }

    /// One step up.
    pub fn snapshot_window_up(&mut self) {
        self.set_snapshot_window_ms(self.snapshot_window_ms + SNAPSHOT_WINDOW_STEP);
    }

    /// One step down.
    pub fn snapshot_window_down(&mut self) {
        self.set_snapshot_window_ms(self.snapshot_window_ms.saturating_sub(SNAPSHOT_WINDOW_STEP));
    }

    /// One step up.
    pub fn stale_timeout_up(&mut self) {
        self.set_stale_timeout_ms(self.stale_timeout_ms + STALE_TIMEOUT_STEP);
    }

    /// One step down.
    pub fn stale_timeout_down(&mut self) {
        self.set_stale_timeout_ms(self.stale_timeout_ms.saturating_sub(STALE_TIMEOUT_STEP));
    }

    /// One step up.
    pub fn very_recent_up(&mut self) {
        self.set_very_recent_threshold_ms(self.very_recent_threshold_ms + VERY_RECENT_STEP);
    }

    /// One step down.
    pub fn very_recent_down(&mut self) {
        self.set_very_recent_threshold_ms(
            self.very_recent_threshold_ms.saturating_sub(VERY_RECENT_STEP),
        );
    }

    /// One step up.
    pub fn post_strum_up(&mut self) {
        self.set_post_strum_threshold_ms(self.post_strum_threshold_ms + POST_STRUM_STEP);
    }

    /// One step down.
    pub fn post_strum_down(&mut self) {
        self.set_post_strum_threshold_ms(self.post_strum_threshold_ms.saturating_sub(POST_STRUM_STEP));
    }

    /// One step up.
    pub fn release_delay_up(&mut self) {
        self.set_release_delay_ms(self.release_delay_ms + RELEASE_DELAY_STEP);
    }

    /// One step down.
    pub fn release_delay_down(&mut self) {
        self.set_release_delay_ms(self.release_delay_ms.saturating_sub(RELEASE_DELAY_STEP));
    }

    /// Effective look-back for an unreleased touch.
    pub(crate) fn touch_horizon_ms(&self) -> u64 {
        (2 * self.snapshot_window_ms).min(self.stale_timeout_ms)
    }

    /// Effective look-back for a released fret.
    pub(crate) fn release_horizon_ms(&self) -> u64 {
        RELEASE_TOLERANCE_MS.min(self.stale_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let t = TimingParams::default();
        assert_eq!(t.snapshot_window_ms(), 100);
        assert_eq!(t.stale_timeout_ms(), 5000);
        assert_eq!(t.very_recent_threshold_ms(), 50);
        assert_eq!(t.post_strum_threshold_ms(), 30);
        assert_eq!(t.release_delay_ms(), 50);
    }

    #[test]
    fn test_setters_clamp() {
        let mut t = TimingParams::default();
        t.set_snapshot_window_ms(1);
        t.set_stale_timeout_ms(u64::MAX);
        t.set_very_recent_threshold_ms(0);
        t.set_post_strum_threshold_ms(501);
        t.set_release_delay_ms(1000);
        assert_eq!(t.snapshot_window_ms(), 10);
        assert_eq!(t.stale_timeout_ms(), 30_000);
        assert_eq!(t.very_recent_threshold_ms(), 10);
        assert_eq!(t.post_strum_threshold_ms(), 500);
        assert_eq!(t.release_delay_ms(), 500);
    }

    #[test]
    fn test_steps_saturate() {
        let mut t = TimingParams::default();
        for _ in 0..20 {
            t.release_delay_down();
        }
        assert_eq!(t.release_delay_ms(), 0);
        t.release_delay_up();
        assert_eq!(t.release_delay_ms(), 10);

        for _ in 0..400 {
            t.stale_timeout_up();
        }
        assert_eq!(t.stale_timeout_ms(), 30_000);
        t.stale_timeout_down();
        assert_eq!(t.stale_timeout_ms(), 29_900);

        t.snapshot_window_up();
        assert_eq!(t.snapshot_window_ms(), 110);
        t.very_recent_down();
        assert_eq!(t.very_recent_threshold_ms(), 40);
        t.post_strum_up();
        assert_eq!(t.post_strum_threshold_ms(), 40);
    }

    #[test]
    fn test_horizons() {
        let mut t = TimingParams::default();
        assert_eq!(t.touch_horizon_ms(), 200);
        assert_eq!(t.release_horizon_ms(), RELEASE_TOLERANCE_MS);
        t.set_snapshot_window_ms(1000);
        t.set_stale_timeout_ms(100);
        assert_eq!(t.touch_horizon_ms(), 100);
    }
}
