//! Strum snapshots: which frets count as held at the instant of a strum.
//!
//! A fret can be live for three reasons, checked in order by [`liveness`]:
//!
//! 1. it is physically touched;
//! 2. it has a touch record with no later release, younger than
//!    `min(2 × snapshot window, stale timeout)`;
//! 3. it was released less than `min(release tolerance, stale timeout)`
//!    ago and no other held fret was touched after that release.
//!
//! Records that fail rule 2 are purged. Records that fail rule 3 and are
//! older than the stale timeout are purged as well.

use crate::fretboard::{FRETS, REGULAR_FRETS};
use crate::timing::{RELEASE_TOLERANCE_MS, TimingParams};

/// Touch bookkeeping for one fret cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FretState {
    /// Physically held right now.
    pub touched: bool,
    /// When the current or most recent touch started. Cleared on release.
    pub touch_time: Option<u64>,
    /// When the fret was last released.
    pub release_time: Option<u64>,
    /// Pending delayed note-off, stamped at release.
    pub release_delay_since: Option<u64>,
}

impl FretState {
    /// Released less than the release tolerance ago.
    pub fn in_tolerance(&self, now: u64) -> bool {
        self.release_time
            .is_some_and(|released| now.saturating_sub(released) < RELEASE_TOLERANCE_MS)
    }

    fn clear_records(&mut self) {
        self.touch_time = None;
        self.release_time = None;
    }
}

/// Why a fret does or does not take part in a strum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    /// Physically held.
    Touched,
    /// Recently touched or released; counts as held. Carries the time of
    /// the most recent activity for ranking.
    Tolerated(u64),
    /// Not part of the snapshot.
    Dead,
}

/// Classifies one regular fret of a string, purging stale records.
pub fn liveness(
    frets: &mut [FretState; FRETS],
    fret: usize,
    now: u64,
    timing: &TimingParams,
) -> Liveness {
    let state = frets[fret];
    if state.touched {
        return Liveness::Touched;
    }

    if let Some(touched_at) = state.touch_time {
        if state.release_time.is_none_or(|released| released < touched_at) {
            if now.saturating_sub(touched_at) < timing.touch_horizon_ms() {
                return Liveness::Tolerated(touched_at);
            }
            frets[fret].touch_time = None;
            return Liveness::Dead;
        }
    }

    if let Some(released_at) = state.release_time {
        let age = now.saturating_sub(released_at);
        let superseded = frets[..REGULAR_FRETS]
            .iter()
            .enumerate()
            .any(|(j, other)| {
                j != fret && other.touched && other.touch_time.is_some_and(|t| t > released_at)
            });
        if age < timing.release_horizon_ms() && !superseded {
            return Liveness::Tolerated(released_at);
        }
        if age >= timing.stale_timeout_ms() {
            frets[fret].clear_records();
        }
    }

    Liveness::Dead
}

/// Picks the fret a strum should sound, if any.
///
/// Held frets outrank tolerated ones. Among held frets the highest column
/// wins; among tolerated frets the most recent activity wins, the higher
/// column breaking ties.
pub fn best_fret(
    frets: &mut [FretState; FRETS],
    now: u64,
    timing: &TimingParams,
) -> Option<(u8, Liveness)> {
    let mut best_touched: Option<usize> = None;
    let mut best_tolerated: Option<(usize, u64)> = None;

    for fret in 0..REGULAR_FRETS {
        match liveness(frets, fret, now, timing) {
            Liveness::Touched => best_touched = Some(fret),
            Liveness::Tolerated(at) => {
                if best_tolerated.is_none_or(|(_, best_at)| at >= best_at) {
                    best_tolerated = Some((fret, at));
                }
            }
            Liveness::Dead => {}
        }
    }

    best_touched
        .map(|fret| (fret as u8, Liveness::Touched))
        .or_else(|| best_tolerated.map(|(fret, at)| (fret as u8, Liveness::Tolerated(at))))
}
