//! Electrode scanning: raw touch status words to edges.
//!
//! The fretboard is read through two 12-channel capacitive controllers.
//! Each read yields one status word per controller with bit `i` set while
//! channel `i` is touched. Controller 0 carries electrodes 0..12 and
//! controller 1 carries 12..24. [`ElectrodeScanner`] remembers the last
//! state of every electrode and reports only the transitions.

use crate::arbiter::TouchArbiter;
use crate::fretboard::ELECTRODES;
use crate::sink::NoteSink;

/// Touch controllers on the board.
pub const SENSORS: usize = 2;
/// Electrodes per controller.
pub const CHANNELS_PER_SENSOR: usize = 12;
/// Valid bits of one status word.
pub const STATUS_MASK: u16 = 0x0fff;

const ALL_ELECTRODES: u32 = (1 << ELECTRODES) - 1;

/// Source of touch status words.
pub trait TouchSensor {
    /// Reads both controllers' status words at `now_ms`.
    fn read_status(&mut self, now_ms: u64) -> [u16; SENSORS];
}

/// One electrode transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    /// Electrode id, 0..24.
    pub electrode: u8,
    /// `true` for touch, `false` for release.
    pub touched: bool,
}

/// Packs two status words into one 24-bit electrode mask.
pub fn electrode_mask(status: [u16; SENSORS]) -> u32 {
    let low = u32::from(status[0] & STATUS_MASK);
    let high = u32::from(status[1] & STATUS_MASK);
    low | (high << CHANNELS_PER_SENSOR)
}

/// Splits a 24-bit electrode mask back into status words.
pub fn status_words(mask: u32) -> [u16; SENSORS] {
    let low = (mask & u32::from(STATUS_MASK)) as u16;
    let high = ((mask >> CHANNELS_PER_SENSOR) & u32::from(STATUS_MASK)) as u16;
    [low, high]
}

/// Edge detector over the 24 electrodes.
///
/// ```rust
/// use diapason_touch::{Edge, ElectrodeScanner};
///
/// let mut scanner = ElectrodeScanner::new();
/// let edges: Vec<Edge> = scanner.scan([0b101, 0]).collect();
/// assert_eq!(edges.len(), 2);
/// assert!(scanner.scan([0b101, 0]).next().is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ElectrodeScanner {
    was_touched: u32,
}

impl ElectrodeScanner {
    /// Scanner with every electrode released.
    pub const fn new() -> Self {
        Self { was_touched: 0 }
    }

    /// Mask of electrodes currently believed touched.
    pub fn touched_mask(&self) -> u32 {
        self.was_touched
    }

    /// Whether `electrode` was touched at the last scan.
    pub fn is_touched(&self, electrode: u8) -> bool {
        (electrode as usize) < ELECTRODES && self.was_touched & (1 << electrode) != 0
    }

    /// Forgets all touches.
    pub fn reset(&mut self) {
        self.was_touched = 0;
    }

    /// Compares `status` with the previous scan and yields the transitions
    /// in electrode order.
    pub fn scan(&mut self, status: [u16; SENSORS]) -> Edges {
        let current = electrode_mask(status);
        let changed = (current ^ self.was_touched) & ALL_ELECTRODES;
        self.was_touched = current;
        Edges { changed, current }
    }

    /// One control pass: expire timers, read the sensor and feed every
    /// transition to the arbiter. Returns the number of edges handled.
    pub fn poll<T, S>(&mut self, sensor: &mut T, arbiter: &mut TouchArbiter, now: u64, sink: &mut S) -> usize
    where
        T: TouchSensor + ?Sized,
        S: NoteSink,
    {
        arbiter.sweep(now, sink);
        let mut handled = 0;
        for edge in self.scan(sensor.read_status(now)) {
            if edge.touched {
                arbiter.touch_on(edge.electrode, now, sink);
            } else {
                arbiter.touch_off(edge.electrode, now, sink);
            }
            handled += 1;
        }
        handled
    }
}

/// Transitions found by one [`ElectrodeScanner::scan`].
#[derive(Debug, Clone)]
pub struct Edges {
    changed: u32,
    current: u32,
}

impl Iterator for Edges {
    type Item = Edge;

    fn next(&mut self) -> Option<Edge> {
        if self.changed == 0 {
            return None;
        }
        let electrode = self.changed.trailing_zeros();
        self.changed &= self.changed - 1;
        Some(Edge {
            electrode: electrode as u8,
            touched: self.current & (1 << electrode) != 0,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.changed.count_ones() as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for Edges {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_packing() {
        assert_eq!(electrode_mask([0x0fff, 0]), 0x0fff);
        assert_eq!(electrode_mask([0, 1]), 1 << 12);
        // bits above 12 are ignored
        assert_eq!(electrode_mask([0xf000, 0xf000]), 0);
        assert_eq!(status_words(electrode_mask([0x0123, 0x0abc])), [0x0123, 0x0abc]);
    }

    #[test]
    fn test_edges_only_on_change() {
        let mut scanner = ElectrodeScanner::new();
        let first: Vec<Edge> = scanner.scan([1 << 3, 1 << 0]).collect();
        assert_eq!(
            first,
            [
                Edge { electrode: 3, touched: true },
                Edge { electrode: 12, touched: true },
            ]
        );
        assert!(scanner.is_touched(12));

        let second: Vec<Edge> = scanner.scan([1 << 3, 0]).collect();
        assert_eq!(second, [Edge { electrode: 12, touched: false }]);
        assert_eq!(scanner.scan([1 << 3, 0]).len(), 0);
    }

    #[test]
    fn test_reset() {
        let mut scanner = ElectrodeScanner::new();
        let _ = scanner.scan([0x0fff, 0x0fff]).count();
        assert_eq!(scanner.touched_mask(), ALL_ELECTRODES);
        scanner.reset();
        assert!(!scanner.is_touched(5));
        assert!(!scanner.is_touched(40));
    }

    struct Fixed([u16; SENSORS]);

    impl TouchSensor for Fixed {
        fn read_status(&mut self, _now_ms: u64) -> [u16; SENSORS] {
            self.0
        }
    }

    #[test]
    fn test_poll_feeds_arbiter() {
        let mut scanner = ElectrodeScanner::new();
        let mut arbiter = TouchArbiter::default();
        let mut log = Vec::new();
        // electrode 14 is string 0 fret 2
        let mut sensor = Fixed(status_words(1 << 14));
        assert_eq!(scanner.poll(&mut sensor, &mut arbiter, 1000, &mut log), 1);
        assert_eq!(arbiter.sounding(0), Some(57));
        sensor.0 = [0, 0];
        assert_eq!(scanner.poll(&mut sensor, &mut arbiter, 1100, &mut log), 1);
        assert_eq!(arbiter.sounding(0), None);
    }
}
