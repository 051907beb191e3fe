//! Fretboard geometry and tuning.
//!
//! The instrument has four strings and six fret columns wired to 24
//! electrodes spread over two 12-channel touch controllers. The physical
//! wiring does not follow string order, so every electrode goes through
//! [`LAYOUT`] before the arbiter sees it.
//!
//! # Layout
//!
//! ```text
//!            fret: 0  1  2  3  4  5
//! string 0 (high): 12 13 14 15 16 17
//! string 1       : 18 19 20 21 22 23
//! string 2       : 11 10  9  8  7  6
//! string 3 (low) :  5  4  3  2  1  0
//! ```
//!
//! Left-handed mode mirrors the strings (`string -> 3 - string`) and leaves
//! the fret column untouched.
//!
//! # Example
//!
//! ```rust
//! use diapason_touch::{Position, Tuning};
//!
//! let pos = Position::from_electrode(14, false).unwrap();
//! assert_eq!((pos.string, pos.fret), (0, 2));
//! assert_eq!(pos.electrode(false), 14);
//!
//! let tuning = Tuning::standard();
//! assert_eq!(tuning.note(pos.string, pos.fret), 57);
//! ```

/// Number of strings.
pub const STRINGS: usize = 4;
/// Fret columns per string, strum column included.
pub const FRETS: usize = 6;
/// Fret columns that select pitch in strum mode.
pub const REGULAR_FRETS: usize = FRETS - 1;
/// Column that acts as the trigger in strum mode.
pub const STRUM_FRET: u8 = 5;
/// Total electrode count.
pub const ELECTRODES: usize = STRINGS * FRETS;
/// Highest MIDI note number.
pub const MAX_NOTE: u8 = 127;

/// Electrode id for each (string, fret) in right-handed orientation.
pub const LAYOUT: [[u8; FRETS]; STRINGS] = [
    [12, 13, 14, 15, 16, 17],
    [18, 19, 20, 21, 22, 23],
    [11, 10, 9, 8, 7, 6],
    [5, 4, 3, 2, 1, 0],
];

const ELECTRODE_POSITIONS: [(u8, u8); ELECTRODES] = invert_layout();

const fn invert_layout() -> [(u8, u8); ELECTRODES] {
    let mut out = [(0u8, 0u8); ELECTRODES];
    let mut s = 0;
    while s < STRINGS {
        let mut f = 0;
        while f < FRETS {
            out[LAYOUT[s][f] as usize] = (s as u8, f as u8);
            f += 1;
        }
        s += 1;
    }
    out
}

const fn mirror(string: u8, left_handed: bool) -> u8 {
    if left_handed {
        STRINGS as u8 - 1 - string
    } else {
        string
    }
}

/// A (string, fret) cell on the fretboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    /// String index, 0 is the highest string.
    pub string: u8,
    /// Fret column, [`STRUM_FRET`] is the strum column.
    pub fret: u8,
}

impl Position {
    /// Creates a position, rejecting cells off the board.
    pub const fn new(string: u8, fret: u8) -> Option<Self> {
        if (string as usize) < STRINGS && (fret as usize) < FRETS {
            Some(Self { string, fret })
        } else {
            None
        }
    }

    /// Resolves an electrode id. Ids outside 0..24 yield `None`.
    pub const fn from_electrode(electrode: u8, left_handed: bool) -> Option<Self> {
        if electrode as usize >= ELECTRODES {
            return None;
        }
        let (string, fret) = ELECTRODE_POSITIONS[electrode as usize];
        Some(Self {
            string: mirror(string, left_handed),
            fret,
        })
    }

    /// Electrode wired to this cell.
    pub const fn electrode(&self, left_handed: bool) -> u8 {
        LAYOUT[mirror(self.string, left_handed) as usize][self.fret as usize]
    }

    /// True for the strum column.
    pub const fn is_strum(&self) -> bool {
        self.fret == STRUM_FRET
    }
}

/// Factory open-string pitches (G3, D3, A2, E2).
pub const DEFAULT_PITCHES: [u8; STRINGS] = [55, 50, 45, 40];
/// Capo range in semitones, both directions.
pub const MAX_CAPO: i8 = 24;

/// Open-string pitches plus a global capo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tuning {
    pitches: [u8; STRINGS],
    capo: i8,
}

impl Default for Tuning {
    fn default() -> Self {
        Self::standard()
    }
}

impl Tuning {
    /// Factory tuning, no capo.
    pub const fn standard() -> Self {
        Self {
            pitches: DEFAULT_PITCHES,
            capo: 0,
        }
    }

    /// Builds a tuning, clamping pitches to 0..=127 and the capo to ±24.
    pub fn new(pitches: [u8; STRINGS], capo: i8) -> Self {
        let mut tuning = Self::standard();
        for (string, pitch) in pitches.into_iter().enumerate() {
            tuning.set_pitch(string as u8, pitch);
        }
        tuning.set_capo(capo);
        tuning
    }

    /// Pitch of each open string.
    pub fn pitches(&self) -> [u8; STRINGS] {
        self.pitches
    }

    /// Open pitch of `string`, or 0 for strings off the board.
    pub fn pitch(&self, string: u8) -> u8 {
        self.pitches.get(string as usize).copied().unwrap_or(0)
    }

    /// Sets one string's open pitch, clamped to 0..=127.
    pub fn set_pitch(&mut self, string: u8, pitch: u8) {
        if let Some(slot) = self.pitches.get_mut(string as usize) {
            *slot = pitch.min(MAX_NOTE);
        }
    }

    /// Raises one string by a semitone, saturating at 127.
    pub fn pitch_up(&mut self, string: u8) {
        self.set_pitch(string, self.pitch(string).saturating_add(1));
    }

    /// Lowers one string by a semitone, saturating at 0.
    pub fn pitch_down(&mut self, string: u8) {
        self.set_pitch(string, self.pitch(string).saturating_sub(1));
    }

    /// Current capo offset in semitones.
    pub fn capo(&self) -> i8 {
        self.capo
    }

    /// Sets the capo, clamped to ±24.
    pub fn set_capo(&mut self, capo: i8) {
        self.capo = capo.clamp(-MAX_CAPO, MAX_CAPO);
    }

    /// Capo one semitone up.
    pub fn capo_up(&mut self) {
        self.set_capo(self.capo.saturating_add(1));
    }

    /// Capo one semitone down.
    pub fn capo_down(&mut self) {
        self.set_capo(self.capo.saturating_sub(1));
    }

    /// Back to factory pitches and no capo.
    pub fn reset(&mut self) {
        *self = Self::standard();
    }

    /// MIDI note of a cell: `pitch + fret + capo`, clamped to 0..=127.
    pub fn note(&self, string: u8, fret: u8) -> u8 {
        let note = i16::from(self.pitch(string)) + i16::from(fret) + i16::from(self.capo);
        note.clamp(0, i16::from(MAX_NOTE)) as u8
    }
}
