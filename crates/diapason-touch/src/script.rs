//! Scripted touch input for running the instrument without hardware.
//!
//! A script is plain text, one transition per line:
//!
//! ```text
//! # time_ms  on|off  string  fret
//! 0     on   0 2
//! 250   on   0 5    # strum
//! 400   off  0 5
//! 600   off  0 2
//! ```
//!
//! Times are absolute milliseconds from the start of playback and must not
//! go backwards. Positions are given as the player sees them; the
//! [`ScriptedSensor`] maps them to electrodes for the configured hand.

use std::str::FromStr;

use crate::fretboard::Position;
use crate::scan::{SENSORS, TouchSensor, status_words};

/// Errors from [`TouchScript::parse`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScriptError {
    /// Line does not have four fields.
    #[error("line {line}: expected `<ms> <on|off> <string> <fret>`")]
    Malformed {
        /// 1-based line number.
        line: usize,
    },
    /// A numeric field failed to parse.
    #[error("line {line}: invalid number '{value}'")]
    InvalidNumber {
        /// 1-based line number.
        line: usize,
        /// Offending text.
        value: String,
    },
    /// Action is neither `on` nor `off`.
    #[error("line {line}: unknown action '{action}' (expected on or off)")]
    UnknownAction {
        /// 1-based line number.
        line: usize,
        /// Offending text.
        action: String,
    },
    /// String or fret off the board.
    #[error("line {line}: no cell at string {string}, fret {fret}")]
    OffBoard {
        /// 1-based line number.
        line: usize,
        /// Requested string.
        string: u8,
        /// Requested fret.
        fret: u8,
    },
    /// Time earlier than the previous line's.
    #[error("line {line}: time {at_ms} ms goes backwards")]
    OutOfOrder {
        /// 1-based line number.
        line: usize,
        /// Offending time.
        at_ms: u64,
    },
}

/// One scripted transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptEvent {
    /// Time from the start of playback.
    pub at_ms: u64,
    /// Cell being touched or released.
    pub position: Position,
    /// `true` for touch.
    pub touched: bool,
}

/// Parsed, time-ordered touch script.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TouchScript {
    events: Vec<ScriptEvent>,
}

fn number<T: FromStr>(line: usize, value: &str) -> Result<T, ScriptError> {
    value.parse().map_err(|_| ScriptError::InvalidNumber {
        line,
        value: value.to_string(),
    })
}

impl TouchScript {
    /// Parses script text.
    pub fn parse(text: &str) -> Result<Self, ScriptError> {
        let mut events = Vec::new();
        let mut last_ms = 0;

        for (index, raw) in text.lines().enumerate() {
            let line = index + 1;
            let content = raw.split('#').next().unwrap_or("").trim();
            if content.is_empty() {
                continue;
            }
            let fields: Vec<&str> = content.split_whitespace().collect();
            let [at, action, string, fret] = fields[..] else {
                return Err(ScriptError::Malformed { line });
            };

            let at_ms: u64 = number(line, at)?;
            let touched = match action.to_ascii_lowercase().as_str() {
                "on" => true,
                "off" => false,
                _ => {
                    return Err(ScriptError::UnknownAction {
                        line,
                        action: action.to_string(),
                    });
                }
            };
            let string: u8 = number(line, string)?;
            let fret: u8 = number(line, fret)?;
            let position =
                Position::new(string, fret).ok_or(ScriptError::OffBoard { line, string, fret })?;
            if at_ms < last_ms {
                return Err(ScriptError::OutOfOrder { line, at_ms });
            }
            last_ms = at_ms;

            events.push(ScriptEvent {
                at_ms,
                position,
                touched,
            });
        }

        Ok(Self { events })
    }

    /// Events in time order.
    pub fn events(&self) -> &[ScriptEvent] {
        &self.events
    }

    /// Time of the last event.
    pub fn duration_ms(&self) -> u64 {
        self.events.last().map_or(0, |e| e.at_ms)
    }

    /// True when the script holds no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl FromStr for TouchScript {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Virtual fretboard that replays a [`TouchScript`] as status words.
///
/// ```rust
/// use diapason_touch::{ScriptedSensor, TouchScript, TouchSensor};
///
/// let script: TouchScript = "0 on 0 2\n100 off 0 2".parse().unwrap();
/// let mut sensor = ScriptedSensor::new(script, false);
/// assert_eq!(sensor.read_status(0), [0, 1 << 2]);
/// assert_eq!(sensor.read_status(100), [0, 0]);
/// assert!(sensor.finished());
/// ```
#[derive(Debug, Clone)]
pub struct ScriptedSensor {
    script: TouchScript,
    cursor: usize,
    origin_ms: u64,
    left_handed: bool,
    mask: u32,
}

impl ScriptedSensor {
    /// Replays `script` with time zero at `now = 0`.
    pub fn new(script: TouchScript, left_handed: bool) -> Self {
        Self {
            script,
            cursor: 0,
            origin_ms: 0,
            left_handed,
            mask: 0,
        }
    }

    /// Shifts script time zero to `origin_ms` on the caller's clock.
    #[must_use]
    pub fn starting_at(mut self, origin_ms: u64) -> Self {
        self.origin_ms = origin_ms;
        self
    }

    /// All events have been applied.
    pub fn finished(&self) -> bool {
        self.cursor >= self.script.events.len()
    }

    /// Caller time at which the last event fires.
    pub fn end_ms(&self) -> u64 {
        self.origin_ms + self.script.duration_ms()
    }
}

impl TouchSensor for ScriptedSensor {
    fn read_status(&mut self, now_ms: u64) -> [u16; SENSORS] {
        let elapsed = now_ms.saturating_sub(self.origin_ms);
        while let Some(event) = self.script.events.get(self.cursor) {
            if now_ms < self.origin_ms || event.at_ms > elapsed {
                break;
            }
            let bit = 1u32 << event.position.electrode(self.left_handed);
            if event.touched {
                self.mask |= bit;
            } else {
                self.mask &= !bit;
            }
            self.cursor += 1;
        }
        status_words(self.mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_comments() {
        let script = TouchScript::parse(
            "# warm up\n\n0 on 1 3\n  20 ON 1 5 # strum\n40 off 1 5\n",
        )
        .unwrap();
        assert_eq!(script.events().len(), 3);
        assert_eq!(script.events()[1].position, Position::new(1, 5).unwrap());
        assert!(script.events()[1].touched);
        assert_eq!(script.duration_ms(), 40);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(TouchScript::parse("0 on 1"), Err(ScriptError::Malformed { line: 1 }));
        assert_eq!(
            TouchScript::parse("x on 1 1"),
            Err(ScriptError::InvalidNumber { line: 1, value: "x".into() })
        );
        assert_eq!(
            TouchScript::parse("0 press 1 1"),
            Err(ScriptError::UnknownAction { line: 1, action: "press".into() })
        );
        assert_eq!(
            TouchScript::parse("0 on 4 1"),
            Err(ScriptError::OffBoard { line: 1, string: 4, fret: 1 })
        );
        assert_eq!(
            TouchScript::parse("10 on 0 1\n5 off 0 1"),
            Err(ScriptError::OutOfOrder { line: 2, at_ms: 5 })
        );
    }

    #[test]
    fn test_sensor_replays_in_time() {
        let script = TouchScript::parse("10 on 3 0\n20 on 3 5\n30 off 3 0").unwrap();
        let mut sensor = ScriptedSensor::new(script, false).starting_at(1000);
        assert_eq!(sensor.read_status(500), [0, 0]);
        assert_eq!(sensor.read_status(1009), [0, 0]);
        // string 3 fret 0 is electrode 5, fret 5 is electrode 0
        assert_eq!(sensor.read_status(1010), [1 << 5, 0]);
        assert_eq!(sensor.read_status(1025), [(1 << 5) | 1, 0]);
        assert!(!sensor.finished());
        assert_eq!(sensor.read_status(2000), [1, 0]);
        assert!(sensor.finished());
        assert_eq!(sensor.end_ms(), 1030);
    }

    #[test]
    fn test_left_handed_sensor() {
        let script = TouchScript::parse("0 on 0 0").unwrap();
        let mut sensor = ScriptedSensor::new(script, true);
        // mirrored to the string-3 row: electrode 5
        assert_eq!(sensor.read_status(0), [1 << 5, 0]);
    }
}
