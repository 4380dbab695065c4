use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::parse_util;

/// Decides the next state of a cell from its current state and its number of live neighbors.
pub trait StepRule {
    fn next_state(&self, alive: bool, live_neighbors: u8) -> bool;
}

impl<F> StepRule for F
where
    F: Fn(bool, u8) -> bool,
{
    fn next_state(&self, alive: bool, live_neighbors: u8) -> bool {
        self(alive, live_neighbors)
    }
}

/// Rules of Conway's Game of Life.
pub const B3S23: RuleSet = RuleSet::new(0b1000, 0b1100);

/// # Representation
/// Life rules are represented as
/// ```notrust
/// |------birth------|
/// 0000_0000_0000_0000_0000_0000_0000_0000
///                     |----survival-----|
/// ```
///
/// # Examples
/// ```notrust
/// b3s23:                0000_0000_0000_1000_0000_0000_0000_1100
///
/// b0s0:                 0000_0000_0000_0000_0000_0000_0000_0000
/// b012345678s012345678: 0000_0001_1111_1111_0000_0001_1111_1111
/// ```
///
/// See: https://conwaylife.com/wiki/Rulestring
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RuleSet {
    rule: u32,
}

impl Default for RuleSet {
    fn default() -> Self {
        B3S23
    }
}

impl RuleSet {
    /// Create a new `RuleSet` for the given births and survivals. For both `b` and
    /// `s`, numbers are set on a bit basis. For instance if bit `i` in `b` is on, it
    /// means `i` is included in the set of births. Any bit past the 8th is ignored.
    ///
    /// Big endian is used here (i.e. `b = 0b1` means b1, and `b = 0b1_0000_0000` means b8).
    pub const fn new(b: u16, s: u16) -> Self {
        let b = b & 0x1FF;
        let s = s & 0x1FF;

        Self {
            rule: (b as u32) << 16 | s as u32,
        }
    }

    pub fn births(&self) -> u16 {
        ((self.rule & 0x1FF0000) >> 0x10) as u16
    }

    pub fn survivals(&self) -> u16 {
        (self.rule & 0x1FF) as u16
    }
}

impl StepRule for RuleSet {
    fn next_state(&self, alive: bool, live_neighbors: u8) -> bool {
        if live_neighbors > 8 {
            return false;
        }

        let mask = 1 << live_neighbors;

        if alive {
            self.survivals() & mask == mask
        } else {
            self.births() & mask == mask
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuleError {
    #[error("Neighbor counts range over 0-8, got '{got}'")]
    OutOfRange { got: char },

    #[error("Unexpected '{got}' in rulestring")]
    InvalidToken { got: char },

    #[error("Empty rulestring")]
    Empty,

    #[error("Rulestring is not valid UTF-8")]
    InvalidUtf8,
}

impl FromStr for RuleSet {
    type Err = RuleError;

    /// Parses `B3/S23`, `b3s23` and the nameless `3/23` forms.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        enum State {
            Birth,
            Survival,
        }

        let s = s.trim();
        if s.is_empty() {
            return Err(RuleError::Empty);
        }

        let mut state = State::Birth;
        let (mut b, mut s_mask) = (0u16, 0u16);

        for c in s.chars() {
            match c {
                'b' | 'B' => {
                    state = State::Birth;
                }
                's' | 'S' | '/' => {
                    state = State::Survival;
                }
                n if n.is_ascii_digit() => {
                    let n = n as u8 - b'0';

                    if n > 8 {
                        return Err(RuleError::OutOfRange { got: c });
                    }

                    match state {
                        State::Birth => b |= 1 << n,
                        State::Survival => s_mask |= 1 << n,
                    }
                }
                got => return Err(RuleError::InvalidToken { got }),
            }
        }

        Ok(RuleSet::new(b, s_mask))
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn digits(f: &mut fmt::Formatter<'_>, mask: u16) -> fmt::Result {
            for n in 0..=8 {
                if mask & (1 << n) != 0 {
                    write!(f, "{n}")?;
                }
            }

            Ok(())
        }

        f.write_str("B")?;
        digits(f, self.births())?;
        f.write_str("/S")?;
        digits(f, self.survivals())
    }
}

/// Parse a rulestring up to the next whitespace. Used for RLE `#r` lines and header rules.
pub(crate) fn parse_rule(bytes: &[u8]) -> Result<(RuleSet, &[u8]), RuleError> {
    let (Some(rule), bytes) = parse_util::take_until_ws(bytes) else {
        return Err(RuleError::Empty);
    };

    let rule = std::str::from_utf8(rule).map_err(|_| RuleError::InvalidUtf8)?;

    Ok((rule.parse()?, bytes))
}
