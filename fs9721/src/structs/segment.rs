//! Seven-segment digit decoding.
//!
//! Each digit position carries a 7-bit pattern of lit strokes. Patterns with
//! no table entry are shown as blanks; the meter blanks leading digits during
//! normal operation, so this is not an error.

use std::fmt::{Display, Formatter};

/// Segment pattern of the overflow marker `L`.
pub const OVERFLOW_PATTERN: u8 = 0x68;

const DIGIT_PATTERNS: [(u8, u8); 10] = [
    (0x7D, 0),
    (0x05, 1),
    (0x5B, 2),
    (0x1F, 3),
    (0x27, 4),
    (0x3E, 5),
    (0x7E, 6),
    (0x15, 7),
    (0x7F, 8),
    (0x3F, 9),
];

/// A decoded digit position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Digit {
    Value(u8),
    Overflow,
    #[default]
    Blank,
}

impl Digit {
    /// Looks up a 7-bit segment pattern.
    ///
    /// The decimal point is a separate stroke and does not change which
    /// digit the pattern shows; it is accepted here so callers can pass a
    /// digit group as read.
    pub fn from_segments(pattern: u8, _decimal_point: bool) -> Self {
        let pattern = pattern & 0x7F;

        if pattern == OVERFLOW_PATTERN {
            return Digit::Overflow;
        }

        DIGIT_PATTERNS
            .iter()
            .find(|(p, _)| *p == pattern)
            .map_or(Digit::Blank, |&(_, value)| Digit::Value(value))
    }

    /// True if `pattern` has a table entry.
    pub fn is_known_pattern(pattern: u8) -> bool {
        !matches!(Self::from_segments(pattern, false), Digit::Blank)
    }

    pub const fn as_char(self) -> Option<char> {
        match self {
            Digit::Value(v) => Some((b'0' + v) as char),
            Digit::Overflow => Some('L'),
            Digit::Blank => None,
        }
    }

    pub const fn is_blank(self) -> bool {
        matches!(self, Digit::Blank)
    }
}

impl Display for Digit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.as_char() {
            Some(c) => write!(f, "{c}"),
            None => Ok(()),
        }
    }
}

/// Free-function form of [`Digit::from_segments`].
pub fn decode_segment(pattern: u8, decimal_point: bool) -> Digit {
    Digit::from_segments(pattern, decimal_point)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_table() {
        let expected = "0123456789";
        for ((pattern, _), c) in DIGIT_PATTERNS.iter().zip(expected.chars()) {
            assert_eq!(decode_segment(*pattern, false).as_char(), Some(c));
        }

        assert_eq!(decode_segment(0x7D, false), Digit::Value(0));
        assert_eq!(decode_segment(0x68, false), Digit::Overflow);
        assert_eq!(decode_segment(0x00, false), Digit::Blank);
    }

    #[test]
    fn decimal_point_does_not_change_digit() {
        assert_eq!(decode_segment(0x3F, true), Digit::Value(9));
        assert_eq!(decode_segment(0x68, true), Digit::Overflow);
    }

    #[test]
    fn unknown_patterns_are_blank() {
        let known = DIGIT_PATTERNS.len() + 1;
        let blanks = (0..=0x7Fu8)
            .filter(|&p| decode_segment(p, false).is_blank())
            .count();

        assert_eq!(blanks, 128 - known);
        assert!(!Digit::is_known_pattern(0x01));
        assert!(Digit::is_known_pattern(0x05));
        assert_eq!(Digit::Blank.to_string(), "");
        assert_eq!(Digit::Overflow.to_string(), "L");
    }
}
