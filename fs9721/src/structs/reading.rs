//! Decoded state of the meter's display.

use std::fmt::{Display, Formatter};

use log::debug;

use crate::structs::fields::{DIGITS, RawFields};
use crate::structs::flags::{Flag, Unit, readable_unit};
use crate::structs::segment::Digit;
use crate::utils::errors::ReadingError;

/// Something odd found while building a [`Reading`].
///
/// Anomalies never prevent a reading from being built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anomaly {
    /// More than one decimal point bit is set; the mask has bit `i` set for
    /// digit position `i`.
    MultipleDecimalPoints(u8),
    /// A non-zero segment pattern with no table entry, shown as a blank.
    UnknownSegment { position: usize, pattern: u8 },
}

impl Display for Anomaly {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Anomaly::MultipleDecimalPoints(mask) => {
                write!(f, "decimal point set on several digits (mask {mask:#06b})")
            }
            Anomaly::UnknownSegment { position, pattern } => write!(
                f,
                "unknown segment pattern {pattern:#04X} at digit {}",
                position + 1
            ),
        }
    }
}

/// One decoded packet: digits, sign, flags and units.
///
/// Built once from [`RawFields`] and never modified.
///
/// # Example
///
/// ```rust
/// use fs9721::process::EXAMPLE_PACKETS;
/// use fs9721::process::decode::decode_packet;
/// use fs9721::structs::fields::BitOrder;
/// use fs9721::structs::flags::{Flag, Unit};
///
/// let reading = decode_packet(&EXAMPLE_PACKETS[1], BitOrder::AsDelivered)?;
///
/// assert_eq!(reading.display(), "010.9");
/// assert!(reading.has_flag(Flag::Dc));
/// assert!(reading.has_unit(Unit::Volt));
/// assert_eq!(reading.unit_symbol(), "mV");
/// # Ok::<(), fs9721::utils::errors::DecodeError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reading {
    digits: [Digit; DIGITS],
    decimal_points: [bool; DIGITS],
    negative: bool,
    flags: Vec<Flag>,
    units: Vec<Unit>,
    anomalies: Vec<Anomaly>,
}

impl Reading {
    pub fn from_fields(fields: RawFields) -> Self {
        let mut anomalies = Vec::new();

        let digits: [Digit; DIGITS] = std::array::from_fn(|i| {
            Digit::from_segments(fields.segments[i], fields.decimal_points[i])
        });

        for (position, &pattern) in fields.segments.iter().enumerate() {
            if digits[position].is_blank() && pattern != 0 {
                let anomaly = Anomaly::UnknownSegment { position, pattern };
                debug!("Blank digit: {anomaly}");
                anomalies.push(anomaly);
            }
        }

        let dp_mask = fields
            .decimal_points
            .iter()
            .enumerate()
            .fold(0u8, |mask, (i, &dp)| if dp { mask | (1 << i) } else { mask });
        if dp_mask.count_ones() > 1 {
            let anomaly = Anomaly::MultipleDecimalPoints(dp_mask);
            debug!("Ambiguous reading: {anomaly}");
            anomalies.push(anomaly);
        }

        let mut flags = fields.flags;
        if fields.negative && !flags.contains(&Flag::Negative) {
            flags.push(Flag::Negative);
        }
        flags.sort_unstable();

        let mut units = fields.units;
        units.sort_unstable();

        Self {
            digits,
            decimal_points: fields.decimal_points,
            negative: fields.negative,
            flags,
            units,
            anomalies,
        }
    }

    /// Active flags in bit order, including [`Flag::Negative`] when the sign
    /// is lit.
    pub fn flags(&self) -> &[Flag] {
        &self.flags
    }

    /// Active units in bit order.
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn has_flag(&self, flag: Flag) -> bool {
        self.flags.contains(&flag)
    }

    pub fn has_unit(&self, unit: Unit) -> bool {
        self.units.contains(&unit)
    }

    pub fn digits(&self) -> &[Digit; DIGITS] {
        &self.digits
    }

    pub fn decimal_points(&self) -> &[bool; DIGITS] {
        &self.decimal_points
    }

    /// Position of the digit followed by the decimal point, if exactly one
    /// decimal point bit is set.
    pub fn decimal_position(&self) -> Option<usize> {
        let mut set = self.decimal_points.iter().enumerate().filter(|(_, dp)| **dp);

        match (set.next(), set.next()) {
            (Some((i, _)), None) => Some(i),
            _ => None,
        }
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    pub fn is_overflow(&self) -> bool {
        self.digits.contains(&Digit::Overflow)
    }

    pub fn anomalies(&self) -> &[Anomaly] {
        &self.anomalies
    }

    /// The text shown on the LCD, e.g. `-010.9`.
    ///
    /// Blank digits take no space. A `.` follows every digit whose decimal
    /// point bit is set, so an ambiguous reading shows all of them.
    pub fn display(&self) -> String {
        let mut out = String::with_capacity(2 * DIGITS + 1);

        if self.negative {
            out.push('-');
        }

        for (digit, &dp) in self.digits.iter().zip(&self.decimal_points) {
            if let Some(c) = digit.as_char() {
                out.push(c);
            }
            if dp {
                out.push('.');
            }
        }

        out
    }

    /// The displayed number, in the displayed unit.
    ///
    /// Fails for overflow, blank and ambiguous readings.
    pub fn value(&self) -> Result<f64, ReadingError> {
        let display = self.display();

        if self.is_overflow() || self.decimal_points.iter().filter(|dp| **dp).count() > 1 {
            return Err(ReadingError::NonNumeric(display));
        }

        display
            .parse::<f64>()
            .map_err(|_| ReadingError::NonNumeric(display))
    }

    /// Short unit text, e.g. `mV` or `kOhm`.
    pub fn unit_symbol(&self) -> String {
        readable_unit(&self.units)
    }
}

impl From<RawFields> for Reading {
    fn from(fields: RawFields) -> Self {
        Self::from_fields(fields)
    }
}

impl Display for Reading {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())?;

        let unit = self.unit_symbol();
        if !unit.is_empty() {
            write!(f, " {unit}")?;
        }

        let flags = self
            .flags
            .iter()
            .filter(|flag| **flag != Flag::Negative)
            .map(|flag| flag.name())
            .collect::<Vec<_>>();
        if !flags.is_empty() {
            write!(f, " [{}]", flags.join(" "))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(segments: [u8; DIGITS], decimal_points: [bool; DIGITS]) -> RawFields {
        RawFields {
            segments,
            decimal_points,
            ..Default::default()
        }
    }

    #[test]
    fn display_inserts_decimal_point() {
        let reading = Reading::from_fields(fields(
            [0x7D, 0x05, 0x7D, 0x3F],
            [false, false, true, false],
        ));

        assert_eq!(reading.display(), "010.9");
        assert_eq!(reading.decimal_position(), Some(2));
        assert_eq!(reading.value(), Ok(10.9));
        assert!(reading.anomalies().is_empty());
    }

    #[test]
    fn display_without_decimal_point() {
        let reading = Reading::from_fields(fields([0x7D, 0x7D, 0x7D, 0x7E], [false; DIGITS]));

        assert_eq!(reading.display(), "0006");
        assert_eq!(reading.decimal_position(), None);
        assert_eq!(reading.value(), Ok(6.0));
    }

    #[test]
    fn blanks_render_as_nothing() {
        let reading = Reading::from_fields(fields(
            [0x00, 0x05, 0x00, 0x5B],
            [false, true, false, false],
        ));

        assert_eq!(reading.display(), "1.2");
        assert!(reading.anomalies().is_empty());
    }

    #[test]
    fn negative_sign_and_flag() {
        let mut raw = fields([0x05, 0x5B, 0x1F, 0x27], [true, false, false, false]);
        raw.negative = true;
        raw.flags = vec![Flag::Dc, Flag::Hold];

        let reading = Reading::from_fields(raw);
        assert_eq!(reading.display(), "-1.234");
        assert!(reading.is_negative());
        assert_eq!(reading.flags(), &[Flag::Dc, Flag::Negative, Flag::Hold]);
        assert_eq!(reading.value(), Ok(-1.234));
    }

    #[test]
    fn overflow_is_not_numeric() {
        let reading = Reading::from_fields(fields(
            [0x00, 0x7D, 0x68, 0x00],
            [false, true, false, false],
        ));

        assert_eq!(reading.display(), "0.L");
        assert!(reading.is_overflow());
        assert!(matches!(reading.value(), Err(ReadingError::NonNumeric(_))));
    }

    #[test]
    fn several_decimal_points_are_flagged() {
        let reading = Reading::from_fields(fields(
            [0x05, 0x5B, 0x1F, 0x27],
            [true, false, true, false],
        ));

        assert_eq!(reading.display(), "1.23.4");
        assert_eq!(reading.decimal_position(), None);
        assert_eq!(
            reading.anomalies(),
            &[Anomaly::MultipleDecimalPoints(0b0101)]
        );
        assert!(reading.value().is_err());
    }

    #[test]
    fn unknown_patterns_are_reported() {
        let reading = Reading::from_fields(fields([0x01, 0x05, 0x00, 0x05], [false; DIGITS]));

        assert_eq!(reading.display(), "11");
        assert_eq!(
            reading.anomalies(),
            &[Anomaly::UnknownSegment {
                position: 0,
                pattern: 0x01
            }]
        );
    }

    #[test]
    fn display_trait_includes_unit_and_flags() {
        let mut raw = fields([0x7D, 0x05, 0x7D, 0x3F], [false, false, true, false]);
        raw.flags = vec![Flag::Dc, Flag::Autorange];
        raw.units = vec![Unit::Volt, Unit::Milli];

        let reading = Reading::from(raw);
        assert_eq!(reading.units(), &[Unit::Milli, Unit::Volt]);
        assert_eq!(reading.to_string(), "010.9 mV [DC AUTORANGE]");
    }
}
