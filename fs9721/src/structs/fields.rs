//! Bit layout of the 7-byte data buffer.
//!
//! ## Numbering
//!
//! Bits are numbered 0..=55 in reading order: byte 0 first, and within each
//! byte the most significant bit first. [`BitOrder`] is applied to the buffer
//! before numbering, so the same table serves meters that deliver each byte
//! mirrored.
//!
//! ## Layout
//!
//! | Bits    | Field |
//! |---------|-------|
//! | 0..=3   | AC, DC, AUTORANGE, CONNECTED |
//! | 4       | sign |
//! | 5..=11  | digit 1 segments, then bit 12 its decimal point |
//! | 13..=19 | digit 2 segments, then bit 20 its decimal point |
//! | 21..=27 | digit 3 segments, then bit 28 its decimal point |
//! | 29..=35 | digit 4 segments |
//! | 36..=55 | one bit per unit or mode indicator, see [`PACKET_LAYOUT`] |

use log::trace;

use crate::process::assemble::{DATA_LEN, DataBuffer};
use crate::structs::flags::{Flag, Unit};
use crate::utils::bitstream_io::BsIoSliceReader;
use crate::utils::errors::DecodeError;

/// Number of digit positions on the display.
pub const DIGITS: usize = 4;

/// Bit order of each byte of the data buffer as delivered by the meter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BitOrder {
    /// Bytes are read exactly as reassembled.
    #[default]
    AsDelivered,
    /// The bits of every byte are mirrored before reading.
    Reversed,
}

impl BitOrder {
    pub fn apply(self, data: &DataBuffer) -> [u8; DATA_LEN] {
        match self {
            BitOrder::AsDelivered => data.0,
            BitOrder::Reversed => data.0.map(u8::reverse_bits),
        }
    }
}

/// What a run of bits in the data buffer means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Flag(Flag),
    Unit(Unit),
    Sign,
    /// Segment pattern of the digit at this position (0 is leftmost).
    Segments(usize),
    /// Decimal point drawn right after the digit at this position.
    DecimalPoint(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub offset: u32,
    pub width: u32,
    pub kind: FieldKind,
}

const fn field(offset: u32, width: u32, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        offset,
        width,
        kind,
    }
}

/// Every field of the data buffer in bit order.
pub const PACKET_LAYOUT: [FieldSpec; 32] = [
    field(0, 1, FieldKind::Flag(Flag::Ac)),
    field(1, 1, FieldKind::Flag(Flag::Dc)),
    field(2, 1, FieldKind::Flag(Flag::Autorange)),
    field(3, 1, FieldKind::Flag(Flag::Connected)),
    field(4, 1, FieldKind::Sign),
    field(5, 7, FieldKind::Segments(0)),
    field(12, 1, FieldKind::DecimalPoint(0)),
    field(13, 7, FieldKind::Segments(1)),
    field(20, 1, FieldKind::DecimalPoint(1)),
    field(21, 7, FieldKind::Segments(2)),
    field(28, 1, FieldKind::DecimalPoint(2)),
    field(29, 7, FieldKind::Segments(3)),
    field(36, 1, FieldKind::Unit(Unit::Micro)),
    field(37, 1, FieldKind::Unit(Unit::Nano)),
    field(38, 1, FieldKind::Unit(Unit::Kilo)),
    field(39, 1, FieldKind::Flag(Flag::Diode)),
    field(40, 1, FieldKind::Unit(Unit::Milli)),
    field(41, 1, FieldKind::Unit(Unit::Percent)),
    field(42, 1, FieldKind::Unit(Unit::Mega)),
    field(43, 1, FieldKind::Flag(Flag::Continuity)),
    field(44, 1, FieldKind::Unit(Unit::Farad)),
    field(45, 1, FieldKind::Unit(Unit::Ohm)),
    field(46, 1, FieldKind::Flag(Flag::Relative)),
    field(47, 1, FieldKind::Flag(Flag::Hold)),
    field(48, 1, FieldKind::Unit(Unit::Amp)),
    field(49, 1, FieldKind::Unit(Unit::Volt)),
    field(50, 1, FieldKind::Unit(Unit::Hertz)),
    field(51, 1, FieldKind::Flag(Flag::LowBattery)),
    field(52, 1, FieldKind::Flag(Flag::Minimum)),
    field(53, 1, FieldKind::Unit(Unit::Celsius)),
    field(54, 1, FieldKind::Unit(Unit::Fahrenheit)),
    field(55, 1, FieldKind::Flag(Flag::Maximum)),
];

/// Field values extracted from one data buffer, before digit lookup.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawFields {
    pub negative: bool,
    pub segments: [u8; DIGITS],
    /// The last position has no decimal point bit and is always `false`.
    pub decimal_points: [bool; DIGITS],
    /// Active flags in bit order, excluding the sign.
    pub flags: Vec<Flag>,
    /// Active units in bit order.
    pub units: Vec<Unit>,
}

impl RawFields {
    /// Extracts every field of [`PACKET_LAYOUT`] from `data`.
    pub fn decode(data: &DataBuffer, order: BitOrder) -> Result<Self, DecodeError> {
        let bytes = order.apply(data);
        let reader = &mut BsIoSliceReader::from_slice(&bytes);

        let fields = Self::read(reader)?;
        trace!("Decoded fields ({order:?}): {fields:?}");

        Ok(fields)
    }

    fn read(reader: &mut BsIoSliceReader) -> Result<Self, DecodeError> {
        let mut fields = Self::default();

        for spec in PACKET_LAYOUT.iter() {
            let value: u8 = reader.get_n(spec.width)?;
            let set = value != 0;

            match spec.kind {
                FieldKind::Flag(flag) if set => fields.flags.push(flag),
                FieldKind::Unit(unit) if set => fields.units.push(unit),
                FieldKind::Flag(_) | FieldKind::Unit(_) => {}
                FieldKind::Sign => fields.negative = set,
                FieldKind::Segments(i) => fields.segments[i] = value,
                FieldKind::DecimalPoint(i) => fields.decimal_points[i] = set,
            }
        }

        Ok(fields)
    }

    /// Value of a single layout field, for diagnostics.
    pub fn field_value(
        data: &DataBuffer,
        order: BitOrder,
        spec: &FieldSpec,
    ) -> Result<u8, DecodeError> {
        let bytes = order.apply(data);
        let reader = &mut BsIoSliceReader::from_slice(&bytes);

        reader.skip_n(spec.offset)?;
        Ok(reader.get_n(spec.width)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::EXAMPLE_PACKETS;
    use crate::process::assemble::Assembler;

    #[test]
    fn layout_covers_every_bit_once() {
        let mut next = 0;
        for spec in PACKET_LAYOUT.iter() {
            assert_eq!(spec.offset, next, "{spec:?}");
            next += spec.width;
        }
        assert_eq!(next as usize, DATA_LEN * 8);
    }

    #[test]
    fn every_flag_and_unit_has_a_bit() {
        for flag in Flag::ALL.iter().filter(|f| **f != Flag::Negative) {
            let count = PACKET_LAYOUT
                .iter()
                .filter(|s| s.kind == FieldKind::Flag(*flag))
                .count();
            assert_eq!(count, 1, "{flag}");
        }
        for unit in Unit::ALL {
            let count = PACKET_LAYOUT
                .iter()
                .filter(|s| s.kind == FieldKind::Unit(unit))
                .count();
            assert_eq!(count, 1, "{unit}");
        }
    }

    #[test]
    fn decodes_example_packet() -> anyhow::Result<()> {
        let data = Assembler::reassemble(&EXAMPLE_PACKETS[1])?;
        let fields = RawFields::decode(&data, BitOrder::AsDelivered)?;

        assert!(!fields.negative);
        assert_eq!(fields.segments, [0x7D, 0x05, 0x7D, 0x3F]);
        assert_eq!(fields.decimal_points, [false, false, true, false]);
        assert_eq!(
            fields.flags,
            vec![Flag::Dc, Flag::Autorange, Flag::Connected, Flag::Maximum]
        );
        assert_eq!(fields.units, vec![Unit::Milli, Unit::Volt]);
        Ok(())
    }

    #[test]
    fn reversed_order_mirrors_each_byte() -> anyhow::Result<()> {
        let data = Assembler::reassemble(&EXAMPLE_PACKETS[1])?;
        let mirrored = DataBuffer(data.0.map(u8::reverse_bits));

        assert_eq!(
            RawFields::decode(&mirrored, BitOrder::Reversed)?,
            RawFields::decode(&data, BitOrder::AsDelivered)?
        );
        assert_ne!(
            RawFields::decode(&data, BitOrder::Reversed)?,
            RawFields::decode(&data, BitOrder::AsDelivered)?
        );
        Ok(())
    }

    #[test]
    fn single_bits_map_to_their_field() -> anyhow::Result<()> {
        for spec in PACKET_LAYOUT.iter().filter(|s| s.width == 1) {
            let mut bytes = [0u8; DATA_LEN];
            bytes[(spec.offset / 8) as usize] = 0x80 >> (spec.offset % 8);
            let data = DataBuffer(bytes);

            let fields = RawFields::decode(&data, BitOrder::AsDelivered)?;
            match spec.kind {
                FieldKind::Flag(flag) => assert_eq!(fields.flags, vec![flag]),
                FieldKind::Unit(unit) => assert_eq!(fields.units, vec![unit]),
                FieldKind::Sign => assert!(fields.negative),
                FieldKind::DecimalPoint(i) => assert!(fields.decimal_points[i]),
                FieldKind::Segments(_) => unreachable!(),
            }
            assert_eq!(RawFields::field_value(&data, BitOrder::AsDelivered, spec)?, 1);
        }
        Ok(())
    }
}
