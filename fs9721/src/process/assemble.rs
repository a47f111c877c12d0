use std::fmt::{Display, Formatter};

use log::{debug, trace};

use crate::utils::errors::AssembleError;

/// Number of octets in one packet on the wire.
pub const PACKET_LEN: usize = 14;

/// Number of payload bytes once the index nibbles are stripped.
pub const DATA_LEN: usize = 7;

/// The 7-byte payload rebuilt from a 14-octet packet.
///
/// Byte `k` holds the data nibble of octet `2k` in its high half and the data
/// nibble of octet `2k + 1` in its low half.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DataBuffer(pub [u8; DATA_LEN]);

impl DataBuffer {
    fn pack(nibbles: &[u8; PACKET_LEN]) -> Self {
        let mut data = [0u8; DATA_LEN];
        for (k, pair) in nibbles.chunks_exact(2).enumerate() {
            data[k] = (pair[0] << 4) | pair[1];
        }
        Self(data)
    }
}

impl AsRef<[u8]> for DataBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Display for DataBuffer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}

/// Rebuilds packets from index-tagged octets.
///
/// The high nibble of every octet is its 1-based position in the packet and
/// the low nibble is payload. A delivery may be the whole packet or a chunk
/// of it; chunks are stored by index in a fixed 14-slot table, so a packet
/// split as 8 + 6 octets is rebuilt whichever half arrives first.
///
/// One assembler belongs to one device connection. The table is cleared
/// after every completed packet and after every integrity failure.
///
/// # Example
///
/// ```rust
/// use fs9721::process::assemble::Assembler;
///
/// let packet = [
///     0x17, 0x27, 0x3D, 0x40, 0x55, 0x67, 0x7D,
///     0x8B, 0x9F, 0xA0, 0xB8, 0xC0, 0xD4, 0xE1,
/// ];
///
/// let mut assembler = Assembler::default();
/// assert!(assembler.push_bytes(&packet[8..])?.is_none());
/// let data = assembler.push_bytes(&packet[..8])?.unwrap();
///
/// assert_eq!(data, Assembler::reassemble(&packet)?);
/// # Ok::<(), fs9721::utils::errors::AssembleError>(())
/// ```
#[derive(Debug, Default)]
pub struct Assembler {
    slots: [Option<u8>; PACKET_LEN],
    collected: usize,
}

impl Assembler {
    /// Rebuilds the data buffer from one complete 14-octet packet.
    ///
    /// Fails with [`AssembleError::IndexMismatch`] if any octet carries the
    /// wrong index, and with [`AssembleError::Incomplete`] if fewer than 14
    /// octets are given.
    pub fn reassemble(packet: &[u8]) -> Result<DataBuffer, AssembleError> {
        let mut assembler = Self::default();
        match assembler.push_bytes(packet)? {
            Some(data) => Ok(data),
            None => assembler.finish(),
        }
    }

    /// Adds one transport delivery to the table.
    ///
    /// The first octet's index places the chunk; every following octet must
    /// carry the next index. Returns the data buffer once all 14 indices are
    /// present, `None` while the packet is still partial.
    ///
    /// A chunk whose indices are already filled belongs to a new packet: the
    /// stale partial packet is dropped with [`AssembleError::DuplicateIndex`]
    /// and the chunk is kept as the start of the next one. A whole packet
    /// simply replaces the stale octets.
    pub fn push_bytes(&mut self, chunk: &[u8]) -> Result<Option<DataBuffer>, AssembleError> {
        let Some(&first) = chunk.first() else {
            return Ok(None);
        };

        let start = match Self::index_of(first) {
            0 => {
                self.clear();
                return Err(AssembleError::IndexMismatch {
                    position: 0,
                    expected: 1,
                    actual: 0,
                });
            }
            index => index as usize - 1,
        };

        if let Err(e) = Self::check_chunk(start, chunk) {
            self.clear();
            return Err(e);
        }

        if let Some(index) = self.first_filled(start, chunk.len()) {
            debug!(
                "Index {index} already received, dropping {} stale octets",
                self.collected
            );
            self.clear();
            self.store(start, chunk);

            if self.collected < PACKET_LEN {
                return Err(AssembleError::DuplicateIndex(index));
            }
            return self.finish().map(Some);
        }

        self.store(start, chunk);

        trace!(
            "Accepted {} octets at indices {}..={} ({}/{PACKET_LEN})",
            chunk.len(),
            start + 1,
            start + chunk.len(),
            self.collected
        );

        if self.collected < PACKET_LEN {
            return Ok(None);
        }

        self.finish().map(Some)
    }

    /// Produces the data buffer from the accumulated octets.
    ///
    /// Leaves the table untouched and reports [`AssembleError::Incomplete`]
    /// if indices are still missing.
    pub fn finish(&mut self) -> Result<DataBuffer, AssembleError> {
        let mut nibbles = [0u8; PACKET_LEN];
        for (slot, nibble) in self.slots.iter().zip(nibbles.iter_mut()) {
            match slot {
                Some(value) => *nibble = *value,
                None => {
                    debug!("Packet incomplete with {} octets", self.collected);
                    return Err(AssembleError::Incomplete {
                        collected: self.collected,
                    });
                }
            }
        }

        self.clear();

        let data = DataBuffer::pack(&nibbles);
        trace!("Reassembled data buffer: {data}");

        Ok(data)
    }

    /// Number of octets held for the packet being assembled.
    pub fn pending(&self) -> usize {
        self.collected
    }

    /// Drops any partially assembled packet.
    pub fn clear(&mut self) {
        self.slots = [None; PACKET_LEN];
        self.collected = 0;
    }

    fn check_chunk(start: usize, chunk: &[u8]) -> Result<(), AssembleError> {
        for (offset, &octet) in chunk.iter().enumerate() {
            let position = start + offset;
            let expected = (position + 1) as u8;
            let actual = Self::index_of(octet);

            if position >= PACKET_LEN || actual != expected {
                return Err(AssembleError::IndexMismatch {
                    position,
                    expected,
                    actual,
                });
            }
        }

        Ok(())
    }

    /// 1-based index of the first slot in `start..start + len` already filled.
    fn first_filled(&self, start: usize, len: usize) -> Option<u8> {
        (start..start + len)
            .find(|&position| self.slots[position].is_some())
            .map(|position| (position + 1) as u8)
    }

    fn store(&mut self, start: usize, chunk: &[u8]) {
        for (offset, &octet) in chunk.iter().enumerate() {
            self.slots[start + offset] = Some(octet & 0x0F);
        }
        self.collected += chunk.len();
    }

    #[inline(always)]
    const fn index_of(octet: u8) -> u8 {
        octet >> 4
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::EXAMPLE_PACKETS;

    fn packed(packet: &[u8; PACKET_LEN]) -> [u8; DATA_LEN] {
        let mut data = [0u8; DATA_LEN];
        for (i, octet) in packet.iter().enumerate() {
            let nibble = octet & 0x0F;
            data[i / 2] |= if i % 2 == 0 { nibble << 4 } else { nibble };
        }
        data
    }

    #[test]
    fn reassembles_known_packets() -> anyhow::Result<()> {
        let data = Assembler::reassemble(&EXAMPLE_PACKETS[0])?;
        assert_eq!(data.0, [0x77, 0xD7, 0xD5, 0xB9, 0x70, 0x80, 0x41]);

        let packet = [
            0x1D, 0x2E, 0x3A, 0x4D, 0x5B, 0x6E, 0x7E, 0x8F, 0x91, 0xA2, 0xB3, 0xC4, 0xD5, 0xE0,
        ];
        let data = Assembler::reassemble(&packet)?;
        assert_eq!(data.0, [0xDE, 0xAD, 0xBE, 0xEF, 0x12, 0x34, 0x50]);
        Ok(())
    }

    #[test]
    fn packs_low_nibbles_for_any_payload() -> anyhow::Result<()> {
        for seed in 0..64u8 {
            let mut packet = [0u8; PACKET_LEN];
            for (i, octet) in packet.iter_mut().enumerate() {
                let nibble = (seed.wrapping_mul(7).wrapping_add(i as u8 * 5)) & 0x0F;
                *octet = ((i as u8 + 1) << 4) | nibble;
            }

            assert_eq!(Assembler::reassemble(&packet)?.0, packed(&packet));
        }
        Ok(())
    }

    #[test]
    fn rejects_any_single_bad_index() {
        for position in 0..PACKET_LEN {
            let mut packet = EXAMPLE_PACKETS[1];
            packet[position] ^= 0x30;

            let err = Assembler::reassemble(&packet).unwrap_err();
            assert!(err.is_integrity(), "position {position}: {err}");
        }
    }

    #[test]
    fn reports_mismatch_position() {
        let mut packet = EXAMPLE_PACKETS[0];
        packet.swap(4, 5);

        assert_eq!(
            Assembler::reassemble(&packet),
            Err(AssembleError::IndexMismatch {
                position: 4,
                expected: 5,
                actual: 6,
            })
        );
    }

    #[test]
    fn short_packet_is_incomplete() {
        let err = Assembler::reassemble(&EXAMPLE_PACKETS[0][..13]).unwrap_err();
        assert_eq!(err, AssembleError::Incomplete { collected: 13 });
        assert!(err.is_incomplete());
    }

    #[test]
    fn long_packet_is_rejected() {
        let mut packet = EXAMPLE_PACKETS[0].to_vec();
        packet.push(0xF0);

        let err = Assembler::reassemble(&packet).unwrap_err();
        assert!(err.is_integrity());
    }

    #[test]
    fn chunks_merge_in_either_order() -> anyhow::Result<()> {
        let packet = EXAMPLE_PACKETS[1];
        let whole = Assembler::reassemble(&packet)?;

        let mut assembler = Assembler::default();
        assert_eq!(assembler.push_bytes(&packet[..8])?, None);
        assert_eq!(assembler.pending(), 8);
        assert_eq!(assembler.push_bytes(&packet[8..])?, Some(whole));
        assert_eq!(assembler.pending(), 0);

        assert_eq!(assembler.push_bytes(&packet[8..])?, None);
        assert_eq!(assembler.push_bytes(&packet[..8])?, Some(whole));
        Ok(())
    }

    #[test]
    fn finish_waits_for_missing_indices() -> anyhow::Result<()> {
        let packet = EXAMPLE_PACKETS[0];
        let mut assembler = Assembler::default();

        assembler.push_bytes(&packet[8..])?;
        assert_eq!(
            assembler.finish(),
            Err(AssembleError::Incomplete { collected: 6 })
        );

        assert!(assembler.push_bytes(&packet[..8])?.is_some());
        Ok(())
    }

    #[test]
    fn duplicate_chunk_starts_new_packet() -> anyhow::Result<()> {
        let packet = EXAMPLE_PACKETS[0];
        let mut assembler = Assembler::default();

        assembler.push_bytes(&packet[..8])?;
        assert_eq!(
            assembler.push_bytes(&packet[..8]),
            Err(AssembleError::DuplicateIndex(1))
        );
        assert_eq!(assembler.pending(), 8);

        assert_eq!(
            assembler.push_bytes(&packet[8..])?,
            Some(Assembler::reassemble(&packet)?)
        );
        Ok(())
    }

    #[test]
    fn recovers_after_lost_second_half() -> anyhow::Result<()> {
        let mut assembler = Assembler::default();

        // The second half of the first packet never arrives.
        assert_eq!(assembler.push_bytes(&EXAMPLE_PACKETS[0][..8])?, None);

        for (i, packet) in EXAMPLE_PACKETS.iter().enumerate().skip(1) {
            let first = assembler.push_bytes(&packet[..8]);
            if i == 1 {
                assert_eq!(first, Err(AssembleError::DuplicateIndex(1)));
            } else {
                assert_eq!(first, Ok(None));
            }

            assert_eq!(
                assembler.push_bytes(&packet[8..])?,
                Some(Assembler::reassemble(packet)?),
                "packet {i}"
            );
        }
        Ok(())
    }

    #[test]
    fn whole_packet_replaces_stale_octets() -> anyhow::Result<()> {
        let mut assembler = Assembler::default();

        assembler.push_bytes(&EXAMPLE_PACKETS[0][8..])?;
        assert_eq!(
            assembler.push_bytes(&EXAMPLE_PACKETS[2])?,
            Some(Assembler::reassemble(&EXAMPLE_PACKETS[2])?)
        );
        assert_eq!(assembler.pending(), 0);
        Ok(())
    }

    #[test]
    fn reassembles_whole_packet() {
        assert_eq!(
            Assembler::reassemble(&EXAMPLE_PACKETS[1]),
            Ok(DataBuffer([0x77, 0xD0, 0x57, 0xDB, 0xF0, 0x80, 0x41]))
        );
    }

    #[test]
    fn misaligned_chunk_clears_state() -> anyhow::Result<()> {
        let packet = EXAMPLE_PACKETS[0];
        let mut assembler = Assembler::default();

        assembler.push_bytes(&packet[..8])?;
        let err = assembler.push_bytes(&[packet[8], packet[10]]).unwrap_err();
        assert!(err.is_integrity());
        assert_eq!(assembler.pending(), 0);

        let err = assembler.push_bytes(&[0x05, 0x17]).unwrap_err();
        assert!(err.is_integrity());
        assert_eq!(assembler.pending(), 0);
        Ok(())
    }

    #[test]
    fn empty_chunk_is_ignored() -> anyhow::Result<()> {
        let mut assembler = Assembler::default();
        assert_eq!(assembler.push_bytes(&[])?, None);
        assert_eq!(assembler.pending(), 0);
        Ok(())
    }
}
