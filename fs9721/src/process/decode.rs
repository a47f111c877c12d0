use log::Level::Warn;
use log::{debug, trace, warn};

use crate::log_or_err;
use crate::process::assemble::{Assembler, DataBuffer};
use crate::structs::fields::{BitOrder, RawFields};
use crate::structs::reading::{Anomaly, Reading};
use crate::utils::errors::DecodeError;

/// Turns notification payloads from one meter into readings.
///
/// Owns the [`Assembler`] of a single connection, the bit order selected for
/// the meter, and the fail level deciding whether anomalies are logged or
/// returned as errors.
///
/// # Example
///
/// ```rust
/// use fs9721::process::EXAMPLE_PACKETS;
/// use fs9721::process::decode::Decoder;
///
/// let mut decoder = Decoder::default();
///
/// for packet in EXAMPLE_PACKETS {
///     let (first, second) = packet.split_at(8);
///     assert!(decoder.push_bytes(first)?.is_none());
///
///     let reading = decoder.push_bytes(second)?.unwrap();
///     println!("{reading}");
/// }
/// # Ok::<(), fs9721::utils::errors::DecodeError>(())
/// ```
#[derive(Debug)]
pub struct Decoder {
    assembler: Assembler,
    bit_order: BitOrder,
    fail_level: log::Level,
    packets_decoded: usize,
    packets_rejected: usize,
}

impl Default for Decoder {
    fn default() -> Self {
        Self {
            assembler: Assembler::default(),
            bit_order: BitOrder::default(),
            fail_level: log::Level::Error,
            packets_decoded: 0,
            packets_rejected: 0,
        }
    }
}

impl Decoder {
    pub fn new(bit_order: BitOrder) -> Self {
        Self {
            bit_order,
            ..Default::default()
        }
    }

    pub fn with_bit_order(mut self, bit_order: BitOrder) -> Self {
        self.bit_order = bit_order;
        self
    }

    pub fn bit_order(&self) -> BitOrder {
        self.bit_order
    }

    /// Sets the failure level for decode anomalies.
    ///
    /// - `log::Level::Error`: anomalies are only logged (default)
    /// - `log::Level::Warn`: an ambiguous decimal point fails the packet
    pub fn set_fail_level(&mut self, level: log::Level) {
        self.fail_level = level;
    }

    /// Feeds one notification payload.
    ///
    /// Returns a reading when the payload completes a packet and `None`
    /// while waiting for the rest of it. Integrity failures discard the
    /// partial packet and are always returned.
    pub fn push_bytes(&mut self, chunk: &[u8]) -> Result<Option<Reading>, DecodeError> {
        match self.assembler.push_bytes(chunk) {
            Ok(Some(data)) => self.decode(&data).map(Some),
            Ok(None) => Ok(None),
            Err(e) => {
                self.packets_rejected += 1;
                warn!("Discarding packet: {e}");
                Err(e.into())
            }
        }
    }

    /// Decodes whatever has been accumulated.
    ///
    /// Fails with an incomplete error, leaving the partial packet in place,
    /// if indices are still missing.
    pub fn finish(&mut self) -> Result<Reading, DecodeError> {
        let data = self.assembler.finish()?;
        self.decode(&data)
    }

    /// Number of octets waiting for the rest of their packet.
    pub fn pending(&self) -> usize {
        self.assembler.pending()
    }

    /// Drops any partial packet, e.g. after a reconnect.
    pub fn reset(&mut self) {
        if self.assembler.pending() > 0 {
            debug!("Dropping {} pending octets", self.assembler.pending());
        }
        self.assembler.clear();
    }

    pub fn packets_decoded(&self) -> usize {
        self.packets_decoded
    }

    pub fn packets_rejected(&self) -> usize {
        self.packets_rejected
    }

    fn decode(&mut self, data: &DataBuffer) -> Result<Reading, DecodeError> {
        let reading = match self.check(decode_data(data, self.bit_order)?) {
            Ok(reading) => reading,
            Err(e) => {
                self.packets_rejected += 1;
                return Err(e);
            }
        };

        self.packets_decoded += 1;
        trace!("Packet {}: {reading}", self.packets_decoded);

        Ok(reading)
    }

    fn check(&self, reading: Reading) -> Result<Reading, DecodeError> {
        for anomaly in reading.anomalies() {
            if let Anomaly::MultipleDecimalPoints(mask) = *anomaly {
                log_or_err!(self, Warn, DecodeError::AmbiguousDecimalPoint(mask));
            }
        }

        Ok(reading)
    }
}

/// Decodes a reassembled data buffer.
pub fn decode_data(data: &DataBuffer, bit_order: BitOrder) -> Result<Reading, DecodeError> {
    let fields = RawFields::decode(data, bit_order)?;
    Ok(Reading::from_fields(fields))
}

/// Decodes one complete 14-octet packet.
pub fn decode_packet(packet: &[u8], bit_order: BitOrder) -> Result<Reading, DecodeError> {
    let data = Assembler::reassemble(packet)?;
    decode_data(&data, bit_order)
}
