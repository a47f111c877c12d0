#![doc = include_str!("../README.md")]
//!
//! ## Technical Overview
//!
//! Decoder for the packet sent by multimeters built on the FS9721-LP3
//! controller, typically relayed over a BLE serial bridge.
//!
//! ### Packet Organization
//!
//! **Wire Structure**: 14 octets, each tagged with its 1-based index in the
//! high nibble and carrying 4 bits of payload in the low nibble.
//! **Payload Structure**: 56 bits holding mode flags, the sign, four
//! seven-segment digits with decimal points, and unit indicators.
//!
//! ### Delivery
//!
//! BLE links usually split a packet into an 8-octet and a 6-octet
//! notification. Either half may arrive first; the index nibbles place each
//! octet.
//!
//! ## Quick Start
//!
//! 1. Feed notification payloads to a [`process::decode::Decoder`]
//! 2. Collect each completed [`structs::reading::Reading`]
//!
//! ```rust,no_run
//! use fs9721::process::decode::Decoder;
//! use fs9721::structs::fields::BitOrder;
//!
//! let mut decoder = Decoder::new(BitOrder::AsDelivered);
//!
//! // Payloads as received from the notification characteristic
//! let notifications: [&[u8]; 2] = [
//!     &[0x17, 0x27, 0x3D, 0x40, 0x55, 0x67, 0x7D, 0x8B],
//!     &[0x9F, 0xA0, 0xB8, 0xC0, 0xD4, 0xE1],
//! ];
//!
//! for payload in notifications {
//!     match decoder.push_bytes(payload) {
//!         Ok(Some(reading)) => println!("{} {}", reading.display(), reading.unit_symbol()),
//!         Ok(None) => {} // waiting for the rest of the packet
//!         Err(e) => eprintln!("Packet dropped: {e}"),
//!     }
//! }
//! ```

/// Processing pipeline for meter packets.
///
/// 1. **Reassembly** ([`process::assemble`]): Validates index nibbles and
///    rebuilds the 7-byte data buffer.
///
/// 2. **Decoding** ([`process::decode`]): Extracts fields and builds readings.
pub mod process;

/// Data structures representing the decoded packet.
///
/// - **Fields** ([`structs::fields`]): Bit layout and bit order
/// - **Flags and Units** ([`structs::flags`]): LCD indicators
/// - **Segments** ([`structs::segment`]): Seven-segment digit table
/// - **Readings** ([`structs::reading`]): Immutable decoded reading
pub mod structs;

/// Utility functions and supporting infrastructure.
///
/// - **Bitstream I/O** ([`utils::bitstream_io`]): Bit-level reading
/// - **Error Handling** ([`utils::errors`]): Error types
pub mod utils;
