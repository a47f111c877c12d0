/// Packet reassembly from index-tagged octets.
///
/// Provides the [`Assembler`](assemble::Assembler) that validates the index
/// nibbles and rebuilds the 7-byte [`DataBuffer`](assemble::DataBuffer),
/// from one buffer or from chunks delivered in any order.
pub mod assemble;

/// Decoding data buffers into readings.
///
/// Provides the per-connection [`Decoder`](decode::Decoder) and the
/// one-shot [`decode_packet`](decode::decode_packet).
pub mod decode;

/// Packets captured from a meter, with the display each one shows:
///
/// | Packet | Display | Flags | Units |
/// |---|---|---|---|
/// | 0 | `002.` | DC AUTORANGE CONNECTED MAXIMUM | MILLI VOLT |
/// | 1 | `010.9` | DC AUTORANGE CONNECTED MAXIMUM | MILLI VOLT |
/// | 2 | `009.8` | DC AUTORANGE CONNECTED MAXIMUM | MILLI VOLT |
/// | 3 | `007.8` | DC AUTORANGE CONNECTED MAXIMUM | MILLI VOLT |
/// | 4 | `0006` | DC CONNECTED | CELSIUS |
pub const EXAMPLE_PACKETS: [[u8; assemble::PACKET_LEN]; 5] = [
    [
        0x17, 0x27, 0x3D, 0x47, 0x5D, 0x65, 0x7B, 0x89, 0x97, 0xA0, 0xB8, 0xC0, 0xD4, 0xE1,
    ],
    [
        0x17, 0x27, 0x3D, 0x40, 0x55, 0x67, 0x7D, 0x8B, 0x9F, 0xA0, 0xB8, 0xC0, 0xD4, 0xE1,
    ],
    [
        0x17, 0x27, 0x3D, 0x47, 0x5D, 0x63, 0x7F, 0x8F, 0x9F, 0xA0, 0xB8, 0xC0, 0xD4, 0xE1,
    ],
    [
        0x17, 0x27, 0x3D, 0x47, 0x5D, 0x61, 0x75, 0x8F, 0x9F, 0xA0, 0xB8, 0xC0, 0xD4, 0xE1,
    ],
    [
        0x15, 0x27, 0x3D, 0x47, 0x5D, 0x67, 0x7D, 0x87, 0x9E, 0xA0, 0xB0, 0xC0, 0xD0, 0xE4,
    ],
];
