//! Utility functions and supporting infrastructure.
//!
//! Provides the bit reader used for field extraction and the error types
//! shared by the assembler and decoders.

pub mod bitstream_io;
pub mod errors;
