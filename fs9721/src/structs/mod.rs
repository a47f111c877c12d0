//! Data structures representing the decoded packet.
//!
//! Contains the bit layout of the data buffer, the seven-segment digit
//! table, the flag and unit indicators, and the final [`reading::Reading`].

pub mod fields;
pub mod flags;
pub mod reading;
pub mod segment;
