//! # OxiArc Core
//!
//! Bit-level primitives shared by the DEFLATE engine and its gzip wrapper.
//!
//! - [`bitstream`]: `BitReader`/`BitWriter`, DEFLATE's LSB-first bit packing
//!   plus the MSB-first convention used for Huffman codes.
//! - [`crc`]: CRC-32 (IEEE 802.3) behind a small [`crc::Digest`] trait so the
//!   LZSS window in `oxiarc-deflate` never hardcodes a checksum algorithm.
//! - [`error`]: the error type for bit-stream-level failures.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ oxiarc-gzip    gzip container (RFC 1952)     │
//! ├─────────────────────────────────────────────┤
//! │ oxiarc-deflate DEFLATE engine (RFC 1951)     │
//! ├─────────────────────────────────────────────┤
//! │ oxiarc-core    BitReader/BitWriter, CRC-32   │
//! └─────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bitstream;
pub mod crc;
pub mod error;

pub use bitstream::{BitReader, BitWriter};
pub use crc::Crc32;
pub use error::{OxiArcError, Result};
