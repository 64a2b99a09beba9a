//! Errors specific to the DEFLATE bitstream format.

use oxiarc_core::error::OxiArcError;
use thiserror::Error;

/// Errors raised while encoding or decoding a DEFLATE stream.
#[derive(Debug, Error)]
pub enum DeflateError {
    /// Bit-stream I/O failure from the underlying reader/writer.
    #[error(transparent)]
    Core(#[from] OxiArcError),

    /// A Huffman code read from the stream has no matching entry in the
    /// active tree.
    #[error("invalid Huffman code in bit stream")]
    InvalidHuffman,

    /// A set of code lengths does not form a valid canonical Huffman code
    /// (over- or under-subscribed).
    #[error("invalid Huffman coding: {0}")]
    InvalidCoding(String),

    /// A block header announced a `BTYPE` other than 0, 1, or 2.
    #[error("invalid block type {0}")]
    InvalidBlockType(u32),

    /// A stored block's `LEN`/`NLEN` fields were not complements of each
    /// other.
    #[error("invalid stored block: LEN/NLEN mismatch")]
    InvalidStoredBlock,
}

/// Result type alias for `oxiarc-deflate` operations.
pub type Result<T> = std::result::Result<T, DeflateError>;
