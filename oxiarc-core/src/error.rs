//! Error type shared by OxiArc's bit-level I/O primitives.
//!
//! Format-specific failures (invalid Huffman codes, bad block types, gzip
//! container mismatches) live in `oxiarc-deflate` and `oxiarc-gzip`, which
//! wrap this error via `#[from]`. `oxiarc-core` only knows about the byte
//! stream underneath the bits.

use std::io;
use thiserror::Error;

/// Errors raised by [`crate::bitstream::BitReader`] and
/// [`crate::bitstream::BitWriter`].
#[derive(Debug, Error)]
pub enum OxiArcError {
    /// I/O error from the underlying reader/writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The underlying stream ended before the requested bits or bytes were
    /// available.
    #[error("unexpected end of stream")]
    UnexpectedEof,
}

/// Result type alias for `oxiarc-core` operations.
pub type Result<T> = std::result::Result<T, OxiArcError>;
