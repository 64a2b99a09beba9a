//! Errors specific to the gzip container format.

use oxiarc_deflate::DeflateError;
use thiserror::Error;

/// Errors raised while reading or writing a gzip member.
#[derive(Debug, Error)]
pub enum GzipError {
    /// The DEFLATE payload itself failed to encode or decode.
    #[error(transparent)]
    Deflate(#[from] DeflateError),

    /// The stream did not start with the gzip magic bytes `0x1F 0x8B`.
    #[error("not a gzip stream")]
    NotGzip,

    /// The compression method byte (`CM`) was not 8 (DEFLATE).
    #[error("unsupported compression method {0}")]
    UnsupportedCM(u8),

    /// The trailer's CRC-32 did not match the decompressed data.
    #[error("CRC-32 mismatch: stream says {expected:#010x}, computed {actual:#010x}")]
    CrcMismatch {
        /// CRC-32 recorded in the trailer.
        expected: u32,
        /// CRC-32 actually computed over the decompressed output.
        actual: u32,
    },

    /// The trailer's `ISIZE` did not match the decompressed data's length
    /// modulo 2^32.
    #[error("size mismatch: stream says {expected}, got {actual}")]
    SizeMismatch {
        /// `ISIZE` recorded in the trailer.
        expected: u32,
        /// Actual decompressed length, masked to 32 bits.
        actual: u32,
    },
}

/// Result type alias for `oxiarc-gzip` operations.
pub type Result<T> = std::result::Result<T, GzipError>;
