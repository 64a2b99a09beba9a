//! # OxiArc Gzip
//!
//! The gzip container format (RFC 1952) wrapped around
//! [`oxiarc_deflate`]'s DEFLATE engine: a 10-byte header, the compressed
//! payload, and an 8-byte trailer of CRC-32 + uncompressed size.
//!
//! Encoding always writes the minimal header (`FLG = 0`, `MTIME = 0`,
//! `XFL = 0`, `OS = 3`); decoding accepts and skips any of the optional
//! header fields (`FEXTRA`, `FNAME`, `FCOMMENT`, `FHCRC`) another encoder
//! may have written.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod error;

pub use error::{GzipError, Result};

use oxiarc_core::bitstream::{BitReader, BitWriter};
use oxiarc_core::crc::Crc32;
use oxiarc_deflate::{deflate_into, inflate_stream};

const MAGIC: [u8; 2] = [0x1F, 0x8B];
const CM_DEFLATE: u8 = 8;

const FLAG_FHCRC: u8 = 0x02;
const FLAG_FEXTRA: u8 = 0x04;
const FLAG_FNAME: u8 = 0x08;
const FLAG_FCOMMENT: u8 = 0x10;

/// Compress `data` into a complete gzip member.
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    {
        let mut writer = BitWriter::new(&mut output);
        writer.put_byte(MAGIC[0])?;
        writer.put_byte(MAGIC[1])?;
        writer.put_byte(CM_DEFLATE)?;
        writer.put_byte(0)?; // FLG: no optional fields
        writer.put_4byte(0)?; // MTIME: unset
        writer.put_byte(0)?; // XFL
        writer.put_byte(3)?; // OS: Unix

        deflate_into(&mut writer, data)?;
        writer.flush()?;

        let crc = Crc32::compute(data);
        writer.put_4byte(crc)?;
        // ISIZE is the uncompressed size modulo 2^32 (RFC 1952 §2.3.1);
        // tracked as u64 up to this point so only the final write truncates.
        writer.put_4byte((data.len() as u64 & 0xFFFF_FFFF) as u32)?;
    }
    Ok(output)
}

/// Decompress a single gzip member, verifying both trailer fields.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut reader = BitReader::new(data);

    let id1 = reader.get_byte()?;
    let id2 = reader.get_byte()?;
    if [id1, id2] != MAGIC {
        return Err(GzipError::NotGzip);
    }

    let cm = reader.get_byte()?;
    if cm != CM_DEFLATE {
        return Err(GzipError::UnsupportedCM(cm));
    }

    let flg = reader.get_byte()?;
    reader.skip_bytes(4)?; // MTIME
    reader.skip_bytes(1)?; // XFL
    reader.skip_bytes(1)?; // OS

    if flg & FLAG_FEXTRA != 0 {
        let xlen = reader.get_2byte()?;
        reader.skip_bytes(xlen)?;
    }
    if flg & FLAG_FNAME != 0 {
        reader.get_asciiz()?;
    }
    if flg & FLAG_FCOMMENT != 0 {
        reader.get_asciiz()?;
    }
    if flg & FLAG_FHCRC != 0 {
        reader.skip_bytes(2)?;
    }

    let output = inflate_stream(&mut reader)?;

    let expected_crc = reader.get_4byte()?;
    let actual_crc = Crc32::compute(&output);
    if expected_crc != actual_crc {
        return Err(GzipError::CrcMismatch {
            expected: expected_crc,
            actual: actual_crc,
        });
    }

    let expected_size = reader.get_4byte()?;
    let actual_size = (output.len() as u64 & 0xFFFF_FFFF) as u32;
    if expected_size != actual_size {
        return Err(GzipError::SizeMismatch {
            expected: expected_size,
            actual: actual_size,
        });
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hello_world_matches_known_trailer() {
        let data = b"Hello, World!\n";
        let compressed = compress(data).unwrap();
        assert_eq!(&compressed[0..2], &MAGIC);
        assert_eq!(compressed[2], CM_DEFLATE);
        let decompressed = decompress(&compressed).unwrap();
        assert_eq!(decompressed, data);
    }

    #[test]
    fn empty_input_roundtrips() {
        let compressed = compress(b"").unwrap();
        let decompressed = decompress(&compressed).unwrap();
        assert_eq!(decompressed, b"");
    }

    #[test]
    fn rejects_bad_magic() {
        let data = [0x00, 0x00, 0x08, 0, 0, 0, 0, 0, 0, 3];
        assert!(matches!(decompress(&data), Err(GzipError::NotGzip)));
    }

    #[test]
    fn rejects_unsupported_method() {
        let mut data = compress(b"abc").unwrap();
        data[2] = 9; // CM != 8
        assert!(matches!(
            decompress(&data),
            Err(GzipError::UnsupportedCM(9))
        ));
    }

    #[test]
    fn detects_crc_corruption() {
        let mut data = compress(b"some data to corrupt").unwrap();
        let len = data.len();
        data[len - 8] ^= 0xFF; // flip a byte inside the CRC field
        assert!(matches!(
            decompress(&data),
            Err(GzipError::CrcMismatch { .. })
        ));
    }

    #[test]
    fn detects_size_corruption() {
        let mut data = compress(b"some data to corrupt").unwrap();
        let len = data.len();
        data[len - 1] ^= 0xFF; // flip a byte inside ISIZE
        assert!(matches!(
            decompress(&data),
            Err(GzipError::SizeMismatch { .. })
        ));
    }

    #[test]
    fn decodes_header_with_fname_and_fcomment() {
        // Hand-build a gzip member with FNAME and FCOMMENT set, since this
        // crate's own encoder never emits them.
        let payload = oxiarc_deflate::deflate(b"named payload").unwrap();
        let mut data = Vec::new();
        data.extend_from_slice(&MAGIC);
        data.push(CM_DEFLATE);
        data.push(FLAG_FNAME | FLAG_FCOMMENT);
        data.extend_from_slice(&[0, 0, 0, 0]); // MTIME
        data.push(0); // XFL
        data.push(3); // OS
        data.extend_from_slice(b"name.txt\0");
        data.extend_from_slice(b"a comment\0");
        data.extend_from_slice(&payload);
        data.extend_from_slice(&Crc32::compute(b"named payload").to_le_bytes());
        data.extend_from_slice(&13u32.to_le_bytes());

        let decompressed = decompress(&data).unwrap();
        assert_eq!(decompressed, b"named payload");
    }

    #[test]
    fn decodes_header_with_fextra_and_fhcrc() {
        let payload = oxiarc_deflate::deflate(b"xyz").unwrap();
        let mut correct = Vec::new();
        correct.extend_from_slice(&MAGIC);
        correct.push(CM_DEFLATE);
        correct.push(FLAG_FEXTRA | FLAG_FHCRC);
        correct.extend_from_slice(&[0, 0, 0, 0]);
        correct.push(0);
        correct.push(3);
        correct.extend_from_slice(&4u16.to_le_bytes());
        correct.extend_from_slice(&[1, 2, 3, 4]);
        correct.extend_from_slice(&[0xAB, 0xCD]);
        correct.extend_from_slice(&payload);
        correct.extend_from_slice(&Crc32::compute(b"xyz").to_le_bytes());
        correct.extend_from_slice(&3u32.to_le_bytes());

        let decompressed = decompress(&correct).unwrap();
        assert_eq!(decompressed, b"xyz");
    }
}
