//! DEFLATE block decoding (RFC 1951 §3.2.3-3.2.7).
//!
//! Mirrors the three-way dispatch of the reference decoder's `decode`: read
//! `BFINAL`/`BTYPE`, hand off to the matching block reader, repeat until
//! `BFINAL` is set.

use crate::error::{DeflateError, Result};
use crate::huffman::{CanonicalCode, END_OF_BLOCK};
use crate::tables::{
    CODE_LENGTH_ORDER, DISTANCE_EXTRA_BITS, LENGTH_EXTRA_BITS, decode_distance, decode_length,
    fixed_distance_code, fixed_litlen_code,
};
use oxiarc_core::bitstream::BitReader;
use std::io::Read;

fn copy_match(output: &mut Vec<u8>, length: usize, distance: usize) -> Result<()> {
    let start = output
        .len()
        .checked_sub(distance)
        .ok_or(DeflateError::InvalidCoding("distance exceeds output so far".into()))?;
    // Matches may overlap their own source (distance < length), so bytes
    // must be copied one at a time rather than via a bulk slice copy.
    for i in 0..length {
        let byte = output[start + i];
        output.push(byte);
    }
    Ok(())
}

fn decode_symbols<R: Read>(
    reader: &mut BitReader<R>,
    litlen_code: &CanonicalCode,
    dist_code: &CanonicalCode,
    output: &mut Vec<u8>,
) -> Result<()> {
    loop {
        let symbol = litlen_code.decode(reader)?;
        if symbol == END_OF_BLOCK {
            return Ok(());
        }
        if symbol < END_OF_BLOCK {
            output.push(symbol as u8);
            continue;
        }

        let lcode = symbol as usize - 257;
        if lcode >= LENGTH_EXTRA_BITS.len() {
            return Err(DeflateError::InvalidCoding(format!(
                "length code {symbol} out of range"
            )));
        }
        let lextra = LENGTH_EXTRA_BITS[lcode];
        let lvalue = if lextra > 0 {
            reader.get_data(lextra as u32)?
        } else {
            0
        } as u16;
        let length = decode_length(symbol as u16, lvalue);

        let dsymbol = dist_code.decode(reader)?;
        if dsymbol as usize >= DISTANCE_EXTRA_BITS.len() {
            return Err(DeflateError::InvalidCoding(format!(
                "distance code {dsymbol} out of range"
            )));
        }
        let dextra = DISTANCE_EXTRA_BITS[dsymbol as usize];
        let dvalue = if dextra > 0 {
            reader.get_data(dextra as u32)?
        } else {
            0
        } as u16;
        let distance = decode_distance(dsymbol as u16, dvalue);

        copy_match(output, length as usize, distance as usize)?;
    }
}

fn decode_stored_block<R: Read>(reader: &mut BitReader<R>, output: &mut Vec<u8>) -> Result<()> {
    let len = reader.get_2byte()?;
    let nlen = reader.get_2byte()?;
    if len != (!nlen & 0xFFFF) {
        return Err(DeflateError::InvalidStoredBlock);
    }
    for _ in 0..len {
        output.push(reader.get_byte()?);
    }
    Ok(())
}

fn decode_fixed_block<R: Read>(reader: &mut BitReader<R>, output: &mut Vec<u8>) -> Result<()> {
    decode_symbols(reader, fixed_litlen_code()?, fixed_distance_code()?, output)
}

fn read_code_length_lengths<R: Read>(reader: &mut BitReader<R>, hclen: usize) -> Result<CanonicalCode> {
    let mut cl_lengths = vec![0u8; crate::huffman::CODELEN_ALPHABET_SIZE];
    for &order_symbol in CODE_LENGTH_ORDER.iter().take(hclen) {
        cl_lengths[order_symbol] = reader.get_data(3)? as u8;
    }
    CanonicalCode::from_lengths(&cl_lengths)
}

fn read_code_lengths<R: Read>(
    reader: &mut BitReader<R>,
    cl_code: &CanonicalCode,
    total: usize,
) -> Result<Vec<u8>> {
    let mut lengths = Vec::with_capacity(total);
    while lengths.len() < total {
        let symbol = cl_code.decode(reader)?;
        match symbol {
            0..=15 => lengths.push(symbol as u8),
            16 => {
                let previous = *lengths
                    .last()
                    .ok_or(DeflateError::InvalidCoding("repeat with no previous length".into()))?;
                let repeat = 3 + reader.get_data(2)?;
                for _ in 0..repeat {
                    lengths.push(previous);
                }
            }
            17 => {
                let repeat = 3 + reader.get_data(3)?;
                for _ in 0..repeat {
                    lengths.push(0);
                }
            }
            18 => {
                let repeat = 11 + reader.get_data(7)?;
                for _ in 0..repeat {
                    lengths.push(0);
                }
            }
            other => {
                return Err(DeflateError::InvalidCoding(format!(
                    "unexpected code-length symbol {other}"
                )));
            }
        }
    }
    if lengths.len() != total {
        return Err(DeflateError::InvalidCoding(
            "code-length run-length expansion overshot alphabet size".into(),
        ));
    }
    Ok(lengths)
}

fn decode_dynamic_block<R: Read>(reader: &mut BitReader<R>, output: &mut Vec<u8>) -> Result<()> {
    let hlit = reader.get_data(5)? as usize + 257;
    let hdist = reader.get_data(5)? as usize + 1;
    let hclen = reader.get_data(4)? as usize + 4;

    if hlit > crate::huffman::LITLEN_ALPHABET_SIZE {
        return Err(DeflateError::InvalidCoding(format!(
            "HLIT {hlit} exceeds the literal/length alphabet size"
        )));
    }

    let cl_code = read_code_length_lengths(reader, hclen)?;
    let combined = read_code_lengths(reader, &cl_code, hlit + hdist)?;

    let litlen_code = CanonicalCode::from_lengths(&combined[..hlit])?;
    let dist_code = CanonicalCode::from_lengths(&combined[hlit..])?;

    decode_symbols(reader, &litlen_code, &dist_code, output)
}

/// Decode a sequence of DEFLATE blocks from an already-open bit reader,
/// stopping right after the block with `BFINAL` set. Used directly by the
/// gzip wrapper, which keeps reading (the trailer) from the same reader
/// afterward.
pub fn inflate_stream<R: Read>(reader: &mut BitReader<R>) -> Result<Vec<u8>> {
    let mut output = Vec::new();

    loop {
        let bfinal = reader.get_data(1)?;
        let btype = reader.get_data(2)?;
        match btype {
            0 => decode_stored_block(reader, &mut output)?,
            1 => decode_fixed_block(reader, &mut output)?,
            2 => decode_dynamic_block(reader, &mut output)?,
            other => return Err(DeflateError::InvalidBlockType(other)),
        }
        if bfinal == 1 {
            break;
        }
    }

    Ok(output)
}

/// Decompress a complete DEFLATE stream.
pub fn inflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut reader = BitReader::new(data);
    inflate_stream(&mut reader)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::deflate;

    #[test]
    fn rejects_unknown_block_type() {
        // BFINAL=1, BTYPE=3 (invalid), packed LSB-first into one byte.
        let data = [0b0000_0111u8];
        assert!(matches!(
            inflate(&data),
            Err(DeflateError::InvalidBlockType(3))
        ));
    }

    #[test]
    fn rejects_stored_block_with_bad_nlen() {
        // BFINAL=1, BTYPE=0, then LEN=5, NLEN=5 (should be !LEN).
        let mut data = vec![0b0000_0001u8];
        data.extend_from_slice(&5u16.to_le_bytes());
        data.extend_from_slice(&5u16.to_le_bytes());
        assert!(matches!(
            inflate(&data),
            Err(DeflateError::InvalidStoredBlock)
        ));
    }

    #[test]
    fn truncated_stream_is_unexpected_eof() {
        let compressed = deflate(b"hello world").unwrap();
        let truncated = &compressed[..compressed.len() / 2];
        assert!(inflate(truncated).is_err());
    }

    #[test]
    fn stored_block_roundtrip() {
        let data = b"raw bytes, no patterns to exploit here: xq7!";
        let compressed = deflate(data).unwrap();
        assert_eq!(inflate(&compressed).unwrap(), data);
    }
}
