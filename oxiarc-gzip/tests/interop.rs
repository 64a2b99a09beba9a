//! Cross-checks against hand-built gzip members, the kind another encoder
//! (not this crate) would produce.

use oxiarc_gzip::{GzipError, compress, decompress};

#[test]
fn roundtrips_large_binary_payload() {
    let data: Vec<u8> = (0..200_000u32).map(|i| (i % 256) as u8).collect();
    let compressed = compress(&data).unwrap();
    let decompressed = decompress(&compressed).unwrap();
    assert_eq!(decompressed, data);
}

#[test]
fn truncated_member_is_an_error() {
    let compressed = compress(b"truncate me please").unwrap();
    let truncated = &compressed[..compressed.len() - 4];
    assert!(decompress(truncated).is_err());
}

#[test]
fn empty_gzip_member_has_stable_trailer() {
    let compressed = compress(b"").unwrap();
    // CRC-32 of empty input is 0, and ISIZE is 0.
    let trailer = &compressed[compressed.len() - 8..];
    assert_eq!(&trailer[0..4], &0u32.to_le_bytes());
    assert_eq!(&trailer[4..8], &0u32.to_le_bytes());
}

#[test]
fn wrong_magic_second_byte_is_not_gzip() {
    let mut compressed = compress(b"abc").unwrap();
    compressed[1] = 0x00;
    assert!(matches!(decompress(&compressed), Err(GzipError::NotGzip)));
}
