//! # OxiArc Deflate
//!
//! Pure Rust implementation of the DEFLATE compression algorithm (RFC 1951).
//!
//! ## Modules
//!
//! - [`lzss`]: LZ77 string matching over a 32 KiB window.
//! - [`huffman`]: canonical Huffman codes, built via package-merge for
//!   length-limited optimality.
//! - [`tables`]: the fixed Huffman code and the length/distance base+extra
//!   tables from RFC 1951 §3.2.5-3.2.6.
//! - [`encoder`]/[`decoder`]: block-level encode/decode, including the
//!   stored/fixed/dynamic block-type choice.
//!
//! ## Example
//!
//! ```rust
//! use oxiarc_deflate::{deflate, inflate};
//!
//! let original = b"Hello, World! Hello, World!";
//! let compressed = deflate(original).unwrap();
//! let decompressed = inflate(&compressed).unwrap();
//! assert_eq!(&decompressed, original);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod decoder;
pub mod encoder;
pub mod error;
pub mod huffman;
pub mod lzss;
pub mod tables;

pub use decoder::{inflate, inflate_stream};
pub use encoder::{deflate, deflate_into};
pub use error::{DeflateError, Result};
pub use huffman::CanonicalCode;
pub use lzss::{LzssMatcher, Token};
