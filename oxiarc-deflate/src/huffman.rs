//! Canonical Huffman coding for DEFLATE (RFC 1951 §3.2).
//!
//! Three pieces, each grounded in a distinct piece of the reference
//! implementation:
//!
//! - [`build_lengths`]: length-limited code lengths from symbol frequencies,
//!   via the true package-merge algorithm rather than a Shannon-Fano
//!   approximation.
//! - [`CanonicalCode::from_lengths`]: RFC 1951's sequential `next_code`
//!   assignment, turning lengths into the codes actually written to the
//!   stream.
//! - The decode side of [`CanonicalCode`]: a small boxed binary trie walked
//!   one bit at a time through [`oxiarc_core::bitstream::HuffmanNode`].

use crate::error::{DeflateError, Result};
use oxiarc_core::bitstream::{BitReader, HuffmanNode};
use std::io::Read;
use std::rc::Rc;

/// Maximum code length in DEFLATE (15 bits).
pub const MAX_CODE_LENGTH: u8 = 15;

/// Size of the literal/length alphabet (0-285).
pub const LITLEN_ALPHABET_SIZE: usize = 286;

/// Size of the distance alphabet (0-29).
pub const DISTANCE_ALPHABET_SIZE: usize = 30;

/// Size of the code length alphabet (0-18).
pub const CODELEN_ALPHABET_SIZE: usize = 19;

/// End-of-block symbol in the literal/length alphabet.
pub const END_OF_BLOCK: u32 = 256;

/// A node in a leaf-package tree built by the package-merge algorithm.
///
/// Each package is a pair of younger coins; [`Coin::accumulate`] walks the
/// tree and increments the final code length of every leaf it contains,
/// mirroring `coin_base::accumulate` in the reference encoder.
enum Coin {
    Leaf { weight: u64, symbol: usize },
    Pair { weight: u64, left: Rc<Coin>, right: Rc<Coin> },
}

impl Coin {
    fn weight(&self) -> u64 {
        match self {
            Coin::Leaf { weight, .. } | Coin::Pair { weight, .. } => *weight,
        }
    }

    fn accumulate(&self, lengths: &mut [u32]) {
        match self {
            Coin::Leaf { symbol, .. } => lengths[*symbol] += 1,
            Coin::Pair { left, right, .. } => {
                left.accumulate(lengths);
                right.accumulate(lengths);
            }
        }
    }
}

/// Stably merge two already weight-sorted coin lists, preferring `a` on
/// ties (package-merge is correct regardless of tie order).
fn merge_by_weight(a: Vec<Rc<Coin>>, b: Vec<Rc<Coin>>) -> Vec<Rc<Coin>> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let mut ai = 0;
    let mut bi = 0;
    while ai < a.len() && bi < b.len() {
        if a[ai].weight() <= b[bi].weight() {
            out.push(a[ai].clone());
            ai += 1;
        } else {
            out.push(b[bi].clone());
            bi += 1;
        }
    }
    out.extend_from_slice(&a[ai..]);
    out.extend_from_slice(&b[bi..]);
    out
}

/// Build length-limited Huffman code lengths from symbol frequencies.
///
/// `frequencies[s]` is the number of occurrences of symbol `s`; a frequency
/// of 0 means the symbol is unused and receives length 0. Lengths never
/// exceed `max_length`. This is the package-merge algorithm: build one leaf
/// coin per used symbol, then for each bit position from `max_length` down
/// to 1, pair up the current (weight-sorted) coin list into packages and
/// merge those packages back in with the original leaves; the final list's
/// first `n - 1` coins, accumulated, give each symbol's optimal length.
pub fn build_lengths(frequencies: &[u32], max_length: u8) -> Vec<u8> {
    let alphabet_size = frequencies.len();
    let mut lengths = vec![0u8; alphabet_size];

    let mut symbols: Vec<(u64, usize)> = frequencies
        .iter()
        .enumerate()
        .filter(|&(_, &f)| f > 0)
        .map(|(s, &f)| (f as u64, s))
        .collect();

    if symbols.is_empty() {
        return lengths;
    }
    if symbols.len() == 1 {
        lengths[symbols[0].1] = 1;
        return lengths;
    }

    symbols.sort_by_key(|&(freq, sym)| (freq, sym));

    let leaves: Vec<Rc<Coin>> = symbols
        .iter()
        .map(|&(weight, symbol)| Rc::new(Coin::Leaf { weight, symbol }))
        .collect();

    let mut current = leaves.clone();
    for level in (0..max_length as usize).rev() {
        let mut packages = Vec::with_capacity(current.len() / 2);
        for pair in current.chunks_exact(2) {
            let (left, right) = (pair[0].clone(), pair[1].clone());
            packages.push(Rc::new(Coin::Pair {
                weight: left.weight() + right.weight(),
                left,
                right,
            }));
        }
        current = if level == 0 {
            packages
        } else {
            merge_by_weight(packages, leaves.clone())
        };
    }

    let mut counted = vec![0u32; alphabet_size];
    for coin in current.iter().take(symbols.len() - 1) {
        coin.accumulate(&mut counted);
    }
    for (len, slot) in counted.into_iter().zip(lengths.iter_mut()) {
        *slot = len as u8;
    }

    lengths
}

/// One node of the boxed decode trie. Children are created lazily while
/// walking each symbol's code, mirroring `make_huffman_tree`.
#[derive(Debug, Default)]
struct DecodeNode {
    children: [Option<Box<DecodeNode>>; 2],
    symbol: Option<u32>,
}

impl HuffmanNode for DecodeNode {
    fn child(&self, bit: u32) -> Option<&Self> {
        self.children[(bit & 1) as usize].as_deref()
    }

    fn symbol(&self) -> Option<u32> {
        self.symbol
    }
}

/// A canonical Huffman code: per-symbol `(code, length)` pairs for encoding,
/// plus a decode trie for the reverse direction.
#[derive(Debug)]
pub struct CanonicalCode {
    codes: Vec<Option<(u32, u8)>>,
    root: DecodeNode,
}

impl CanonicalCode {
    /// Build a canonical code from per-symbol lengths (0 meaning unused).
    ///
    /// Code values are assigned via RFC 1951's sequential `next_code`
    /// recurrence and are packed for [`oxiarc_core::bitstream::BitWriter::put_huffman`]
    /// (MSB-first, `length` significant bits).
    pub fn from_lengths(lengths: &[u8]) -> Result<Self> {
        let max_length = lengths.iter().copied().max().unwrap_or(0);
        if max_length > MAX_CODE_LENGTH {
            return Err(DeflateError::InvalidCoding(format!(
                "code length {max_length} exceeds maximum {MAX_CODE_LENGTH}"
            )));
        }

        let mut bl_count = vec![0u32; max_length as usize + 1];
        for &len in lengths {
            if len > 0 {
                bl_count[len as usize] += 1;
            }
        }

        let mut next_code = vec![0u32; max_length as usize + 1];
        let mut code = 0u32;
        for bits in 1..=max_length as usize {
            code = (code + bl_count[bits - 1]) << 1;
            next_code[bits] = code;
        }

        if max_length > 0 {
            let highest = next_code[max_length as usize] + bl_count[max_length as usize];
            if highest > (1u32 << max_length) {
                return Err(DeflateError::InvalidCoding(
                    "over-subscribed Huffman code".into(),
                ));
            }
        }

        let mut codes = vec![None; lengths.len()];
        let mut root = DecodeNode::default();
        for (symbol, &len) in lengths.iter().enumerate() {
            if len == 0 {
                continue;
            }
            let len = len as usize;
            let assigned = next_code[len];
            next_code[len] += 1;
            codes[symbol] = Some((assigned, len as u8));
            insert_into_tree(&mut root, assigned, len as u8, symbol as u32);
        }

        Ok(Self { codes, root })
    }

    /// The `(code, length)` pair for `symbol`, for use with
    /// [`oxiarc_core::bitstream::BitWriter::put_huffman`].
    pub fn code(&self, symbol: usize) -> Option<(u32, u8)> {
        self.codes.get(symbol).copied().flatten()
    }

    /// The code length assigned to `symbol`, or 0 if unused.
    pub fn length(&self, symbol: usize) -> u8 {
        self.codes.get(symbol).copied().flatten().map_or(0, |(_, l)| l)
    }

    /// Decode one symbol from the stream by walking the trie bit by bit.
    pub fn decode<R: Read>(&self, reader: &mut BitReader<R>) -> Result<u32> {
        reader
            .get_huffman_tree(&self.root)?
            .ok_or(DeflateError::InvalidHuffman)
    }
}

fn insert_into_tree(root: &mut DecodeNode, code: u32, length: u8, symbol: u32) {
    let mut node = root;
    for i in 0..length {
        let bit = (code >> (length - i - 1)) & 1;
        node = node.children[bit as usize].get_or_insert_with(|| Box::new(DecodeNode::default()));
    }
    node.symbol = Some(symbol);
}
