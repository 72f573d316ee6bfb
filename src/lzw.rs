// lzw.rs
//
// Copyright (c) 2020-2026  Douglas Lau
//
//! Lempel-Ziv-Welch compression for GIF
use crate::bits::BitPacker;
use std::cmp::Ordering;
use std::ops::AddAssign;

/// Code Bits
#[derive(Clone, Copy, Debug, PartialEq)]
struct Bits(u8);

impl From<u8> for Bits {
    fn from(bits: u8) -> Self {
        Bits(bits.min(Self::MAX.0))
    }
}

impl From<Bits> for u8 {
    fn from(bits: Bits) -> Self {
        bits.0
    }
}

impl AddAssign<u8> for Bits {
    fn add_assign(&mut self, rhs: u8) {
        self.0 = (self.0 + rhs).min(Self::MAX.0)
    }
}

impl Bits {
    /// Maximum code bits allowed for GIF
    const MAX: Self = Bits(12);

    /// Get the number of entries
    fn entries(self) -> u16 {
        1 << (self.0 as u16)
    }
}

/// Code type
type Code = u16;

/// Dictionary node.
///
/// Each node links to its first extension (`next`), and to sibling
/// extensions of the same prefix ordered by symbol (`left` / `right`).
#[derive(Clone, Copy, Debug)]
struct Node {
    /// Next node code
    next: Option<Code>,
    /// Left node code
    left: Option<Code>,
    /// Right node code
    right: Option<Code>,
    /// Symbol value
    symbol: u8,
}

impl Node {
    /// Create a new node
    fn new(symbol: u8) -> Self {
        Node {
            next: None,
            left: None,
            right: None,
            symbol,
        }
    }

    /// Get a link code
    fn link(&self, ordering: Ordering) -> Option<Code> {
        match ordering {
            Ordering::Less => self.left,
            Ordering::Equal => self.next,
            Ordering::Greater => self.right,
        }
    }

    /// Set a link code
    fn set_link(&mut self, ordering: Ordering, code: Code) {
        match ordering {
            Ordering::Less => self.left = Some(code),
            Ordering::Equal => self.next = Some(code),
            Ordering::Greater => self.right = Some(code),
        }
    }
}

/// Code dictionary trie
#[derive(Debug)]
struct Trie {
    /// Table of codes
    table: Vec<Node>,
    /// Minimum code bits
    min_code_bits: u8,
}

impl Trie {
    /// Create a new code dictionary
    fn new(min_code_bits: u8) -> Self {
        let mut trie = Trie {
            table: Vec::with_capacity(usize::from(Bits::MAX.entries()) + 1),
            min_code_bits,
        };
        trie.reset();
        trie
    }

    /// Get the clear code
    fn clear_code(&self) -> Code {
        1 << self.min_code_bits
    }

    /// Get the end code
    fn end_code(&self) -> Code {
        self.clear_code() + 1
    }

    /// Get the next available code
    fn next_code(&self) -> Code {
        self.table.len() as Code
    }

    /// Reset the dictionary
    fn reset(&mut self) {
        self.table.clear();
        for symbol in 0..self.clear_code() {
            self.table.push(Node::new(symbol as u8));
        }
        self.table.push(Node::new(0)); // clear code
        self.table.push(Node::new(0)); // end code
    }

    /// Get a mutable node
    fn node_mut(&mut self, code: Code) -> &mut Node {
        debug_assert!(code < self.next_code());
        &mut self.table[code as usize]
    }

    /// Extend a match by one symbol.
    ///
    /// Returns the code of the extended string if it is in the dictionary;
    /// otherwise it is inserted and `None` is returned.
    fn search_insert(
        &mut self,
        code: Option<Code>,
        symbol: u8,
    ) -> Option<Code> {
        match code {
            Some(code) => self.insert(code, symbol),
            None => Some(Code::from(symbol)),
        }
    }

    /// Insert a node
    fn insert(&mut self, code: Code, symbol: u8) -> Option<Code> {
        let next_code = self.next_code();
        let mut node = self.node_mut(code);
        let mut ordering = Ordering::Equal;
        while let Some(code) = node.link(ordering) {
            node = self.node_mut(code);
            ordering = symbol.cmp(&node.symbol);
            if ordering == Ordering::Equal {
                return Some(code);
            }
        }
        node.set_link(ordering, next_code);
        self.table.push(Node::new(symbol));
        None
    }
}

/// LZW Data Compressor
pub struct Compressor {
    /// Code dictionary
    trie: Trie,
    /// Minimum code bits
    min_code_bits: u8,
    /// Current code bits
    code_bits: Bits,
}

impl Compressor {
    /// Create a new compressor.
    ///
    /// `min_code_bits` is clamped to the GIF range of 2 to 8.
    pub fn new(min_code_bits: u8) -> Self {
        let min_code_bits = min_code_bits.clamp(2, 8);
        Compressor {
            trie: Trie::new(min_code_bits),
            min_code_bits,
            code_bits: Bits::from(min_code_bits + 1),
        }
    }

    /// Pack one code at the current width
    fn pack(&self, code: Code, packer: &mut BitPacker) {
        packer.write_code(code, self.code_bits.into());
    }

    /// Compress a sequence of palette indices.
    ///
    /// Output starts with a clear code and ends with an end code.  Every
    /// index must be less than `2 ^ min_code_bits`.
    ///
    /// Code width grows when the next code no longer fits.  Once the
    /// dictionary passes 4096 entries, a clear code is written at 12 bits
    /// and the dictionary starts over; the entry that overflowed is never
    /// emitted, so decoders only see codes below 4096.
    pub fn compress(&mut self, indices: &[u8], packer: &mut BitPacker) {
        self.pack(self.trie.clear_code(), packer);
        let mut code = None;
        for &symbol in indices {
            debug_assert!(Code::from(symbol) < self.trie.clear_code());
            code = self.trie.search_insert(code, symbol).or_else(|| {
                if let Some(code) = code {
                    self.pack(code, packer);
                }
                Some(Code::from(symbol))
            });
            let next_code = self.trie.next_code();
            if next_code > self.code_bits.entries() {
                if next_code > Bits::MAX.entries() {
                    self.pack(self.trie.clear_code(), packer);
                    self.trie.reset();
                    self.code_bits = Bits::from(self.min_code_bits + 1);
                } else {
                    self.code_bits += 1;
                }
            }
        }
        if let Some(code) = code {
            self.pack(code, packer);
        }
        self.pack(self.trie.end_code(), packer);
    }
}

/// Compress palette indices into framed GIF data sub-blocks.
///
/// The result does not include the leading minimum code size byte, but
/// does include the zero-length terminator.
pub fn encode(indices: &[u8], min_code_size: u8) -> Vec<u8> {
    let mut packer = BitPacker::with_capacity(indices.len() / 2 + 16);
    Compressor::new(min_code_size).compress(indices, &mut packer);
    packer.flush_all()
}

/// Reference decoder, for checking compressed output
#[cfg(test)]
pub(crate) fn decode(payload: &[u8], min_code_size: u8) -> Vec<u8> {
    let clear = 1u16 << min_code_size;
    let end = clear + 1;
    let reset = |table: &mut Vec<Vec<u8>>| {
        table.clear();
        for i in 0..clear {
            table.push(vec![i as u8]);
        }
        table.push(vec![]);
        table.push(vec![]);
    };
    let mut table = Vec::new();
    reset(&mut table);
    let mut width = min_code_size + 1;
    let mut acc = 0u32;
    let mut n_bits = 0;
    let mut prev: Option<Vec<u8>> = None;
    let mut out = Vec::new();
    let mut bytes = payload.iter();
    loop {
        while n_bits < width {
            let byte = bytes.next().expect("truncated LZW data");
            acc |= u32::from(*byte) << n_bits;
            n_bits += 8;
        }
        let code = (acc & ((1 << width) - 1)) as u16;
        acc >>= width;
        n_bits -= width;
        if code == clear {
            reset(&mut table);
            width = min_code_size + 1;
            prev = None;
            continue;
        }
        if code == end {
            return out;
        }
        let entry = match (&prev, table.get(usize::from(code))) {
            (_, Some(e)) => e.clone(),
            (Some(p), None) if usize::from(code) == table.len() => {
                let mut e = p.clone();
                e.push(p[0]);
                e
            }
            _ => panic!("invalid code {}", code),
        };
        if let Some(p) = prev.take() {
            let mut e = p;
            e.push(entry[0]);
            table.push(e);
        }
        if table.len() + 1 > 1 << width && width < 12 {
            width += 1;
        }
        out.extend_from_slice(&entry);
        prev = Some(entry);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::bits::unframe;

    fn round_trip(indices: &[u8], min_code_size: u8) {
        let framed = encode(indices, min_code_size);
        let decoded = decode(&unframe(&framed), min_code_size);
        assert_eq!(decoded, indices);
    }

    #[test]
    fn compress_4x4() {
        let mut packer = BitPacker::new();
        Compressor::new(2).compress(
            &[1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 1, 1, 1, 1, 1, 2],
            &mut packer,
        );
        // 4 1 6 6 (3 bits) 2 9 9 7 8 5 (4 bits)
        assert_eq!(packer.flush_all(), [5, 0x8C, 0x2D, 0x99, 0x87, 0x05, 0]);
    }

    #[test]
    fn empty() {
        // clear (4) + end (5), 3 bits each
        assert_eq!(encode(&[], 2), [1, 0b101_100, 0]);
        round_trip(&[], 2);
    }

    #[test]
    fn min_code_size_clamped() {
        assert_eq!(encode(&[0, 1, 0], 0), encode(&[0, 1, 0], 2));
    }

    #[test]
    fn solid() {
        round_trip(&[0; 10_000], 2);
        round_trip(&[3; 100_000], 8);
    }

    #[test]
    fn code_growth_and_reset() {
        // pseudo-random indices fill the dictionary several times over
        let mut v = Vec::with_capacity(100_000);
        let mut x = 12345u32;
        for _ in 0..100_000 {
            x = x.wrapping_mul(1_103_515_245).wrapping_add(12345);
            v.push((x >> 16) as u8);
        }
        round_trip(&v, 8);
        let v4: Vec<u8> = v.iter().map(|b| b & 0x0F).collect();
        round_trip(&v4, 4);
    }

    #[test]
    fn repeated_patterns() {
        let v: Vec<u8> = (0..20_000).map(|i| ((i * 7) % 13) as u8).collect();
        round_trip(&v, 4);
    }

    #[test]
    fn deterministic() {
        let v: Vec<u8> = (0..5000).map(|i| (i % 251) as u8).collect();
        assert_eq!(encode(&v, 8), encode(&v, 8));
    }
}
