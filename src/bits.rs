// bits.rs
//
// Copyright (c) 2026  Douglas Lau
//
//! Bit packing into GIF data sub-blocks

/// Maximum length of one data sub-block
const SUB_BLOCK_SZ: usize = 0xFF;

/// Packer for variable-width codes.
///
/// Codes are accumulated LSB-first.  Each complete byte goes into a pending
/// sub-block, which is written to the output (prefixed with its length) as
/// soon as it holds 255 bytes.
#[derive(Debug, Default)]
pub struct BitPacker {
    /// Framed output (length-prefixed sub-blocks)
    output: Vec<u8>,
    /// Pending sub-block
    block: Vec<u8>,
    /// Bit accumulator
    code: u32,
    /// Number of bits in accumulator
    n_bits: u8,
    /// Total number of code bits written
    total_bits: usize,
}

impl BitPacker {
    /// Create a new bit packer
    pub fn new() -> Self {
        BitPacker {
            output: Vec::new(),
            block: Vec::with_capacity(SUB_BLOCK_SZ),
            code: 0,
            n_bits: 0,
            total_bits: 0,
        }
    }

    /// Create a bit packer with room for a given number of output bytes
    pub fn with_capacity(capacity: usize) -> Self {
        BitPacker {
            output: Vec::with_capacity(capacity),
            ..Self::new()
        }
    }

    /// Get the total number of code bits written
    pub fn bits_written(&self) -> usize {
        self.total_bits
    }

    /// Write one code, using the low `bits` bits
    pub fn write_code(&mut self, code: u16, bits: u8) {
        debug_assert!(bits > 0 && bits <= 16);
        let mask = (1u32 << bits) - 1;
        self.code |= (u32::from(code) & mask) << self.n_bits;
        self.n_bits += bits;
        self.total_bits += usize::from(bits);
        while self.n_bits >= 8 {
            self.push_byte(self.code as u8);
            self.code >>= 8;
            self.n_bits -= 8;
        }
    }

    /// Push one byte into the pending sub-block
    fn push_byte(&mut self, byte: u8) {
        self.block.push(byte);
        if self.block.len() == SUB_BLOCK_SZ {
            self.flush_block();
        }
    }

    /// Write the pending sub-block to output
    fn flush_block(&mut self) {
        let len = self.block.len();
        if len > 0 {
            self.output.push(len as u8);
            self.output.extend_from_slice(&self.block);
            self.block.clear();
        }
    }

    /// Flush all remaining bits, followed by a zero-length terminator
    pub fn flush_all(mut self) -> Vec<u8> {
        if self.n_bits > 0 {
            self.push_byte(self.code as u8);
            self.code = 0;
            self.n_bits = 0;
        }
        self.flush_block();
        self.output.push(0); // block terminator
        self.output
    }
}

/// Strip sub-block framing, returning only the payload bytes
#[cfg(test)]
pub(crate) fn unframe(mut framed: &[u8]) -> Vec<u8> {
    let mut payload = Vec::new();
    while let Some((&len, rest)) = framed.split_first() {
        if len == 0 {
            assert!(rest.is_empty(), "data after terminator");
            return payload;
        }
        let len = usize::from(len);
        payload.extend_from_slice(&rest[..len]);
        framed = &rest[len..];
    }
    panic!("missing terminator");
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty() {
        let bp = BitPacker::new();
        assert_eq!(bp.flush_all(), vec![0]);
    }

    #[test]
    fn lsb_first() {
        let mut bp = BitPacker::new();
        bp.write_code(0b100, 3);
        bp.write_code(0b001, 3);
        bp.write_code(0b101, 3);
        // 101_001_100 => 0b0100_1100, 0b1
        assert_eq!(bp.flush_all(), vec![2, 0b0100_1100, 0b1, 0]);
    }

    #[test]
    fn sub_blocks() {
        let mut bp = BitPacker::new();
        for i in 0..300 {
            bp.write_code(i as u16 & 0xFF, 8);
        }
        let out = bp.flush_all();
        assert_eq!(out.len(), 1 + 255 + 1 + 45 + 1);
        assert_eq!(out[0], 255);
        assert_eq!(out[256], 45);
        assert_eq!(out[1], 0);
        assert_eq!(out[255], 254);
        assert_eq!(out[257], 255);
        assert_eq!(out[258], 0);
        assert_eq!(*out.last().unwrap(), 0);
    }

    #[test]
    fn payload_length() {
        for bits in 2..=12 {
            for count in [0, 1, 7, 100, 1021] {
                let mut bp = BitPacker::new();
                for i in 0..count {
                    bp.write_code(i as u16, bits);
                }
                let total = bp.bits_written();
                assert_eq!(total, count * usize::from(bits));
                let out = bp.flush_all();
                assert_eq!(unframe(&out).len(), (total + 7) / 8);
                // every framed chunk is legal
                let mut pos = 0;
                while out[pos] != 0 {
                    pos += 1 + usize::from(out[pos]);
                }
                assert_eq!(pos, out.len() - 1);
            }
        }
    }
}
