//! Bit reader for consuming the payload byte stream.
//!
//! Mirrors the writer: MSB-first within each byte, limited to the declared
//! `payload_bits` so zero padding in the final byte is never consumed as
//! data. Exhaustion surfaces [`CodecError::BitstreamUnderflow`].

use crate::{CodecError, Result};

pub struct BitReader<'a> {
    bytes: &'a [u8],
    payload_bits: u64,
    consumed_bits: u64,
    offset: usize,
    current: u8,
    available: u32,
}

impl<'a> BitReader<'a> {
    pub fn new(bytes: &'a [u8], payload_bits: u64) -> Self {
        Self {
            bytes,
            payload_bits,
            consumed_bits: 0,
            offset: 0,
            current: 0,
            available: 0,
        }
    }

    pub fn read_bit(&mut self) -> Result<bool> {
        if self.consumed_bits >= self.payload_bits {
            return Err(CodecError::BitstreamUnderflow);
        }
        if self.available == 0 {
            if self.offset >= self.bytes.len() {
                return Err(CodecError::BitstreamUnderflow);
            }
            self.current = self.bytes[self.offset];
            self.offset += 1;
            self.available = 8;
        }
        let bit = self.current & 0x80 != 0;
        self.current <<= 1;
        self.available -= 1;
        self.consumed_bits += 1;
        Ok(bit)
    }

    /// Read `count` bits, most significant first.
    pub fn read_bits(&mut self, count: u32) -> Result<u32> {
        debug_assert!(count <= 32);
        let mut value = 0u32;
        for _ in 0..count {
            value = (value << 1) | self.read_bit()? as u32;
        }
        Ok(value)
    }
}
