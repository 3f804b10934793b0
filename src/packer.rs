//! Minimal-width bit-stream packing.
//!
//! Cross-sum counters serialize as fixed-width fields of `b <= 16` bits.
//! Packing is a two-step dance with an explicit bit-order convention:
//!
//! 1. `extract` builds a bit stack from the low `width` bits of a value,
//!    taken from bit 0 upward, each new bit pushed below the previous
//!    ones — so the stack, read as a number, is the bit-reversed field.
//! 2. `BitPacker::push_value` pops the stack one bit at a time (undoing
//!    the reversal) and shifts each bit into the current output byte,
//!    MSB first; after 8 bits the byte is emitted and the cursor resets.
//!
//! Net effect: each value contributes exactly `width` bits to the output
//! in natural MSB-first order, `ceil(n·width / 8)` bytes for `n` values.
//! Widths above 16 are clamped here; the serializer rejects them before
//! they reach this module.

use crate::{XsError, XsResult};

/// Maximum supported field width in bits.
pub const MAX_WIDTH: u8 = 16;

/// Build the bit stack for the low `width` bits of `value`.
///
/// Bits are taken from bit 0 upward and pushed so that each newer bit
/// lands below the older ones; the returned word is therefore the
/// bit-reversed low-`width` field. Width 0 yields an empty stack (0);
/// widths above 16 are treated as 16.
pub fn extract(value: u16, width: u8) -> u16 {
    let width = width.min(MAX_WIDTH);
    let mut stack: u16 = 0;
    for b in 0..width {
        stack = (stack << 1) | ((value >> b) & 1);
    }
    stack
}

/// Packs fixed-width values into a byte stream, MSB-first.
#[derive(Debug, Default)]
pub struct BitPacker {
    out: Vec<u8>,
    curr: u8,
    bit_pos: u8,
}

impl BitPacker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the low `width` bits of `value`. Widths above 16 are
    /// clamped to 16.
    pub fn push_value(&mut self, value: u16, width: u8) {
        let width = width.min(MAX_WIDTH);
        let mut stack = extract(value, width);
        // Pop the stack back into natural order, filling bytes MSB-first.
        for _ in 0..width {
            let bit = (stack & 1) as u8;
            stack >>= 1;
            self.curr |= bit << (7 - self.bit_pos);
            self.bit_pos += 1;
            if self.bit_pos == 8 {
                self.out.push(self.curr);
                self.curr = 0;
                self.bit_pos = 0;
            }
        }
    }

    /// Flush any partial final byte and return the packed stream.
    pub fn finish(mut self) -> Vec<u8> {
        if self.bit_pos != 0 {
            self.out.push(self.curr);
        }
        self.out
    }

    /// Total bits pushed so far.
    pub fn bit_len(&self) -> usize {
        self.out.len() * 8 + self.bit_pos as usize
    }
}

/// Reads fixed-width values back out of a packed byte stream.
#[derive(Debug)]
pub struct BitUnpacker<'a> {
    data: &'a [u8],
    byte_pos: usize,
    bit_pos: u8,
}

impl<'a> BitUnpacker<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        BitUnpacker {
            data,
            byte_pos: 0,
            bit_pos: 0,
        }
    }

    /// Read the next `width`-bit value (MSB-first). Fails with
    /// `XsError::WidthTooLarge` above 16 bits and `XsError::InvalidInput`
    /// when the stream runs out.
    pub fn read_value(&mut self, width: u8) -> XsResult<u16> {
        if width > MAX_WIDTH {
            return Err(XsError::WidthTooLarge);
        }
        let mut value: u16 = 0;
        for _ in 0..width {
            let byte = *self
                .data
                .get(self.byte_pos)
                .ok_or(XsError::InvalidInput)?;
            let bit = (byte >> (7 - self.bit_pos)) & 1;
            value = (value << 1) | bit as u16;
            self.bit_pos += 1;
            if self.bit_pos == 8 {
                self.bit_pos = 0;
                self.byte_pos += 1;
            }
        }
        Ok(value)
    }
}
