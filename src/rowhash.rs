//! Per-row digest accumulation.
//!
//! `RowHasher` buffers one row of bits at a time, packed MSB-first into
//! `s / 8` bytes, and captures a SHA-256 digest of the buffer the moment
//! the row's last bit arrives. Digest capture and buffer reset happen in
//! the same `&mut self` call, so a caller can never observe a completed
//! row's bits bleeding into the next row.
//!
//! Digests serialize as raw bytes in row order — they are already
//! byte-aligned, so no bit packing is applied.

use sha2::{Digest, Sha256};

use crate::bits::Bit;
use crate::config::DIGEST_SIZE;
use crate::{XsError, XsResult};

/// One SHA-256 digest per completed row of a block.
#[derive(Debug, Clone)]
pub struct RowHasher {
    size: usize,
    digests: Vec<[u8; DIGEST_SIZE]>,
    row_buf: Vec<u8>,
    bit_pos: u8,
    byte_pos: usize,
}

impl RowHasher {
    /// Create a hasher for rows of `size` bits. `size` must be a nonzero
    /// multiple of 8.
    pub fn new(size: usize) -> XsResult<Self> {
        if size == 0 || size % 8 != 0 {
            return Err(XsError::BadSize);
        }
        Ok(RowHasher {
            size,
            digests: Vec::new(),
            row_buf: vec![0; size / 8],
            bit_pos: 0,
            byte_pos: 0,
        })
    }

    /// Append the next bit of the current row (MSB-first within each
    /// byte). When the bit completes the row, the buffer's digest is
    /// stored and the buffer and cursors reset to zero.
    pub fn push_bit(&mut self, bit: Bit) -> XsResult<()> {
        if self.byte_pos >= self.row_buf.len() {
            // More bits than fit in a row without a capture in between
            // cannot happen through this API; guard anyway.
            return Err(XsError::OutOfRange);
        }
        if bit.is_set() {
            self.row_buf[self.byte_pos] |= 1 << (7 - self.bit_pos);
        }
        self.bit_pos += 1;
        if self.bit_pos == 8 {
            self.bit_pos = 0;
            self.byte_pos += 1;
        }
        if self.byte_pos == self.row_buf.len() {
            self.capture_row();
        }
        Ok(())
    }

    /// Digest the full row buffer, then zero it for the next row.
    fn capture_row(&mut self) {
        let digest: [u8; DIGEST_SIZE] = Sha256::digest(&self.row_buf).into();
        self.digests.push(digest);
        self.row_buf.fill(0);
        self.bit_pos = 0;
        self.byte_pos = 0;
    }

    /// Row width in bits.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of completed rows so far.
    #[inline]
    pub fn rows(&self) -> usize {
        self.digests.len()
    }

    /// True when no partial row is buffered.
    #[inline]
    pub fn at_row_boundary(&self) -> bool {
        self.bit_pos == 0 && self.byte_pos == 0
    }

    /// Captured digests, in row order.
    #[inline]
    pub fn digests(&self) -> &[[u8; DIGEST_SIZE]] {
        &self.digests
    }

    /// Append all captured digests as raw bytes, row order, and clear
    /// the digest queue.
    pub fn drain_bytes(&mut self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.digests.len() * DIGEST_SIZE);
        for d in self.digests.drain(..) {
            out.extend_from_slice(&d);
        }
        out
    }
}

/// Digest of one packed row, for verification against a stored digest.
pub fn row_digest(row_bytes: &[u8]) -> [u8; DIGEST_SIZE] {
    Sha256::digest(row_bytes).into()
}
