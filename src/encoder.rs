//! Block encoding and the ordered stream driver.
//!
//! A `BlockEncoder` accumulates one block: every pushed bit feeds the
//! four cross-sum accumulators and the row hasher in a single sequential
//! sweep (the five accumulators own disjoint state). `encode_stream`
//! drives whole inputs: header first, then blocks strictly in input
//! order — the sink is a single ordered writer, and each block's packed
//! matrices must line up 1:1 with its row hashes.

use std::io::{Read, Write};

use crate::bits::{bit_at, Bit};
use crate::config::Config;
use crate::crosssum::{anti_diag_index, diag_index, CrossSum};
use crate::rowhash::RowHasher;
use crate::serializer::{write_block, Header, StreamError, StreamResult};
use crate::{XsError, XsResult};

/// Accumulates the statistics of one block.
#[derive(Debug)]
pub struct BlockEncoder {
    config: Config,
    row_sum: CrossSum,
    col_sum: CrossSum,
    diag_sum: CrossSum,
    anti_sum: CrossSum,
    hasher: RowHasher,
    r: usize,
    c: usize,
}

impl BlockEncoder {
    /// Fresh accumulators for one block.
    pub fn new(config: Config) -> XsResult<Self> {
        let s = config.size();
        Ok(BlockEncoder {
            config,
            row_sum: CrossSum::new(s)?,
            col_sum: CrossSum::new(s)?,
            diag_sum: CrossSum::new(s)?,
            anti_sum: CrossSum::new(s)?,
            hasher: RowHasher::new(s)?,
            r: 0,
            c: 0,
        })
    }

    /// Push the next bit in row-major order into all five accumulators.
    /// Fails once the block already holds `s²` bits.
    pub fn push_bit(&mut self, bit: Bit) -> XsResult<()> {
        let s = self.config.size();
        if self.r >= s {
            return Err(XsError::OutOfRange);
        }
        self.row_sum.push(self.r, bit)?;
        self.col_sum.push(self.c, bit)?;
        self.diag_sum.push(diag_index(self.r, self.c, s), bit)?;
        self.anti_sum.push(anti_diag_index(self.r, self.c, s), bit)?;
        self.hasher.push_bit(bit)?;

        self.c += 1;
        if self.c == s {
            self.c = 0;
            self.r += 1;
        }
        Ok(())
    }

    /// Push all eight bits of a byte, MSB first.
    pub fn push_byte(&mut self, byte: u8) -> XsResult<()> {
        for pos in 0..8 {
            self.push_bit(bit_at(byte, pos)?)?;
        }
        Ok(())
    }

    /// Bits accumulated so far.
    pub fn bits_pushed(&self) -> usize {
        self.r * self.config.size() + self.c
    }

    /// Whether the block holds all `s²` bits.
    pub fn is_full(&self) -> bool {
        self.r == self.config.size()
    }

    /// Zero-fill the remainder of the block (final partial block of an
    /// input).
    pub fn pad_to_full(&mut self) -> XsResult<()> {
        while !self.is_full() {
            self.push_bit(Bit::Clear)?;
        }
        Ok(())
    }

    /// Serialize the completed block: digests, then the four matrices in
    /// row/column/diagonal/anti-diagonal order. The block must be full.
    pub fn finish<W: Write>(self, sink: &mut W) -> StreamResult<()> {
        if !self.is_full() {
            return Err(XsError::InvalidInput.into());
        }
        write_block(
            sink,
            self.hasher.digests(),
            [&self.row_sum, &self.col_sum, &self.diag_sum, &self.anti_sum],
            self.config.bit_width(),
        )
    }

    /// The accumulated sums, for inspection in tests and diagnostics.
    pub fn sums(&self) -> [&CrossSum; 4] {
        [&self.row_sum, &self.col_sum, &self.diag_sum, &self.anti_sum]
    }
}

/// Number of blocks an input of `original_size` bytes occupies.
pub fn block_count(config: Config, original_size: u64) -> u64 {
    let block_bytes = config.block_bytes() as u64;
    original_size.div_ceil(block_bytes)
}

/// Encode `original_size` bytes from `input` to `output`.
///
/// Writes the container header, then one encoded block per
/// `config.block_bytes()` chunk of input, zero-padding the final chunk.
/// The input ending before `original_size` bytes is an error; any write
/// failure aborts the run — no partial output is well-formed after a
/// mid-stream failure.
pub fn encode_stream<R: Read, W: Write>(
    mut input: R,
    output: &mut W,
    config: Config,
    original_size: u64,
) -> StreamResult<u64> {
    let blocks = block_count(config, original_size);
    let header = Header {
        original_size,
        block_count: blocks,
    };
    output.write_all(&header.pack())?;
    let mut bytes_written = header.pack().len() as u64;

    let mut remaining = original_size;
    for _ in 0..blocks {
        let want = (config.block_bytes() as u64).min(remaining) as usize;
        let chunk = read_exactly(&mut input, want)?;
        if chunk.len() < want {
            return Err(XsError::InvalidInput.into());
        }
        remaining -= want as u64;

        let mut enc = BlockEncoder::new(config)?;
        for &b in &chunk {
            enc.push_byte(b)?;
        }
        enc.pad_to_full()?;
        enc.finish(output)?;
        bytes_written += config.encoded_block_bytes() as u64;
    }
    Ok(bytes_written)
}

/// Read up to `len` bytes, stopping early only at end of stream.
pub(crate) fn read_exactly<R: Read>(input: &mut R, len: usize) -> Result<Vec<u8>, StreamError> {
    let mut buf = vec![0u8; len];
    let mut filled = 0;
    while filled < len {
        match input.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(StreamError::Io(e)),
        }
    }
    buf.truncate(filled);
    Ok(buf)
}
