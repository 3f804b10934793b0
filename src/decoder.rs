//! Block decoding: container parsing, sum unpacking, reconstruction.
//!
//! The decoder reverses the encoder's layout with the same out-of-band
//! `Config`: parse the header, then consume one fixed-size encoded block
//! at a time. Each block's four packed matrices are unpacked at the
//! derived counter width, handed to the elimination solver, and the
//! reconstructed rows are checked against the stored digests before a
//! single byte reaches the output. The final block's zero padding is
//! dropped using the header's original byte count.

use std::io::{Read, Write};

use crate::config::{Config, DIGEST_SIZE};
use crate::encoder::{block_count, read_exactly};
use crate::packer::BitUnpacker;
use crate::serializer::{Header, StreamResult, HEADER_SIZE};
use crate::solver::{verify_rows, BlockSums, Elimination};
use crate::{XsError, XsResult};

/// Decode one encoded block back into its `s² / 8` input bytes.
///
/// `bytes` must hold exactly `config.encoded_block_bytes()`. Blocks the
/// solver cannot finish fail with `XsError::Unrecoverable`; blocks it
/// finishes wrongly (or whose stored digests lie) fail with
/// `XsError::DigestMismatch`.
pub fn decode_block(bytes: &[u8], config: Config) -> XsResult<Vec<u8>> {
    if bytes.len() != config.encoded_block_bytes() {
        return Err(XsError::InvalidInput);
    }
    let s = config.size();
    let width = config.bit_width();

    let mut digests = Vec::with_capacity(s);
    for r in 0..s {
        let mut d = [0u8; DIGEST_SIZE];
        d.copy_from_slice(&bytes[r * DIGEST_SIZE..(r + 1) * DIGEST_SIZE]);
        digests.push(d);
    }

    // Each matrix is independently byte-aligned after packing.
    let matrix_bytes = config.packed_matrix_bytes();
    let mut offset = s * DIGEST_SIZE;
    let mut unpack_matrix = || -> XsResult<Vec<u16>> {
        let mut unpacker = BitUnpacker::new(&bytes[offset..offset + matrix_bytes]);
        offset += matrix_bytes;
        (0..s).map(|_| unpacker.read_value(width)).collect()
    };
    let sums = BlockSums {
        row: unpack_matrix()?,
        col: unpack_matrix()?,
        diag: unpack_matrix()?,
        anti: unpack_matrix()?,
    };

    let mut solver = Elimination::new(s, &sums)?;
    if !solver.solve()? {
        return Err(XsError::Unrecoverable);
    }
    let matrix = solver.into_matrix();
    verify_rows(&matrix, &digests)?;

    let mut out = Vec::with_capacity(config.block_bytes());
    for r in 0..s {
        out.extend_from_slice(&matrix.row_bytes(r)?);
    }
    Ok(out)
}

/// Decode a whole stream: header, then `block_count` encoded blocks.
///
/// Returns the number of original bytes written. The header's block
/// count must match what its original size implies for this `Config`;
/// a stream that ends mid-block is invalid.
pub fn decode_stream<R: Read, W: Write>(
    mut input: R,
    output: &mut W,
    config: Config,
) -> StreamResult<u64> {
    let header_bytes = read_exactly(&mut input, HEADER_SIZE)?;
    let header = Header::parse(&header_bytes)?;
    if header.block_count != block_count(config, header.original_size) {
        return Err(XsError::InvalidInput.into());
    }

    let mut remaining = header.original_size;
    for _ in 0..header.block_count {
        let encoded = read_exactly(&mut input, config.encoded_block_bytes())?;
        if encoded.len() < config.encoded_block_bytes() {
            return Err(XsError::InvalidInput.into());
        }
        let block = decode_block(&encoded, config)?;
        let take = (config.block_bytes() as u64).min(remaining) as usize;
        output.write_all(&block[..take])?;
        remaining -= take as u64;
    }
    Ok(header.original_size)
}
