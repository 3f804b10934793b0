//! Block serialization and the container header.
//!
//! Per-block output has a fixed component order with no per-component
//! length prefixes (the decoder knows `s` and `b` from its `Config`):
//!
//! 1. row digests, raw, row order, 32 bytes each
//! 2. row-sum matrix, packed at `b` bits per counter
//! 3. column-sum matrix
//! 4. diagonal-sum matrix
//! 5. anti-diagonal-sum matrix
//!
//! The stream as a whole starts with a 28-byte little-endian header:
//! magic `XSUM`, version, header size, original byte count, block count,
//! and a CRC32 over the preceding 24 bytes. A failed write on the sink
//! aborts serialization immediately; there is no partial-matrix retry.

use std::io::{self, Write};

use crate::config::DIGEST_SIZE;
use crate::crosssum::CrossSum;
use crate::packer::{BitPacker, MAX_WIDTH};
use crate::{XsError, XsResult};

// ---------------------------------------------------------------------------
// Error type for sink-facing operations
// ---------------------------------------------------------------------------

/// Error for operations that mix codec failures with sink/source I/O.
///
/// Kept separate from `XsError` so the codec error stays `Clone + PartialEq`.
#[derive(Debug)]
pub enum StreamError {
    /// Codec-level error (range, invalid value, corrupt input).
    Codec(XsError),
    /// I/O error from the underlying reader or writer.
    Io(io::Error),
}

impl std::fmt::Display for StreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamError::Codec(e) => write!(f, "{}", e),
            StreamError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for StreamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StreamError::Codec(e) => Some(e),
            StreamError::Io(e) => Some(e),
        }
    }
}

impl From<XsError> for StreamError {
    fn from(e: XsError) -> Self {
        StreamError::Codec(e)
    }
}

impl From<io::Error> for StreamError {
    fn from(e: io::Error) -> Self {
        StreamError::Io(e)
    }
}

/// Result type for sink-facing operations.
pub type StreamResult<T> = Result<T, StreamError>;

// ---------------------------------------------------------------------------
// Block serialization
// ---------------------------------------------------------------------------

/// Pack one cross-sum matrix at `width` bits per counter.
///
/// Fails with `XsError::WidthTooLarge` when `width > 16` — the caller
/// asked for a field the packer would silently clamp.
pub fn pack_matrix(sum: &CrossSum, width: u8) -> XsResult<Vec<u8>> {
    if width > MAX_WIDTH {
        return Err(XsError::WidthTooLarge);
    }
    let mut packer = BitPacker::new();
    for &v in sum.values() {
        packer.push_value(v, width);
    }
    Ok(packer.finish())
}

/// Write one block: digests, then the four matrices in fixed order.
pub fn write_block<W: Write>(
    sink: &mut W,
    digests: &[[u8; DIGEST_SIZE]],
    sums: [&CrossSum; 4],
    width: u8,
) -> StreamResult<()> {
    if width > MAX_WIDTH {
        return Err(XsError::WidthTooLarge.into());
    }
    for d in digests {
        sink.write_all(d)?;
    }
    for sum in sums {
        let packed = pack_matrix(sum, width)?;
        sink.write_all(&packed)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Container header
// ---------------------------------------------------------------------------

/// Magic bytes for the xsum container format.
pub const MAGIC: [u8; 4] = *b"XSUM";
/// Format version.
pub const VERSION: u16 = 1;
/// Header length in bytes.
pub const HEADER_SIZE: usize = 28;

/// Parsed container header fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Original input length in bytes.
    pub original_size: u64,
    /// Number of encoded blocks that follow.
    pub block_count: u64,
}

impl Header {
    /// Pack into the 28-byte little-endian wire form.
    pub fn pack(&self) -> [u8; HEADER_SIZE] {
        let mut b = [0u8; HEADER_SIZE];
        b[0..4].copy_from_slice(&MAGIC);
        b[4..6].copy_from_slice(&VERSION.to_le_bytes());
        b[6..8].copy_from_slice(&(HEADER_SIZE as u16).to_le_bytes());
        b[8..16].copy_from_slice(&self.original_size.to_le_bytes());
        b[16..24].copy_from_slice(&self.block_count.to_le_bytes());
        let crc = crc32(&b[..24]);
        b[24..28].copy_from_slice(&crc.to_le_bytes());
        b
    }

    /// Parse and validate a 28-byte header: magic, version, declared
    /// size, and CRC must all check out.
    pub fn parse(b: &[u8]) -> XsResult<Self> {
        if b.len() < HEADER_SIZE || b[0..4] != MAGIC {
            return Err(XsError::InvalidInput);
        }
        let version = u16::from_le_bytes([b[4], b[5]]);
        let declared = u16::from_le_bytes([b[6], b[7]]) as usize;
        if version != VERSION || declared != HEADER_SIZE {
            return Err(XsError::InvalidInput);
        }
        let crc = u32::from_le_bytes([b[24], b[25], b[26], b[27]]);
        if crc != crc32(&b[..24]) {
            return Err(XsError::InvalidInput);
        }
        Ok(Header {
            original_size: u64::from_le_bytes(b[8..16].try_into().unwrap()),
            block_count: u64::from_le_bytes(b[16..24].try_into().unwrap()),
        })
    }
}

// ---------------------------------------------------------------------------
// CRC32 (ISO 3309, polynomial 0xEDB88320) for the header checksum
// ---------------------------------------------------------------------------

const CRC32_POLY: u32 = 0xEDB8_8320;

const fn make_crc_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0u32;
    while i < 256 {
        let mut crc = i;
        let mut j = 0;
        while j < 8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ CRC32_POLY;
            } else {
                crc >>= 1;
            }
            j += 1;
        }
        table[i as usize] = crc;
        i += 1;
    }
    table
}

static CRC_TABLE: [u32; 256] = make_crc_table();

/// CRC32 of a byte slice.
pub fn crc32(data: &[u8]) -> u32 {
    let mut crc: u32 = 0xFFFF_FFFF;
    for &b in data {
        let idx = ((crc ^ b as u32) & 0xFF) as usize;
        crc = (crc >> 8) ^ CRC_TABLE[idx];
    }
    crc ^ 0xFFFF_FFFF
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::Bit;
    use crate::config::Config;

    fn sum_with(values: &[u16]) -> CrossSum {
        let mut cs = CrossSum::new(values.len()).unwrap();
        for (i, &v) in values.iter().enumerate() {
            for _ in 0..v {
                cs.push(i, Bit::Set).unwrap();
            }
        }
        cs
    }

    #[test]
    fn test_pack_matrix_ten_bit_size() {
        // 3 counters at 10 bits each -> ceil(30/8) = 4 bytes
        let cs = sum_with(&[3, 1, 2]);
        let packed = pack_matrix(&cs, 10).unwrap();
        assert_eq!(packed.len(), 4);
    }

    #[test]
    fn test_pack_matrix_rejects_wide_fields() {
        let cs = sum_with(&[1, 2, 3]);
        assert_eq!(pack_matrix(&cs, 17), Err(XsError::WidthTooLarge));
    }

    #[test]
    fn test_write_block_layout() {
        let cfg = Config::new(8).unwrap();
        let digests = vec![[0xABu8; DIGEST_SIZE]; 8];
        let sums: Vec<CrossSum> = (0..4).map(|_| sum_with(&[0; 8])).collect();
        let mut out = Vec::new();
        write_block(
            &mut out,
            &digests,
            [&sums[0], &sums[1], &sums[2], &sums[3]],
            cfg.bit_width(),
        )
        .unwrap();
        assert_eq!(out.len(), cfg.encoded_block_bytes());
        // Digests come first, raw.
        assert_eq!(&out[..DIGEST_SIZE], &[0xAB; DIGEST_SIZE]);
    }

    #[test]
    fn test_write_block_rejects_wide_fields() {
        let sums: Vec<CrossSum> = (0..4).map(|_| sum_with(&[0; 8])).collect();
        let err = write_block(
            &mut Vec::new(),
            &[],
            [&sums[0], &sums[1], &sums[2], &sums[3]],
            17,
        );
        assert!(matches!(
            err,
            Err(StreamError::Codec(XsError::WidthTooLarge))
        ));
    }

    #[test]
    fn test_write_failure_propagates() {
        struct FailWriter;
        impl Write for FailWriter {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }
        let sums: Vec<CrossSum> = (0..4).map(|_| sum_with(&[1, 0])).collect();
        let err = write_block(
            &mut FailWriter,
            &[[0u8; DIGEST_SIZE]],
            [&sums[0], &sums[1], &sums[2], &sums[3]],
            2,
        );
        assert!(matches!(err, Err(StreamError::Io(_))));
    }

    #[test]
    fn test_header_round_trip() {
        let h = Header {
            original_size: 123_456_789,
            block_count: 42,
        };
        let packed = h.pack();
        assert_eq!(packed.len(), HEADER_SIZE);
        assert_eq!(Header::parse(&packed).unwrap(), h);
    }

    #[test]
    fn test_header_rejects_bad_magic() {
        let mut packed = Header {
            original_size: 1,
            block_count: 1,
        }
        .pack();
        packed[0] = b'Y';
        assert_eq!(Header::parse(&packed), Err(XsError::InvalidInput));
    }

    #[test]
    fn test_header_rejects_corrupt_crc() {
        let mut packed = Header {
            original_size: 1,
            block_count: 1,
        }
        .pack();
        packed[8] ^= 0xFF; // flip a payload byte, CRC no longer matches
        assert_eq!(Header::parse(&packed), Err(XsError::InvalidInput));
    }

    #[test]
    fn test_header_rejects_truncation() {
        let packed = Header {
            original_size: 1,
            block_count: 1,
        }
        .pack();
        assert_eq!(Header::parse(&packed[..20]), Err(XsError::InvalidInput));
    }

    #[test]
    fn test_crc32_known_vector() {
        assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
        assert_eq!(crc32(b""), 0);
    }
}
