//! Codec configuration.
//!
//! One immutable value constructed before any block is processed and
//! passed into the encoder and decoder; there is no process-wide state.
//! The matrix dimension and the derived pack width are not embedded in
//! the output stream — encoder and decoder must agree out of band.

use crate::{XsError, XsResult};

/// Default square matrix dimension (bits per row).
pub const DEFAULT_SIZE: usize = 512;

/// Bytes in one row digest (SHA-256).
pub const DIGEST_SIZE: usize = 32;

/// Immutable codec parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    size: usize,
}

impl Config {
    /// Create a configuration for square blocks of `size` × `size` bits.
    ///
    /// `size` must be a nonzero multiple of 8 (rows pack into whole
    /// bytes) and small enough that counters fit the 16-bit pack limit,
    /// i.e. `size <= 65535`. Violations fail here, at startup, rather
    /// than per element.
    pub fn new(size: usize) -> XsResult<Self> {
        if size == 0 || size % 8 != 0 {
            return Err(XsError::BadSize);
        }
        if sum_bit_width(size) > 16 {
            return Err(XsError::WidthTooLarge);
        }
        Ok(Config { size })
    }

    /// Matrix dimension `s`.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Bits per packed cross-sum counter: `ceil(log2(s+1))`.
    ///
    /// Derived from `size`, never hardcoded — a counter can reach `s`
    /// (a fully set line), so 9 bits would be lossy at s = 512.
    #[inline]
    pub fn bit_width(&self) -> u8 {
        sum_bit_width(self.size)
    }

    /// Bytes of input consumed per block: `s² / 8`.
    #[inline]
    pub fn block_bytes(&self) -> usize {
        self.size * self.size / 8
    }

    /// Bytes one row of bits packs into: `s / 8`.
    #[inline]
    pub fn row_bytes(&self) -> usize {
        self.size / 8
    }

    /// Serialized bytes of one packed cross-sum matrix: `ceil(s·b / 8)`.
    #[inline]
    pub fn packed_matrix_bytes(&self) -> usize {
        (self.size * self.bit_width() as usize).div_ceil(8)
    }

    /// Total serialized bytes per block: digests plus four packed matrices.
    #[inline]
    pub fn encoded_block_bytes(&self) -> usize {
        self.size * DIGEST_SIZE + 4 * self.packed_matrix_bytes()
    }
}

impl Default for Config {
    fn default() -> Self {
        Config { size: DEFAULT_SIZE }
    }
}

/// Minimum bit width that represents every value in `[0, s]`.
pub fn sum_bit_width(size: usize) -> u8 {
    (usize::BITS - size.leading_zeros()) as u8
}
