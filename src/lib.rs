//! Cross-sum block codec.
//!
//! Encodes fixed-size blocks of raw bits into four packed "cross-sum"
//! matrices (row, column, diagonal, anti-diagonal bit counts) plus one
//! SHA-256 digest per row, and reconstructs blocks from those statistics
//! by deterministic constraint elimination where the statistics force a
//! unique assignment.

pub mod bits;
pub mod config;
pub mod crosssum;
pub mod decoder;
pub mod encoder;
pub mod packer;
pub mod rowhash;
pub mod serializer;
pub mod solution;
pub mod solver;

#[cfg(test)]
mod validation;

/// Error types for xsum codec operations.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum XsError {
    /// A bit position, matrix coordinate, or element index is outside
    /// the valid range for the structure it was applied to.
    OutOfRange,
    /// A bit value other than 0 or 1 was supplied.
    InvalidBit,
    /// A pack width above 16 bits was requested.
    WidthTooLarge,
    /// A zero or non-byte-aligned matrix dimension was requested.
    BadSize,
    /// A write was attempted on a locked solution cell.
    LockedCell,
    /// Input data is invalid or corrupt (bad header, counter out of
    /// bounds, contradictory constraints).
    InvalidInput,
    /// The elimination pass finished without deciding every cell.
    Unrecoverable,
    /// A reconstructed row's digest does not match the stored digest.
    DigestMismatch,
}

impl std::fmt::Display for XsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfRange => write!(f, "index out of range"),
            Self::InvalidBit => write!(f, "bit value must be 0 or 1"),
            Self::WidthTooLarge => write!(f, "pack width exceeds 16 bits"),
            Self::BadSize => write!(f, "matrix size must be a nonzero multiple of 8"),
            Self::LockedCell => write!(f, "write to locked solution cell"),
            Self::InvalidInput => write!(f, "invalid input"),
            Self::Unrecoverable => write!(f, "block not recoverable by elimination"),
            Self::DigestMismatch => write!(f, "row digest mismatch"),
        }
    }
}

impl std::error::Error for XsError {}

pub type XsResult<T> = Result<T, XsError>;
